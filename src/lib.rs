//! # WashGate (Admin Identity & Two-Factor Authority)
//!
//! `washgate` is the admin identity service for the WashGate car-wash
//! platform. It owns staff/admin credential verification, time-based
//! one-time-code enrollment and challenges, and the access gate in front of
//! every admin-only operation.
//!
//! ## Session Model
//!
//! Session tokens are signed, client-held, and never persisted server-side.
//! Login mints a narrow token (enrollment bootstrap or code challenge); only
//! a completed two-factor step mints a full session. The two-factor flag
//! inside a token is a point-in-time cache: the access gate re-reads the
//! authoritative record on every request and turns away drifted tokens with
//! a `session_db_mismatch` signal instead of honoring a stale grant.
//!
//! ## Lockout
//!
//! Failed logins increment a per-account counter with a single conditional
//! update; crossing the configured threshold sets a lock expiry that blocks
//! credential verification, correct password or not, until it passes.
//! Successful authentication and fresh two-factor activation both reset the
//! counter.

pub mod api;
pub mod auth;
pub mod cli;
pub mod totp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
