//! Session/store reconciliation.
//!
//! The two-factor flag in a session token is fixed at issuance. Enabling,
//! disabling, or administratively resetting two-factor afterwards leaves old
//! tokens carrying a stale flag, so anything gating on "has this admin
//! completed two-factor" re-reads the store instead of trusting the token.

use serde::Serialize;

use super::account::AdminAccount;
use super::session::SessionClaims;

/// Signal name surfaced to callers when a token has drifted from the store.
pub const SESSION_DB_MISMATCH: &str = "session_db_mismatch";

/// Outcome of comparing a token's cached flag against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSync {
    pub synced: bool,
    pub session_flag: bool,
    pub store_flag: bool,
}

/// Read-only comparison; safe to call on every request.
#[must_use]
pub fn reconcile(claims: &SessionClaims, account: &AdminAccount) -> SessionSync {
    SessionSync {
        synced: claims.totp == account.totp_enabled,
        session_flag: claims.totp,
        store_flag: account.totp_enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::super::session::{SessionIssuer, SessionKind};
    use super::super::store::memory::test_account;
    use super::*;
    use secrecy::SecretString;

    fn claims_for(account: &crate::auth::AdminAccount) -> SessionClaims {
        let issuer = SessionIssuer::new(&SecretString::from("secret"), "WashGate");
        let token = issuer
            .issue(account, SessionKind::Full, 300)
            .expect("issue token");
        issuer.decode(&token).expect("decode token")
    }

    #[test]
    fn matching_flags_are_synced() {
        let account = test_account("alice", "");
        let sync = reconcile(&claims_for(&account), &account);
        assert_eq!(
            sync,
            SessionSync {
                synced: true,
                session_flag: false,
                store_flag: false
            }
        );
    }

    #[test]
    fn store_enabling_after_issuance_breaks_sync() {
        let mut account = test_account("alice", "");
        let claims = claims_for(&account);
        account.totp_enabled = true;
        let sync = reconcile(&claims, &account);
        assert!(!sync.synced);
        assert!(!sync.session_flag);
        assert!(sync.store_flag);
    }

    #[test]
    fn store_reset_after_issuance_breaks_sync() {
        let mut account = test_account("alice", "");
        account.totp_enabled = true;
        let claims = claims_for(&account);
        account.totp_enabled = false;
        let sync = reconcile(&claims, &account);
        assert!(!sync.synced);
        assert!(sync.session_flag);
        assert!(!sync.store_flag);
    }
}
