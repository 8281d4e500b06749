//! Admin authentication: credential verification, session issuance, and the
//! per-request access gate that reconciles session state against the store.
//!
//! Flow Overview:
//! 1) Credentials are checked against the stored Argon2id hash, with a
//!    failed-attempt counter and temporary lockout.
//! 2) A signed session token is issued carrying identity, role, and a cached
//!    two-factor flag. The token is client-held and never trusted on its own.
//! 3) First login without two-factor leads through enrollment; later logins
//!    lead through a one-time-code challenge.
//! 4) Every admin-protected request re-reads the authoritative account record
//!    and compares it against the token before granting access.

pub mod account;
pub mod config;
pub mod credentials;
pub mod gate;
pub mod rate_limit;
pub mod reconcile;
pub mod session;
pub mod store;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use account::{AdminAccount, AdminRole};
pub use config::AuthConfig;
pub use credentials::CredentialVerifier;
pub use gate::AccessGate;
pub use session::{SessionClaims, SessionIssuer, SessionKind};
pub use store::AdminStore;

/// Domain failures for authentication and two-factor operations.
///
/// Store connectivity problems surface as `Store` and stay distinguishable
/// from every domain outcome; callers must never map an unreachable database
/// to "credentials invalid".
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account locked until {until}")]
    AccountLocked { until: DateTime<Utc> },
    #[error("account inactive")]
    AccountInactive,
    #[error("account not found")]
    AccountNotFound,
    #[error("two-factor enrollment not initialized")]
    EnrollmentNotInitialized,
    #[error("invalid one-time code")]
    InvalidCode,
    #[error("one-time code must be exactly six digits")]
    MalformedCode,
    #[error("session token invalid or expired")]
    InvalidSession,
    #[error("session out of sync with account state")]
    SessionMismatch,
    #[error("two-factor enrollment required")]
    EnrollmentRequired,
    #[error("two-factor verification required")]
    TwoFactorRequired,
    #[error("source address not allowed")]
    AddressNotAllowed,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
