//! Store interface for admin accounts.
//!
//! Components receive the store as an injected trait object rather than a
//! shared global client, so the same logic runs against Postgres in
//! production and an in-memory double in tests. Counter and flag mutations
//! are single conditional updates; concurrent requests against the same
//! account must not lose an increment or apply a stale overwrite.

#[cfg(test)]
pub(crate) mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::account::AdminAccount;

pub use postgres::PgAdminStore;

/// Counter state returned by a recorded login failure.
#[derive(Debug, Clone, Copy)]
pub struct LockoutState {
    pub failed_logins: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Exact-match lookup by username or email.
    async fn find_by_login(&self, login: &str) -> Result<Option<AdminAccount>>;

    /// Lookup by account id.
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<AdminAccount>>;

    /// Atomically increments the failed-login counter and, when the counter
    /// reaches `threshold`, sets a lock expiry `lock_seconds` in the future.
    async fn record_login_failure(
        &self,
        account_id: Uuid,
        threshold: u32,
        lock_seconds: i64,
    ) -> Result<LockoutState>;

    /// Resets the failed-login counter, clears any stale lock, and stamps the
    /// last-login time.
    async fn record_login_success(&self, account_id: Uuid) -> Result<()>;

    /// Writes a pending two-factor secret, replacing any earlier pending
    /// secret and recovery-code batch. The enabled flag is left untouched.
    ///
    /// Returns false when the account does not exist.
    async fn store_pending_secret(
        &self,
        account_id: Uuid,
        secret_base32: &str,
        batch_id: Uuid,
        code_hashes: &[String],
    ) -> Result<bool>;

    /// Flips the enabled flag on, conditional on a persisted secret, and
    /// clears the failed-login counter and lock expiry in the same update
    /// (fresh activation is a trust-reset point).
    ///
    /// Returns false when no secret was persisted for the account.
    async fn enable_two_factor(&self, account_id: Uuid) -> Result<bool>;

    /// Administrative reset: clears the enabled flag, the secret, and any
    /// recovery codes.
    ///
    /// Returns false when the account does not exist.
    async fn reset_two_factor(&self, account_id: Uuid) -> Result<bool>;
}
