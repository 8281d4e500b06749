//! Credential verification with failed-attempt tracking and lockout.

use anyhow::anyhow;
use argon2::{
    password_hash::SaltString, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::Utc;
use rand::rngs::OsRng;
use std::sync::Arc;
use tracing::warn;

use super::account::AdminAccount;
use super::config::AuthConfig;
use super::store::AdminStore;
use super::AuthError;

/// Hash a password with Argon2id using the configured work factor.
///
/// # Errors
/// Returns an error if the configured parameters are invalid or hashing fails.
pub fn hash_password(password: &str, config: &AuthConfig) -> Result<String, AuthError> {
    let params = Params::new(
        config.argon2_memory_kib(),
        config.argon2_iterations(),
        config.argon2_parallelism(),
        None,
    )
    .map_err(|err| anyhow!("invalid Argon2 parameters: {err}"))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?
        .to_string();
    Ok(hash)
}

/// Constant-time comparison against the stored hash; hash parameters are read
/// back from the encoded hash string itself.
fn password_matches(stored_hash: &str, password: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|_| anyhow!("stored password hash is malformed"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub struct CredentialVerifier {
    store: Arc<dyn AdminStore>,
    config: AuthConfig,
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(store: Arc<dyn AdminStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Check a username-or-email / password pair.
    ///
    /// Unknown accounts and wrong passwords both come back as
    /// `InvalidCredentials`; only lockout is distinguishable, with its expiry.
    /// Counters are mutated on every call, success or failure.
    ///
    /// # Errors
    /// Domain outcomes surface as `AuthError` variants; store failures as
    /// `AuthError::Store`.
    pub async fn verify(&self, login: &str, password: &str) -> Result<AdminAccount, AuthError> {
        let Some(mut account) = self.store.find_by_login(login).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !account.is_active {
            return Err(AuthError::AccountInactive);
        }

        let now = Utc::now();
        if let Some(until) = account.locked_at(now) {
            return Err(AuthError::AccountLocked { until });
        }

        if !password_matches(&account.password_hash, password)? {
            let state = self
                .store
                .record_login_failure(
                    account.account_id,
                    self.config.lockout_threshold(),
                    self.config.lockout_duration_seconds(),
                )
                .await?;
            // The attempt that crosses the threshold is already reported as
            // locked, not as a plain failure.
            if let Some(until) = state.locked_until.filter(|until| *until > now) {
                warn!(
                    username = %account.username,
                    failed_logins = state.failed_logins,
                    "admin account locked after repeated failures"
                );
                return Err(AuthError::AccountLocked { until });
            }
            return Err(AuthError::InvalidCredentials);
        }

        self.store.record_login_success(account.account_id).await?;
        account.failed_logins = 0;
        account.locked_until = None;
        account.last_login_at = Some(now);
        Ok(account)
    }
}
