//! Two-factor enrollment and verification.
//!
//! Enrollment is two-phased: `begin` persists a pending secret (the enabled
//! flag stays off) and hands back the provisioning material; `confirm` proves
//! possession of the secret with a live code and only then flips the flag.
//! Repeating `begin` before confirmation overwrites the pending secret, so
//! abandoned attempts never accumulate.

pub mod code;
pub mod recovery;

use anyhow::anyhow;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::account::AdminAccount;
use crate::auth::config::AuthConfig;
use crate::auth::store::AdminStore;
use crate::auth::AuthError;

/// Material returned to the user at enrollment start. The secret and the
/// recovery codes are shown exactly once and never retrievable afterwards.
#[derive(Debug)]
pub struct EnrollmentStart {
    pub secret_base32: String,
    pub enrollment_uri: String,
    pub recovery_codes: Vec<String>,
}

pub struct EnrollmentService {
    store: Arc<dyn AdminStore>,
    config: AuthConfig,
}

impl EnrollmentService {
    #[must_use]
    pub fn new(store: Arc<dyn AdminStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Start (or restart) enrollment for an account.
    ///
    /// # Errors
    /// `AccountNotFound` for an unknown account; `Store` for infrastructure
    /// failures, including a missing recovery pepper.
    pub async fn begin(&self, account_id: Uuid) -> Result<EnrollmentStart, AuthError> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let pepper = self
            .config
            .recovery_pepper()
            .ok_or_else(|| anyhow!("recovery pepper not configured"))?;

        let secret = code::generate_secret()?;
        let (secret_base32, enrollment_uri) = code::provisioning(
            secret,
            self.config.issuer(),
            &account.email,
            self.config.totp_digits(),
            self.config.totp_tolerance_steps(),
            self.config.totp_step_seconds(),
        )?;

        let batch = recovery::RecoveryCodes::generate(pepper)?;
        let stored = self
            .store
            .store_pending_secret(account_id, &secret_base32, batch.batch_id, &batch.hashes)
            .await?;
        if !stored {
            return Err(AuthError::AccountNotFound);
        }

        info!(username = %account.username, "two-factor enrollment started");
        Ok(EnrollmentStart {
            secret_base32,
            enrollment_uri,
            recovery_codes: batch.plaintext,
        })
    }

    /// Confirm enrollment with a code computed from the pending secret.
    ///
    /// On success the enabled flag flips on and the failed-login counter and
    /// lock expiry are cleared; on failure nothing changes.
    ///
    /// # Errors
    /// `EnrollmentNotInitialized` without a pending secret, `MalformedCode` /
    /// `InvalidCode` for bad codes, `AccountNotFound` for an unknown account.
    pub async fn confirm(&self, account_id: Uuid, code: &str) -> Result<AdminAccount, AuthError> {
        let mut account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let Some(secret) = account.totp_secret.clone() else {
            return Err(AuthError::EnrollmentNotInitialized);
        };

        if !code::verify(
            &secret,
            code,
            self.config.totp_digits(),
            self.config.totp_tolerance_steps(),
            self.config.totp_step_seconds(),
        )? {
            return Err(AuthError::InvalidCode);
        }

        // Conditional on the secret still being there; a concurrent reset
        // turns this into a no-op instead of enabling secretless two-factor.
        if !self.store.enable_two_factor(account_id).await? {
            return Err(AuthError::EnrollmentNotInitialized);
        }

        account.totp_enabled = true;
        account.failed_logins = 0;
        account.locked_until = None;
        info!(username = %account.username, "two-factor enrollment confirmed");
        Ok(account)
    }

    /// Verify a code against the account's confirmed secret.
    ///
    /// Returns false for accounts that never finished enrollment.
    ///
    /// # Errors
    /// `MalformedCode` for bad input, `AccountNotFound` for an unknown
    /// account, `Store` for infrastructure failures.
    pub async fn verify_code(&self, account_id: Uuid, code: &str) -> Result<bool, AuthError> {
        code::check_format(code, self.config.totp_digits())?;

        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let Some(secret) = account.totp_secret.as_deref() else {
            return Ok(false);
        };
        if !account.totp_enabled {
            return Ok(false);
        }

        code::verify(
            secret,
            code,
            self.config.totp_digits(),
            self.config.totp_tolerance_steps(),
            self.config.totp_step_seconds(),
        )
    }
}
