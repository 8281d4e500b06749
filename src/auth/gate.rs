//! Per-request access gate for admin-protected operations.
//!
//! The gate walks a session through
//! `Unauthenticated → CredentialVerified → AwaitingTwoFactorEnrollment →
//! TwoFactorVerified → Authorized`; any failed check drops to `Denied`.
//! Authorization is never granted from the token alone: every entry performs
//! a live store read and a reconciliation check.

use std::net::IpAddr;
use std::sync::Arc;
use tracing::warn;

use super::account::AdminAccount;
use super::reconcile::{reconcile, SessionSync};
use super::session::{SessionIssuer, SessionKind};
use super::store::AdminStore;
use super::AuthError;

pub struct AccessGate {
    store: Arc<dyn AdminStore>,
    sessions: SessionIssuer,
}

impl AccessGate {
    #[must_use]
    pub fn new(store: Arc<dyn AdminStore>, sessions: SessionIssuer) -> Self {
        Self { store, sessions }
    }

    /// Shared entry: validate the token, load the authoritative record, and
    /// apply the checks every session kind must pass (active account, source
    /// address allow-list).
    async fn authenticate(
        &self,
        token: &str,
        source: Option<IpAddr>,
    ) -> Result<(super::session::SessionClaims, AdminAccount), AuthError> {
        let claims = self.sessions.decode(token)?;
        // A vanished account is indistinguishable from a bad token on purpose.
        let account = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        if !account.is_active {
            return Err(AuthError::AccountInactive);
        }
        if !account.address_allowed(source) {
            warn!(
                username = %account.username,
                source = ?source,
                "admin request from address outside allow-list"
            );
            return Err(AuthError::AddressNotAllowed);
        }
        Ok((claims, account))
    }

    /// Full authorization for admin-only operations.
    ///
    /// # Errors
    /// `SessionMismatch` when the cached two-factor flag drifted from the
    /// store, `EnrollmentRequired` when the store flag is still false,
    /// `TwoFactorRequired` when the token scope never completed two-factor,
    /// plus the shared `authenticate` failures.
    pub async fn authorize(
        &self,
        token: &str,
        source: Option<IpAddr>,
    ) -> Result<AdminAccount, AuthError> {
        let (claims, account) = self.authenticate(token, source).await?;

        let sync = reconcile(&claims, &account);
        if !sync.synced {
            warn!(
                username = %account.username,
                session_flag = sync.session_flag,
                store_flag = sync.store_flag,
                "session two-factor flag drifted from store; forcing re-login"
            );
            return Err(AuthError::SessionMismatch);
        }
        if !account.totp_enabled {
            return Err(AuthError::EnrollmentRequired);
        }
        if claims.kind != SessionKind::Full {
            return Err(AuthError::TwoFactorRequired);
        }
        Ok(account)
    }

    /// Session usable for enrollment: bootstrap right after login, or a full
    /// session re-enrolling a fresh authenticator.
    ///
    /// # Errors
    /// `TwoFactorRequired` when presented with a challenge-scope token;
    /// otherwise the shared `authenticate` failures.
    pub async fn enrollment_session(
        &self,
        token: &str,
        source: Option<IpAddr>,
    ) -> Result<AdminAccount, AuthError> {
        let (claims, account) = self.authenticate(token, source).await?;
        match claims.kind {
            SessionKind::MfaBootstrap | SessionKind::Full => Ok(account),
            SessionKind::MfaChallenge => Err(AuthError::TwoFactorRequired),
        }
    }

    /// Session holding a pending two-factor challenge.
    ///
    /// # Errors
    /// `InvalidSession` for any other token scope; the shared `authenticate`
    /// failures otherwise.
    pub async fn challenge_session(
        &self,
        token: &str,
        source: Option<IpAddr>,
    ) -> Result<AdminAccount, AuthError> {
        let (claims, account) = self.authenticate(token, source).await?;
        if claims.kind != SessionKind::MfaChallenge {
            return Err(AuthError::InvalidSession);
        }
        Ok(account)
    }

    /// Reconciliation report for the presented token; read-only.
    ///
    /// # Errors
    /// The shared `authenticate` failures.
    pub async fn session_report(
        &self,
        token: &str,
        source: Option<IpAddr>,
    ) -> Result<SessionSync, AuthError> {
        let (claims, account) = self.authenticate(token, source).await?;
        Ok(reconcile(&claims, &account))
    }
}
