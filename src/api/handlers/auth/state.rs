//! Shared auth state assembled once at startup and injected into handlers.

use std::sync::Arc;

use crate::auth::rate_limit::RateLimiter;
use crate::auth::{
    AccessGate, AdminStore, AuthConfig, CredentialVerifier, SessionIssuer,
};
use crate::totp::EnrollmentService;

pub struct AuthState {
    config: AuthConfig,
    store: Arc<dyn AdminStore>,
    sessions: SessionIssuer,
    credentials: CredentialVerifier,
    enrollment: EnrollmentService,
    gate: AccessGate,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        store: Arc<dyn AdminStore>,
        config: AuthConfig,
        sessions: SessionIssuer,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            credentials: CredentialVerifier::new(store.clone(), config.clone()),
            enrollment: EnrollmentService::new(store.clone(), config.clone()),
            gate: AccessGate::new(store.clone(), sessions.clone()),
            store,
            config,
            sessions,
            rate_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn AdminStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialVerifier {
        &self.credentials
    }

    #[must_use]
    pub fn enrollment(&self) -> &EnrollmentService {
        &self.enrollment
    }

    #[must_use]
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub(crate) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}
