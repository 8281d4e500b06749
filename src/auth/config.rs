//! Authentication configuration loaded at startup.
//!
//! Every tunable that governs lockout, one-time-code tolerance, session
//! lifetimes, and password-hash cost lives here as named configuration
//! rather than a literal buried in a code path.

use std::sync::Arc;

const DEFAULT_ISSUER: &str = "WashGate";
const DEFAULT_LOCKOUT_THRESHOLD: u32 = 5;
const DEFAULT_LOCKOUT_DURATION_SECONDS: i64 = 15 * 60;
const DEFAULT_TOTP_TOLERANCE_STEPS: u8 = 2;
const DEFAULT_TOTP_STEP_SECONDS: u64 = 30;
const DEFAULT_TOTP_DIGITS: usize = 6;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 8 * 60 * 60;
const DEFAULT_BOOTSTRAP_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_CHALLENGE_TTL_SECONDS: i64 = 5 * 60;
const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19_456;
const DEFAULT_ARGON2_ITERATIONS: u32 = 2;
const DEFAULT_ARGON2_PARALLELISM: u32 = 1;
const DEFAULT_ADMIN_ORIGIN: &str = "http://localhost:8080";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    issuer: String,
    lockout_threshold: u32,
    lockout_duration_seconds: i64,
    totp_tolerance_steps: u8,
    totp_step_seconds: u64,
    totp_digits: usize,
    session_ttl_seconds: i64,
    bootstrap_ttl_seconds: i64,
    challenge_ttl_seconds: i64,
    argon2_memory_kib: u32,
    argon2_iterations: u32,
    argon2_parallelism: u32,
    recovery_pepper: Option<Arc<[u8]>>,
    admin_origin: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            lockout_threshold: DEFAULT_LOCKOUT_THRESHOLD,
            lockout_duration_seconds: DEFAULT_LOCKOUT_DURATION_SECONDS,
            totp_tolerance_steps: DEFAULT_TOTP_TOLERANCE_STEPS,
            totp_step_seconds: DEFAULT_TOTP_STEP_SECONDS,
            totp_digits: DEFAULT_TOTP_DIGITS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            bootstrap_ttl_seconds: DEFAULT_BOOTSTRAP_TTL_SECONDS,
            challenge_ttl_seconds: DEFAULT_CHALLENGE_TTL_SECONDS,
            argon2_memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            argon2_iterations: DEFAULT_ARGON2_ITERATIONS,
            argon2_parallelism: DEFAULT_ARGON2_PARALLELISM,
            recovery_pepper: None,
            admin_origin: DEFAULT_ADMIN_ORIGIN.to_string(),
        }
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.issuer = issuer;
        self
    }

    #[must_use]
    pub fn with_lockout_threshold(mut self, threshold: u32) -> Self {
        self.lockout_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_lockout_duration_seconds(mut self, seconds: i64) -> Self {
        self.lockout_duration_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_totp_tolerance_steps(mut self, steps: u8) -> Self {
        self.totp_tolerance_steps = steps;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_bootstrap_ttl_seconds(mut self, seconds: i64) -> Self {
        self.bootstrap_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_challenge_ttl_seconds(mut self, seconds: i64) -> Self {
        self.challenge_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_argon2_params(mut self, memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        self.argon2_memory_kib = memory_kib;
        self.argon2_iterations = iterations;
        self.argon2_parallelism = parallelism;
        self
    }

    #[must_use]
    pub fn with_recovery_pepper(mut self, pepper: Arc<[u8]>) -> Self {
        self.recovery_pepper = Some(pepper);
        self
    }

    #[must_use]
    pub fn with_admin_origin(mut self, origin: String) -> Self {
        self.admin_origin = origin;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn lockout_threshold(&self) -> u32 {
        self.lockout_threshold
    }

    #[must_use]
    pub fn lockout_duration_seconds(&self) -> i64 {
        self.lockout_duration_seconds
    }

    #[must_use]
    pub fn totp_tolerance_steps(&self) -> u8 {
        self.totp_tolerance_steps
    }

    #[must_use]
    pub fn totp_step_seconds(&self) -> u64 {
        self.totp_step_seconds
    }

    #[must_use]
    pub fn totp_digits(&self) -> usize {
        self.totp_digits
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn bootstrap_ttl_seconds(&self) -> i64 {
        self.bootstrap_ttl_seconds
    }

    #[must_use]
    pub fn challenge_ttl_seconds(&self) -> i64 {
        self.challenge_ttl_seconds
    }

    #[must_use]
    pub fn argon2_memory_kib(&self) -> u32 {
        self.argon2_memory_kib
    }

    #[must_use]
    pub fn argon2_iterations(&self) -> u32 {
        self.argon2_iterations
    }

    #[must_use]
    pub fn argon2_parallelism(&self) -> u32 {
        self.argon2_parallelism
    }

    pub(crate) fn recovery_pepper(&self) -> Option<&[u8]> {
        self.recovery_pepper.as_deref()
    }

    #[must_use]
    pub fn admin_origin(&self) -> &str {
        &self.admin_origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let config = AuthConfig::new();
        assert_eq!(config.issuer(), DEFAULT_ISSUER);
        assert_eq!(config.lockout_threshold(), DEFAULT_LOCKOUT_THRESHOLD);
        assert_eq!(
            config.lockout_duration_seconds(),
            DEFAULT_LOCKOUT_DURATION_SECONDS
        );
        assert_eq!(config.totp_tolerance_steps(), DEFAULT_TOTP_TOLERANCE_STEPS);
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert!(config.recovery_pepper().is_none());

        let config = config
            .with_issuer("SudsAdmin".to_string())
            .with_lockout_threshold(3)
            .with_lockout_duration_seconds(60)
            .with_totp_tolerance_steps(1)
            .with_session_ttl_seconds(120)
            .with_bootstrap_ttl_seconds(30)
            .with_challenge_ttl_seconds(15)
            .with_argon2_params(8, 1, 1)
            .with_recovery_pepper(Arc::from(b"pepper".as_slice()))
            .with_admin_origin("https://admin.washgate.app".to_string());

        assert_eq!(config.issuer(), "SudsAdmin");
        assert_eq!(config.lockout_threshold(), 3);
        assert_eq!(config.lockout_duration_seconds(), 60);
        assert_eq!(config.totp_tolerance_steps(), 1);
        assert_eq!(config.session_ttl_seconds(), 120);
        assert_eq!(config.bootstrap_ttl_seconds(), 30);
        assert_eq!(config.challenge_ttl_seconds(), 15);
        assert_eq!(config.argon2_memory_kib(), 8);
        assert_eq!(config.recovery_pepper(), Some(b"pepper".as_slice()));
        assert_eq!(config.admin_origin(), "https://admin.washgate.app");
    }
}
