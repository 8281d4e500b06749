//! Signed session tokens.
//!
//! Tokens are client-held and never persisted server-side. The two-factor
//! flag inside them is a point-in-time cache fixed at issuance; sensitive
//! paths must reconcile it against the store (see [`super::reconcile`]).

use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{AdminAccount, AdminRole};
use super::AuthError;

/// Scope of a session token.
///
/// Login never mints a `Full` token directly: accounts without two-factor get
/// a `MfaBootstrap` token good only for enrollment, accounts with two-factor
/// get a `MfaChallenge` token good only for code verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Full,
    MfaBootstrap,
    MfaChallenge,
}

impl SessionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::MfaBootstrap => "mfa_bootstrap",
            Self::MfaChallenge => "mfa_challenge",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account id.
    pub sub: Uuid,
    pub username: String,
    pub role: AdminRole,
    /// Two-factor-enabled flag cached at issuance time.
    pub totp: bool,
    pub kind: SessionKind,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256-signed session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl SessionIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, issuer: &str) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[issuer]);
        Self {
            encoding: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            issuer: issuer.to_string(),
        }
    }

    /// Sign a token for `account` with the given scope and lifetime.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn issue(
        &self,
        account: &AdminAccount,
        kind: SessionKind,
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: account.account_id,
            username: account.username.clone(),
            role: account.role,
            totp: account.totp_enabled,
            kind,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl_seconds,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AuthError::Store(anyhow!("failed to sign session token: {err}")))
    }

    /// Validate signature, expiry, and issuer; returns the embedded claims.
    ///
    /// # Errors
    /// Any validation failure collapses into `InvalidSession`; the caller
    /// never learns why a presented token was rejected.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidSession)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::store::memory::test_account;
    use super::*;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(&SecretString::from("test-signing-secret"), "WashGate")
    }

    #[test]
    fn round_trip_preserves_identity_and_cached_flag() {
        let mut account = test_account("alice", "");
        account.totp_enabled = true;
        let token = issuer()
            .issue(&account, SessionKind::MfaChallenge, 300)
            .unwrap();
        let claims = issuer().decode(&token).unwrap();
        assert_eq!(claims.sub, account.account_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, account.role);
        assert!(claims.totp);
        assert_eq!(claims.kind, SessionKind::MfaChallenge);
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn expired_token_is_rejected() {
        let account = test_account("alice", "");
        // Default validation allows 60s of leeway; go well past it.
        let token = issuer().issue(&account, SessionKind::Full, -3600).unwrap();
        assert!(matches!(
            issuer().decode(&token),
            Err(AuthError::InvalidSession)
        ));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let account = test_account("alice", "");
        let other = SessionIssuer::new(&SecretString::from("other-secret"), "WashGate");
        let token = other.issue(&account, SessionKind::Full, 300).unwrap();
        assert!(matches!(
            issuer().decode(&token),
            Err(AuthError::InvalidSession)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let account = test_account("alice", "");
        let mut token = issuer().issue(&account, SessionKind::Full, 300).unwrap();
        token.replace_range(token.len() - 2.., "xx");
        assert!(matches!(
            issuer().decode(&token),
            Err(AuthError::InvalidSession)
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let account = test_account("alice", "");
        let other = SessionIssuer::new(&SecretString::from("test-signing-secret"), "Elsewhere");
        let token = other.issue(&account, SessionKind::Full, 300).unwrap();
        assert!(matches!(
            issuer().decode(&token),
            Err(AuthError::InvalidSession)
        ));
    }
}
