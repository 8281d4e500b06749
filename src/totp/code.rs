//! Time-based one-time code generation parameters and verification.

use anyhow::anyhow;
use rand::{rngs::OsRng, RngCore};
use std::time::{SystemTime, UNIX_EPOCH};
use totp_rs::{Algorithm, Secret, TOTP};

use crate::auth::AuthError;

/// 256 bits of entropy for fresh enrollment secrets.
const SECRET_BYTES: usize = 32;

/// Fast-fail format check: exactly `digits` ASCII digits.
///
/// This is input hygiene, not a security boundary; nothing secret depends on
/// how quickly a malformed code is rejected.
///
/// # Errors
/// `MalformedCode` for anything that is not exactly `digits` ASCII digits.
pub fn check_format(code: &str, digits: usize) -> Result<(), AuthError> {
    if code.len() != digits || !code.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(AuthError::MalformedCode);
    }
    Ok(())
}

/// Generate a fresh enrollment secret from the system CSPRNG.
///
/// # Errors
/// Returns an error if the random source fails.
pub fn generate_secret() -> Result<Vec<u8>, AuthError> {
    let mut bytes = vec![0u8; SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| anyhow!("failed to generate two-factor secret: {err}"))?;
    Ok(bytes)
}

/// Base32 encoding and scannable otpauth:// URI for a fresh secret.
///
/// # Errors
/// Returns an error if the secret or labels are rejected by the TOTP builder.
pub fn provisioning(
    secret: Vec<u8>,
    issuer: &str,
    account_label: &str,
    digits: usize,
    tolerance_steps: u8,
    step_seconds: u64,
) -> Result<(String, String), AuthError> {
    let totp = TOTP::new(
        Algorithm::SHA1,
        digits,
        tolerance_steps,
        step_seconds,
        secret,
        Some(issuer.to_string()),
        account_label.to_string(),
    )
    .map_err(|err| anyhow!("TOTP init error: {err}"))?;
    Ok((totp.get_secret_base32(), totp.get_url()))
}

/// Verify a submitted code against a stored base32 secret at the current
/// wall-clock time, accepting `tolerance_steps` steps of drift either side.
///
/// # Errors
/// `MalformedCode` before any candidate computation; `Store` for a corrupt
/// stored secret or a broken system clock.
pub fn verify(
    secret_base32: &str,
    code: &str,
    digits: usize,
    tolerance_steps: u8,
    step_seconds: u64,
) -> Result<bool, AuthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| anyhow!("system clock before epoch: {err}"))?
        .as_secs();
    verify_at(secret_base32, code, digits, tolerance_steps, step_seconds, now)
}

fn verify_at(
    secret_base32: &str,
    code: &str,
    digits: usize,
    tolerance_steps: u8,
    step_seconds: u64,
    at: u64,
) -> Result<bool, AuthError> {
    check_format(code, digits)?;
    let secret = Secret::Encoded(secret_base32.to_string())
        .to_bytes()
        .map_err(|err| anyhow!("stored two-factor secret is not valid base32: {err}"))?;
    let totp = TOTP::new(
        Algorithm::SHA1,
        digits,
        tolerance_steps,
        step_seconds,
        secret,
        None,
        String::new(),
    )
    .map_err(|err| anyhow!("TOTP init error: {err}"))?;
    Ok(totp.check(code, at))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP";

    fn code_at(at: u64) -> String {
        let secret = Secret::Encoded(SECRET.to_string()).to_bytes().unwrap();
        let totp = TOTP::new(Algorithm::SHA1, 6, 2, 30, secret, None, String::new()).unwrap();
        totp.generate(at)
    }

    #[test]
    fn accepts_within_sixty_seconds_either_side() {
        let issued_at = 1_700_000_000;
        let code = code_at(issued_at);
        for offset in [-60i64, -30, 0, 30, 60] {
            let at = issued_at.checked_add_signed(offset).unwrap();
            assert!(
                verify_at(SECRET, &code, 6, 2, 30, at).unwrap(),
                "offset {offset}"
            );
        }
    }

    #[test]
    fn rejects_outside_tolerance_window() {
        let issued_at = 1_700_000_000;
        let code = code_at(issued_at);
        for offset in [-120i64, -90, 90, 120] {
            let at = issued_at.checked_add_signed(offset).unwrap();
            assert!(
                !verify_at(SECRET, &code, 6, 2, 30, at).unwrap(),
                "offset {offset}"
            );
        }
    }

    #[test]
    fn tighter_tolerance_narrows_the_window() {
        let issued_at = 1_700_000_000;
        let code = code_at(issued_at);
        assert!(verify_at(SECRET, &code, 6, 1, 30, issued_at + 30).unwrap());
        assert!(!verify_at(SECRET, &code, 6, 1, 30, issued_at + 60).unwrap());
    }

    #[test]
    fn malformed_codes_fail_before_candidate_computation() {
        for bad in ["12345", "1234567", "12a456", "123 45", "", "123456७"] {
            assert!(matches!(
                verify_at(SECRET, bad, 6, 2, 30, 1_700_000_000),
                Err(AuthError::MalformedCode)
            ));
        }
    }

    #[test]
    fn code_from_another_secret_is_rejected() {
        let other = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
        let issued_at = 1_700_000_000;
        let secret = Secret::Encoded(other.to_string()).to_bytes().unwrap();
        let totp = TOTP::new(Algorithm::SHA1, 6, 2, 30, secret, None, String::new()).unwrap();
        let foreign = totp.generate(issued_at);
        // Same-step collision between two secrets is possible but wildly
        // unlikely; treat equality as the signal something is wrong.
        assert!(!verify_at(SECRET, &foreign, 6, 2, 30, issued_at).unwrap() || foreign == code_at(issued_at));
    }

    #[test]
    fn generated_secret_has_256_bits() {
        let secret = generate_secret().unwrap();
        assert_eq!(secret.len(), 32);
    }

    #[test]
    fn provisioning_uri_carries_issuer_and_label() {
        let (base32, uri) = provisioning(
            generate_secret().unwrap(),
            "WashGate",
            "alice@washgate.app",
            6,
            2,
            30,
        )
        .unwrap();
        assert!(uri.starts_with("otpauth://totp/"));
        assert!(uri.contains("WashGate"));
        assert!(uri.contains(&base32));
    }
}
