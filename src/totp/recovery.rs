//! Recovery codes handed out at enrollment.
//!
//! Ten codes per batch, Argon2id-hashed with a server-side pepper before
//! they touch the store. Redemption is handled out of band; this module only
//! generates, formats, and verifies against a stored hash.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;

const CODE_COUNT: usize = 10;
const CODE_LEN: usize = 12;
const GROUP_SIZE: usize = 4;
// No I, O, 0, 1: codes get read aloud and retyped.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A freshly generated batch: plaintext for the user, hashes for the store.
#[derive(Debug)]
pub struct RecoveryCodes {
    pub batch_id: Uuid,
    pub plaintext: Vec<String>,
    pub hashes: Vec<String>,
}

impl RecoveryCodes {
    /// Generate a full batch using the provided pepper.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn generate(pepper: &[u8]) -> Result<Self> {
        let mut plaintext = Vec::with_capacity(CODE_COUNT);
        let mut hashes = Vec::with_capacity(CODE_COUNT);
        for _ in 0..CODE_COUNT {
            let code = random_code();
            hashes.push(hash_code(&code, pepper)?);
            plaintext.push(code);
        }
        Ok(Self {
            batch_id: Uuid::new_v4(),
            plaintext,
            hashes,
        })
    }
}

/// Strip separators, uppercase, and validate length/alphabet.
///
/// # Errors
/// Returns an error for input that cannot be a recovery code.
pub fn normalize(input: &str) -> Result<String> {
    let normalized: String = input
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_uppercase())
        .collect();
    if normalized.len() != CODE_LEN {
        return Err(anyhow!("invalid recovery code length"));
    }
    if !normalized.bytes().all(|byte| ALPHABET.contains(&byte)) {
        return Err(anyhow!("invalid recovery code characters"));
    }
    Ok(normalized)
}

/// Verify a submitted code against one stored hash.
///
/// # Errors
/// Returns an error for malformed input or an unparsable stored hash.
pub fn verify(code: &str, stored_hash: &str, pepper: &[u8]) -> Result<bool> {
    let normalized = normalize(code)?;
    let parsed =
        PasswordHash::new(stored_hash).map_err(|_| anyhow!("invalid recovery code hash"))?;
    Ok(peppered_argon2(pepper)?
        .verify_password(normalized.as_bytes(), &parsed)
        .is_ok())
}

fn peppered_argon2(pepper: &[u8]) -> Result<Argon2<'_>> {
    Argon2::new_with_secret(
        pepper,
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::default(),
    )
    .map_err(|_| anyhow!("failed to initialize Argon2id with pepper"))
}

/// One grouped code, e.g. `XK3M-Q7RP-W2NH`.
fn random_code() -> String {
    let mut raw = [0u8; CODE_LEN];
    OsRng.fill_bytes(&mut raw);
    let mut out = String::with_capacity(CODE_LEN + CODE_LEN / GROUP_SIZE);
    for (idx, byte) in raw.iter().enumerate() {
        if idx > 0 && idx % GROUP_SIZE == 0 {
            out.push('-');
        }
        let position = usize::from(*byte) % ALPHABET.len();
        out.push(char::from(ALPHABET[position]));
    }
    out
}

fn hash_code(code: &str, pepper: &[u8]) -> Result<String> {
    let normalized = normalize(code).context("freshly generated code failed normalization")?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = peppered_argon2(pepper)?
        .hash_password(normalized.as_bytes(), &salt)
        .map_err(|_| anyhow!("failed to hash recovery code"))?
        .to_string();
    Ok(hash)
}
