use secrecy::SecretString;

/// Secrets and tunables carried from the CLI into server startup.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub session_secret: SecretString,
    pub recovery_pepper: SecretString,
    pub admin_origin: String,
    pub lockout_threshold: u32,
    pub lockout_duration_seconds: i64,
    pub session_ttl_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs {
            session_secret: SecretString::from("signing"),
            recovery_pepper: SecretString::from("pepper"),
            admin_origin: "http://localhost:8080".to_string(),
            lockout_threshold: 5,
            lockout_duration_seconds: 900,
            session_ttl_seconds: 28_800,
        };
        assert_eq!(args.session_secret.expose_secret(), "signing");
        // Debug output must not leak secrets.
        let debug = format!("{args:?}");
        assert!(!debug.contains("signing"));
        assert!(!debug.contains("pepper"));
    }
}
