//! OpenAPI document assembly.
//!
//! Add new endpoints to `paths(...)` so they stay documented; the Swagger UI
//! served under `/docs` reads this document.

use utoipa::OpenApi;

use crate::api::handlers::{admin, auth, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login,
        auth::mfa::totp_enroll_start,
        auth::mfa::totp_enroll_finish,
        auth::mfa::totp_verify,
        auth::session::session,
        admin::me,
        admin::totp_reset,
    ),
    components(schemas(
        health::Health,
        auth::types::LoginRequest,
        auth::types::SessionTokenResponse,
        auth::types::ErrorResponse,
        auth::types::LockedResponse,
        auth::types::EnrollStartResponse,
        auth::types::EnrollFinishRequest,
        auth::types::TotpVerifyRequest,
        auth::types::SessionReportResponse,
        auth::types::MeResponse,
        auth::types::TotpResetRequest,
        crate::auth::AdminRole,
    )),
    tags(
        (name = "auth", description = "Admin login, two-factor enrollment, and session reconciliation"),
        (name = "admin", description = "Operations behind the full access gate"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = openapi();
        for path in [
            "/health",
            "/v1/admin/auth/login",
            "/v1/admin/auth/totp/enroll/start",
            "/v1/admin/auth/totp/enroll/finish",
            "/v1/admin/auth/totp/verify",
            "/v1/admin/auth/session",
            "/v1/admin/me",
            "/v1/admin/totp/reset",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
