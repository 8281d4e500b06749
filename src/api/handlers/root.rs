use axum::response::IntoResponse;

use crate::APP_USER_AGENT;

// axum handler for the service banner
pub async fn root() -> impl IntoResponse {
    APP_USER_AGENT
}
