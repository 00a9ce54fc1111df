//! Authentication middleware for the patient routes

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{state::AppState, Error};

/// Require a valid bearer token carrying the configured role.
///
/// When `auth.enabled` is false every request passes through (local dev).
pub async fn require_patient_role(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if !state.auth.is_enabled() {
        return next.run(req).await;
    }

    let principal = match state.auth.authenticate(req.headers()) {
        Ok(principal) => principal,
        Err(e) => return unauthenticated_response(e),
    };

    if let Err(e) = state.auth.authorize(&principal) {
        return e.into_response();
    }

    next.run(req).await
}

fn unauthenticated_response(err: Error) -> Response {
    let mut response = err.into_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}
