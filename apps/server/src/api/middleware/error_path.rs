//! Fills the request path into error bodies

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiErrorResponse;

/// Error responses are built without access to the request; this layer
/// re-renders them with `path` set to the request path.
pub async fn error_path_middleware(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let Some(body) = response.extensions_mut().remove::<ApiErrorResponse>() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    let rendered = body.into_response_with_path(&path);
    let (rendered_parts, rendered_body) = rendered.into_parts();

    // Keep headers set by inner layers (e.g. WWW-Authenticate); take the new body's length.
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    for (name, value) in rendered_parts.headers.iter() {
        parts.headers.insert(name.clone(), value.clone());
    }

    Response::from_parts(parts, rendered_body)
}
