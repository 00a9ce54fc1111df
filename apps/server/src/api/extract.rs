//! Extractors whose rejections render as the standard error body

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// `axum::Json` with malformed bodies reported as `400` in the API error format.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` with unparsable segments reported as `400`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct AppPath<T>(pub T);
