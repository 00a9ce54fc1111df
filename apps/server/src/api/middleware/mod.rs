//! HTTP middleware

pub mod auth;
pub mod error_path;
pub mod security;

pub use auth::require_patient_role;
pub use error_path::error_path_middleware;
pub use security::security_headers_middleware;
