use crate::api::handlers::pacientes;
use crate::api::method_not_allowed;
use crate::api::middleware::require_patient_role;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, patch},
    Router,
};

/// Patient CRUD routes. Every route requires the configured role, including
/// the 405 answer for an unsupported method.
pub fn patient_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/pacientes",
            get(pacientes::list_patients).post(pacientes::create_patient),
        )
        .route(
            "/pacientes/:id",
            get(pacientes::get_patient)
                .put(pacientes::replace_patient)
                .patch(pacientes::patch_patient)
                .delete(pacientes::delete_patient),
        )
        .route(
            "/pacientes/:id/flags",
            patch(pacientes::patch_patient_flags),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .route_layer(middleware::from_fn_with_state(state, require_patient_role))
}
