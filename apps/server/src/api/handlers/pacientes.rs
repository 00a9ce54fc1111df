//! Patient resource handlers

use crate::{
    api::extract::{AppJson, AppPath},
    state::AppState,
    Result,
};
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pacientes_models::{FlagsPatch, PatientPatch, PatientRequest};

/// List all patients, ordered by id
pub async fn list_patients(State(state): State<AppState>) -> Result<Response> {
    let patients = state.patient_service.list().await?;
    Ok((StatusCode::OK, Json(patients)).into_response())
}

pub async fn get_patient(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Response> {
    let patient = state.patient_service.get(id).await?;
    Ok((StatusCode::OK, Json(patient)).into_response())
}

/// Create a patient; responds `201` with a `Location` header
pub async fn create_patient(
    State(state): State<AppState>,
    AppJson(request): AppJson<PatientRequest>,
) -> Result<Response> {
    let created = state.patient_service.create(request).await?;

    let mut response = (StatusCode::CREATED, Json(&created)).into_response();
    if let Some(id) = created.id {
        if let Ok(location) = HeaderValue::from_str(&format!("/pacientes/{id}")) {
            response.headers_mut().insert(header::LOCATION, location);
        }
    }
    Ok(response)
}

/// Full replace
pub async fn replace_patient(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(request): AppJson<PatientRequest>,
) -> Result<Response> {
    let updated = state.patient_service.replace(id, request).await?;
    Ok((StatusCode::OK, Json(updated)).into_response())
}

/// Partial update
pub async fn patch_patient(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<PatientPatch>,
) -> Result<Response> {
    let updated = state.patient_service.patch(id, patch).await?;
    Ok((StatusCode::OK, Json(updated)).into_response())
}

pub async fn patch_patient_flags(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(flags): AppJson<FlagsPatch>,
) -> Result<Response> {
    let updated = state.patient_service.patch_flags(id, flags).await?;
    Ok((StatusCode::OK, Json(updated)).into_response())
}

pub async fn delete_patient(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Response> {
    state.patient_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
