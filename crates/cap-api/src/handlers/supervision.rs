//! Supervisor assignment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cap_core::traits::Id;
use cap_core::types::{RespondAction, Role};
use cap_core::CoreError;
use cap_models::SupervisorRequest;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiResult;
use crate::extractors::AuthPrincipal;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendRequestDto {
    pub supervisor_id: Id,
    pub project_id: Option<Id>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "is too long"))]
    pub message: String,
}

/// POST /api/v1/supervisor-requests
pub async fn send_request(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(dto): Json<SendRequestDto>,
) -> ApiResult<(StatusCode, Json<SupervisorRequest>)> {
    if principal.role != Role::Student {
        return Err(CoreError::forbidden("only students can request supervision").into());
    }
    dto.validate()
        .map_err(|errors| CoreError::Validation(errors.into()))?;
    let request = state
        .supervision
        .send_request(principal.id, dto.supervisor_id, dto.project_id, dto.message)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondDto {
    pub action: RespondAction,
    pub response: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondBody {
    pub request: SupervisorRequest,
    pub project_assigned: bool,
}

/// POST /api/v1/supervisor-requests/:id/respond
pub async fn respond(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Id>,
    Json(dto): Json<RespondDto>,
) -> ApiResult<Json<RespondBody>> {
    let outcome = state
        .supervision
        .respond(id, principal.id, dto.action, dto.response)
        .await?;
    Ok(Json(RespondBody {
        request: outcome.request,
        project_assigned: outcome.project_assigned,
    }))
}
