//! Workflow handlers

use axum::{
    extract::{Path, State},
    Json,
};
use cap_core::traits::Id;
use cap_core::types::{ProjectPhase, ReviewAction};
use cap_models::{Project, ProjectMilestone};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::AuthPrincipal;
use crate::state::AppState;

/// POST /api/v1/projects/:id/submit
pub async fn submit_proposal(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Id>,
) -> ApiResult<Json<Project>> {
    let project = state.workflow.submit_proposal(id, &principal).await?;
    Ok(Json(project))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub action: ReviewAction,
    pub feedback: Option<String>,
}

/// POST /api/v1/projects/:id/review
pub async fn review(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Id>,
    Json(dto): Json<ReviewDto>,
) -> ApiResult<Json<Project>> {
    let project = state
        .workflow
        .review(id, &principal, dto.action, dto.feedback)
        .await?;
    Ok(Json(project))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceDto {
    pub target_phase: ProjectPhase,
}

/// POST /api/v1/projects/:id/advance
pub async fn advance(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Id>,
    Json(dto): Json<AdvanceDto>,
) -> ApiResult<Json<Project>> {
    let project = state
        .workflow
        .advance(id, &principal, dto.target_phase)
        .await?;
    Ok(Json(project))
}

/// GET /api/v1/projects/:id/milestones
pub async fn list_milestones(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<ProjectMilestone>>> {
    let milestones = state.workflow.milestones().list(id).await?;
    Ok(Json(milestones))
}
