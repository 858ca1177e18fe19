//! Team formation handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use cap_collab::MatchResults;
use cap_core::traits::Id;
use cap_core::types::RespondAction;
use cap_models::TeamMember;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::AuthPrincipal;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchQuery {
    pub min_score: Option<u8>,
    pub limit: Option<usize>,
}

/// GET /api/v1/projects/:id/matches
pub async fn find_matches(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    Path(id): Path<Id>,
    Query(query): Query<MatchQuery>,
) -> ApiResult<Json<MatchResults>> {
    let min_score = query.min_score.unwrap_or(state.config.matching.min_score);
    let limit = query.limit.unwrap_or(state.config.matching.suggestion_limit);
    let results = state.teams.find_matches(id, min_score, limit).await?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteDto {
    pub user_id: Id,
    pub message: Option<String>,
}

/// POST /api/v1/projects/:id/invites
pub async fn invite(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Id>,
    Json(dto): Json<InviteDto>,
) -> ApiResult<(StatusCode, Json<TeamMember>)> {
    let member = state
        .teams
        .invite(id, &principal, dto.user_id, dto.message)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRespondDto {
    pub action: RespondAction,
}

/// POST /api/v1/invites/:id/respond
pub async fn respond(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Id>,
    Json(dto): Json<InviteRespondDto>,
) -> ApiResult<impl IntoResponse> {
    let member = state.teams.respond(id, principal.id, dto.action).await?;
    Ok(match member {
        Some(member) => Json(member).into_response(),
        // Rejected invitations leave no trace.
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// POST /api/v1/memberships/:id/leave
pub async fn leave(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<Id>,
) -> ApiResult<Json<TeamMember>> {
    let member = state.teams.leave(id, principal.id).await?;
    Ok(Json(member))
}
