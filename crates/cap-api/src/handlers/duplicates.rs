//! Duplicate-abstract check handler
//!
//! Advisory only: reports similar existing abstracts but never blocks a
//! submission by itself.

use axum::{extract::State, Json};
use cap_core::traits::Id;
use cap_core::types::Role;
use cap_core::CoreError;
use cap_matching::{check_duplicate, CorpusEntry, DuplicateReport};
use cap_store::ProjectStore;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::AuthPrincipal;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckDto {
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Overrides the configured similarity threshold
    pub threshold: Option<f64>,
    /// Leave out this project (e.g. the caller's own draft)
    pub exclude_project_id: Option<Id>,
}

/// POST /api/v1/duplicate-check
pub async fn check(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(dto): Json<DuplicateCheckDto>,
) -> ApiResult<Json<DuplicateReport>> {
    if principal.role != Role::Student {
        return Err(CoreError::forbidden("only students can run the duplicate check").into());
    }

    let min_length = state.config.duplicates.min_abstract_length;
    if dto.abstract_text.trim().len() < min_length {
        return Err(CoreError::validation(
            "abstract",
            format!("must be at least {} characters", min_length),
        )
        .into());
    }

    let corpus: Vec<CorpusEntry> = state
        .projects
        .list()
        .await
        .map_err(CoreError::from)?
        .into_iter()
        .filter(|project| match dto.exclude_project_id {
            Some(exclude) => project.id != Some(exclude),
            None => true,
        })
        .filter(|project| !project.abstract_text.trim().is_empty())
        .filter_map(|project| {
            project.id.map(|id| CorpusEntry {
                project_id: id,
                title: project.title,
                abstract_text: project.abstract_text,
            })
        })
        .collect();

    let threshold = dto.threshold.unwrap_or(state.config.duplicates.threshold);
    Ok(Json(check_duplicate(&dto.abstract_text, &corpus, threshold)))
}
