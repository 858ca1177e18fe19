//! API routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{duplicates, supervision, team, workflow};
use crate::state::AppState;

/// Create the complete API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_router())
        .with_state(state)
}

fn api_v1_router() -> Router<AppState> {
    Router::new()
        .route("/projects/:id/submit", post(workflow::submit_proposal))
        .route("/projects/:id/review", post(workflow::review))
        .route("/projects/:id/advance", post(workflow::advance))
        .route("/projects/:id/milestones", get(workflow::list_milestones))
        .route("/supervisor-requests", post(supervision::send_request))
        .route(
            "/supervisor-requests/:id/respond",
            post(supervision::respond),
        )
        .route("/projects/:id/matches", get(team::find_matches))
        .route("/projects/:id/invites", post(team::invite))
        .route("/invites/:id/respond", post(team::respond))
        .route("/memberships/:id/leave", post(team::leave))
        .route("/duplicate-check", post(duplicates::check))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use cap_core::config::AppConfig;
    use cap_core::types::{ProjectPhase, Role};
    use cap_models::{DirectoryUser, Project};
    use cap_notifications::MemorySink;
    use cap_store::{MemoryStores, ProjectStore as _, UserDirectory as _};
    use tower::ServiceExt;

    use super::*;

    async fn test_app() -> (Router, MemoryStores) {
        let stores = MemoryStores::new();
        stores
            .users
            .upsert(DirectoryUser::new(1, "Sam", Role::Student))
            .await
            .unwrap();
        stores
            .users
            .upsert(DirectoryUser::new(10, "Dr. Reyes", Role::Supervisor))
            .await
            .unwrap();

        let state = AppState::in_memory(
            AppConfig::default(),
            &stores,
            Arc::new(MemorySink::new()),
        );
        (router(state), stores)
    }

    fn request(
        method: Method,
        uri: &str,
        principal: Option<(i64, &str)>,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, role)) = principal {
            builder = builder
                .header("x-user-id", id.to_string())
                .header("x-user-role", role);
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn seed_project(stores: &MemoryStores, supervised: bool) -> i64 {
        let mut project = Project::new(1, "Peer-to-peer file sync");
        project.abstract_text =
            "A peer to peer file synchronization service with conflict resolution".into();
        if supervised {
            project.supervisor_id = Some(10);
        }
        stores.projects.insert(project).await.unwrap().id.unwrap()
    }

    #[tokio::test]
    async fn test_missing_principal_is_unauthorized() {
        let (app, stores) = test_app().await;
        let id = seed_project(&stores, true).await;

        let response = app
            .oneshot(request(
                Method::POST,
                &format!("/api/v1/projects/{}/submit", id),
                None,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_submit_review_flow() {
        let (app, stores) = test_app().await;
        let id = seed_project(&stores, true).await;

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                &format!("/api/v1/projects/{}/submit", id),
                Some((1, "student")),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(
                Method::POST,
                &format!("/api/v1/projects/{}/review", id),
                Some((10, "supervisor")),
                Some(serde_json::json!({"action": "approve"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let project = stores.projects.find(id).await.unwrap().unwrap();
        assert_eq!(project.phase, ProjectPhase::Approved);
    }

    #[tokio::test]
    async fn test_submit_without_supervisor_is_precondition_failed() {
        let (app, stores) = test_app().await;
        let id = seed_project(&stores, false).await;

        let response = app
            .oneshot(request(
                Method::POST,
                &format!("/api/v1/projects/{}/submit", id),
                Some((1, "student")),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[tokio::test]
    async fn test_invalid_transition_carries_valid_targets() {
        let (app, stores) = test_app().await;
        let id = seed_project(&stores, true).await;

        let response = app
            .oneshot(request(
                Method::POST,
                &format!("/api/v1/projects/{}/advance", id),
                Some((10, "supervisor")),
                Some(serde_json::json!({"targetPhase": "archived"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "invalid_transition");
        assert_eq!(body["validTargets"], serde_json::json!(["pending_proposal"]));
    }

    #[tokio::test]
    async fn test_supervisor_request_flow() {
        let (app, stores) = test_app().await;
        let id = seed_project(&stores, false).await;

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/supervisor-requests",
                Some((1, "student")),
                Some(serde_json::json!({
                    "supervisorId": 10,
                    "projectId": id,
                    "message": "please supervise"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let request_id = body["id"].as_i64().unwrap();

        let response = app
            .oneshot(request(
                Method::POST,
                &format!("/api/v1/supervisor-requests/{}/respond", request_id),
                Some((10, "supervisor")),
                Some(serde_json::json!({"action": "approve"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let project = stores.projects.find(id).await.unwrap().unwrap();
        assert_eq!(project.supervisor_id, Some(10));
    }

    #[tokio::test]
    async fn test_duplicate_check_rejects_short_abstract() {
        let (app, _stores) = test_app().await;

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/v1/duplicate-check",
                Some((1, "student")),
                Some(serde_json::json!({"abstract": "too short"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_duplicate_check_flags_similar_abstract() {
        let (app, stores) = test_app().await;
        seed_project(&stores, false).await;

        let response = app
            .oneshot(request(
                Method::POST,
                "/api/v1/duplicate-check",
                Some((1, "student")),
                Some(serde_json::json!({
                    "abstract": "A peer to peer file synchronization service with conflict resolution",
                    "threshold": 60.0
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["isDuplicate"], serde_json::json!(true));
        assert_eq!(body["highestSimilarity"], serde_json::json!(100.0));
    }

    #[tokio::test]
    async fn test_matches_endpoint_uses_config_defaults() {
        let (app, stores) = test_app().await;
        let mut project = Project::new(1, "Search engine");
        project.required_skills = vec!["rust".into(), "sql".into()];
        let id = stores.projects.insert(project).await.unwrap().id.unwrap();

        stores
            .users
            .upsert(
                DirectoryUser::new(20, "Ana", Role::Student)
                    .with_skills(vec!["rust".into(), "sql".into()]),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(request(
                Method::GET,
                &format!("/api/v1/projects/{}/matches", id),
                Some((1, "student")),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["matches"][0]["studentId"], serde_json::json!(20));
        assert_eq!(body["matches"][0]["matchLevel"], serde_json::json!("best_fit"));
    }
}
