//! Supervisor assignment protocol
//!
//! A student sends a one-shot request to a supervisor, optionally tied to a
//! project; the supervisor approves or rejects it. Approving a project-tied
//! request assigns the supervisor to the project. Assignment is orthogonal
//! to workflow phase progression: no phase is touched here.

use std::sync::Arc;

use chrono::Utc;
use cap_core::traits::Id;
use cap_core::types::{RequestStatus, RespondAction};
use cap_core::{CoreError, CoreResult};
use cap_models::SupervisorRequest;
use cap_notifications::{deliver_best_effort, Notification, NotificationKind, NotificationSink};
use cap_store::{ProjectStore, SupervisorRequestStore, UserDirectory};

/// Result of responding to a supervisor request
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub request: SupervisorRequest,
    /// Whether the project assignment was applied. False on rejection, on
    /// requests without a project, and when the project gained a supervisor
    /// between send and respond.
    pub project_assigned: bool,
}

#[derive(Clone)]
pub struct SupervisorAssignmentCoordinator {
    requests: Arc<dyn SupervisorRequestStore>,
    projects: Arc<dyn ProjectStore>,
    users: Arc<dyn UserDirectory>,
    sink: Arc<dyn NotificationSink>,
}

impl SupervisorAssignmentCoordinator {
    pub fn new(
        requests: Arc<dyn SupervisorRequestStore>,
        projects: Arc<dyn ProjectStore>,
        users: Arc<dyn UserDirectory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            requests,
            projects,
            users,
            sink,
        }
    }

    /// Send a supervision request from a student to a supervisor.
    ///
    /// With a project attached, the project must belong to the student and
    /// have no supervisor yet. At most one pending request may exist per
    /// `(student, supervisor, project)` triple.
    pub async fn send_request(
        &self,
        student_id: Id,
        supervisor_id: Id,
        project_id: Option<Id>,
        message: String,
    ) -> CoreResult<SupervisorRequest> {
        let target = self
            .users
            .find(supervisor_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", supervisor_id))?;
        if !target.is_supervisor() {
            return Err(CoreError::validation(
                "supervisorId",
                "is not a supervisor",
            ));
        }

        if let Some(project_id) = project_id {
            let project = self
                .projects
                .find(project_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Project", project_id))?;
            if !project.is_author(student_id) {
                return Err(CoreError::forbidden(
                    "only the project author can request a supervisor for it",
                ));
            }
            if project.has_supervisor() {
                return Err(CoreError::conflict("project already has a supervisor"));
            }
        }

        if self
            .requests
            .pending_exists(student_id, supervisor_id, project_id)
            .await?
        {
            return Err(CoreError::conflict(
                "an identical request is already pending",
            ));
        }

        let request = self
            .requests
            .insert(SupervisorRequest::new(
                student_id,
                supervisor_id,
                project_id,
                message,
            ))
            .await?;

        deliver_best_effort(
            self.sink.as_ref(),
            Notification::new(
                supervisor_id,
                NotificationKind::SupervisorRequestReceived,
                format!("Student {} requested your supervision", student_id),
            ),
        )
        .await;

        tracing::info!(student_id, supervisor_id, ?project_id, "supervision requested");
        Ok(request)
    }

    /// Approve or reject a pending request.
    ///
    /// On approval of a project-tied request the supervisor is assigned to
    /// the project (iff it is still unassigned) and the project is recorded
    /// in the supervisor's supervised set.
    pub async fn respond(
        &self,
        request_id: Id,
        supervisor_id: Id,
        action: RespondAction,
        response: Option<String>,
    ) -> CoreResult<AssignmentOutcome> {
        let request = self
            .requests
            .find(request_id)
            .await?
            .ok_or_else(|| CoreError::not_found("SupervisorRequest", request_id))?;

        if request.supervisor_id != supervisor_id {
            return Err(CoreError::forbidden(
                "only the addressed supervisor can respond to this request",
            ));
        }
        if !request.is_pending() {
            return Err(CoreError::precondition("request was already resolved"));
        }

        let status = match action {
            RespondAction::Approve => RequestStatus::Approved,
            RespondAction::Reject => RequestStatus::Rejected,
        };
        if !self
            .requests
            .resolve(request_id, status, response, Utc::now())
            .await?
        {
            return Err(CoreError::precondition("request was already resolved"));
        }

        let mut project_assigned = false;
        if status == RequestStatus::Approved {
            if let Some(project_id) = request.project_id {
                project_assigned = self
                    .projects
                    .assign_supervisor(project_id, supervisor_id)
                    .await?;
                if project_assigned {
                    self.users
                        .record_supervised_project(supervisor_id, project_id)
                        .await?;
                } else {
                    tracing::warn!(
                        project_id,
                        supervisor_id,
                        "project gained a supervisor before approval; assignment skipped"
                    );
                }
            }
        }

        let kind = match status {
            RequestStatus::Approved => NotificationKind::SupervisorRequestApproved,
            _ => NotificationKind::SupervisorRequestRejected,
        };
        deliver_best_effort(
            self.sink.as_ref(),
            Notification::new(
                request.student_id,
                kind,
                format!("Your supervision request was {}", status.as_str()),
            ),
        )
        .await;

        let request = self
            .requests
            .find(request_id)
            .await?
            .ok_or_else(|| CoreError::not_found("SupervisorRequest", request_id))?;

        tracing::info!(request_id, supervisor_id, ?action, "supervision request resolved");
        Ok(AssignmentOutcome {
            request,
            project_assigned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_core::types::{ProjectPhase, Role};
    use cap_models::{DirectoryUser, Project};
    use cap_notifications::MemorySink;
    use cap_store::MemoryStores;

    struct Fixture {
        coordinator: SupervisorAssignmentCoordinator,
        stores: MemoryStores,
        sink: Arc<MemorySink>,
    }

    async fn fixture() -> Fixture {
        let stores = MemoryStores::new();
        let sink = Arc::new(MemorySink::new());
        let coordinator = SupervisorAssignmentCoordinator::new(
            stores.requests.clone(),
            stores.projects.clone(),
            stores.users.clone(),
            sink.clone(),
        );

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

        Fixture {
            coordinator,
            stores,
            sink,
        }
    }

    async fn seed_project(fixture: &Fixture, author_id: Id) -> Id {
        let project = fixture
            .stores
            .projects
            .insert(Project::new(author_id, "Quadcopter swarm control"))
            .await
            .unwrap();
        project.id.unwrap()
    }

    #[tokio::test]
    async fn test_send_and_approve_assigns_project() {
        let fixture = fixture().await;
        let project_id = seed_project(&fixture, 1).await;

        let request = fixture
            .coordinator
            .send_request(1, 10, Some(project_id), "please supervise".into())
            .await
            .unwrap();
        assert!(request.is_pending());

        let outcome = fixture
            .coordinator
            .respond(
                request.id.unwrap(),
                10,
                RespondAction::Approve,
                Some("happy to".into()),
            )
            .await
            .unwrap();

        assert!(outcome.project_assigned);
        assert_eq!(outcome.request.status, RequestStatus::Approved);
        assert_eq!(outcome.request.supervisor_response.as_deref(), Some("happy to"));
        assert!(outcome.request.responded_at.is_some());

        let project = fixture.stores.projects.find(project_id).await.unwrap().unwrap();
        assert_eq!(project.supervisor_id, Some(10));
        // Assignment never touches the workflow phase.
        assert_eq!(project.phase, ProjectPhase::Draft);

        let supervisor = fixture.stores.users.find(10).await.unwrap().unwrap();
        assert_eq!(supervisor.supervised_project_ids, vec![project_id]);
    }

    #[tokio::test]
    async fn test_send_to_non_supervisor_fails_validation() {
        let fixture = fixture().await;
        let err = fixture
            .coordinator
            .send_request(1, 1, None, "hi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_send_for_foreign_project_is_forbidden() {
        let fixture = fixture().await;
        let project_id = seed_project(&fixture, 2).await;

        let err = fixture
            .coordinator
            .send_request(1, 10, Some(project_id), "hi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_send_for_supervised_project_conflicts() {
        let fixture = fixture().await;
        let project_id = seed_project(&fixture, 1).await;
        fixture.stores.projects.assign_supervisor(project_id, 77).await.unwrap();

        let err = fixture
            .coordinator
            .send_request(1, 10, Some(project_id), "hi".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_pending_request_conflicts() {
        let fixture = fixture().await;
        let project_id = seed_project(&fixture, 1).await;

        fixture
            .coordinator
            .send_request(1, 10, Some(project_id), "first".into())
            .await
            .unwrap();
        let err = fixture
            .coordinator
            .send_request(1, 10, Some(project_id), "second".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_new_request_allowed_after_resolution() {
        let fixture = fixture().await;

        let request = fixture
            .coordinator
            .send_request(1, 10, None, "first".into())
            .await
            .unwrap();
        fixture
            .coordinator
            .respond(request.id.unwrap(), 10, RespondAction::Reject, None)
            .await
            .unwrap();

        // The triple is free again once the first request is terminal.
        fixture
            .coordinator
            .send_request(1, 10, None, "second".into())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_respond_requires_addressed_supervisor() {
        let fixture = fixture().await;
        let request = fixture
            .coordinator
            .send_request(1, 10, None, "hi".into())
            .await
            .unwrap();

        let err = fixture
            .coordinator
            .respond(request.id.unwrap(), 11, RespondAction::Approve, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_respond_twice_fails_precondition() {
        let fixture = fixture().await;
        let request = fixture
            .coordinator
            .send_request(1, 10, None, "hi".into())
            .await
            .unwrap();

        fixture
            .coordinator
            .respond(request.id.unwrap(), 10, RespondAction::Approve, None)
            .await
            .unwrap();
        let err = fixture
            .coordinator
            .respond(request.id.unwrap(), 10, RespondAction::Reject, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PreconditionFailed { .. }));
    }

    #[tokio::test]
    async fn test_approval_skips_assignment_when_raced() {
        let fixture = fixture().await;
        let project_id = seed_project(&fixture, 1).await;

        let request = fixture
            .coordinator
            .send_request(1, 10, Some(project_id), "hi".into())
            .await
            .unwrap();

        // Another supervisor wins between send and respond.
        fixture.stores.projects.assign_supervisor(project_id, 77).await.unwrap();

        let outcome = fixture
            .coordinator
            .respond(request.id.unwrap(), 10, RespondAction::Approve, None)
            .await
            .unwrap();

        assert!(!outcome.project_assigned);
        assert_eq!(outcome.request.status, RequestStatus::Approved);
        let project = fixture.stores.projects.find(project_id).await.unwrap().unwrap();
        assert_eq!(project.supervisor_id, Some(77));
    }

    #[tokio::test]
    async fn test_notifications_are_sent() {
        let fixture = fixture().await;
        let request = fixture
            .coordinator
            .send_request(1, 10, None, "hi".into())
            .await
            .unwrap();
        fixture
            .coordinator
            .respond(request.id.unwrap(), 10, RespondAction::Approve, None)
            .await
            .unwrap();

        let delivered = fixture.sink.delivered().await;
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].recipient, 10);
        assert_eq!(delivered[1].recipient, 1);
    }
}
