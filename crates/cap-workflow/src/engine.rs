//! Workflow engine
//!
//! Drives a project's phase through the transition table, recording one
//! milestone per phase entered. Phase moves are compare-and-set: a racing
//! transition surfaces as PreconditionFailed instead of a lost update.

use std::sync::Arc;

use cap_core::traits::Id;
use cap_core::types::{Principal, ProjectPhase, ReviewAction};
use cap_core::{CoreError, CoreResult};
use cap_models::Project;
use cap_notifications::{deliver_best_effort, Notification, NotificationKind, NotificationSink};
use cap_store::ProjectStore;

use crate::milestones::MilestoneTracker;
use crate::transitions::{is_successor, reviewable, successors};

/// The milestone key for proposal review outcomes.
const PROPOSAL_PHASE: ProjectPhase = ProjectPhase::SupervisorReview;

#[derive(Clone)]
pub struct WorkflowEngine {
    projects: Arc<dyn ProjectStore>,
    milestones: MilestoneTracker,
    sink: Arc<dyn NotificationSink>,
}

impl WorkflowEngine {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        milestones: MilestoneTracker,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            projects,
            milestones,
            sink,
        }
    }

    pub fn milestones(&self) -> &MilestoneTracker {
        &self.milestones
    }

    /// Submit a draft proposal for supervisor review.
    ///
    /// Requires the actor to be the author, the project to be in draft and a
    /// supervisor to be assigned. Moves the phase to supervisor_review and
    /// opens the proposal milestone.
    pub async fn submit_proposal(&self, project_id: Id, actor: &Principal) -> CoreResult<Project> {
        let project = self.load(project_id).await?;

        if !project.is_author(actor.id) {
            return Err(CoreError::forbidden(
                "only the project author can submit the proposal",
            ));
        }
        if project.phase != ProjectPhase::Draft {
            return Err(CoreError::precondition(format!(
                "proposal can only be submitted from draft (currently {})",
                project.phase
            )));
        }
        if !project.has_supervisor() {
            return Err(CoreError::precondition(
                "a supervisor must be assigned before submitting",
            ));
        }

        self.move_phase(project_id, ProjectPhase::Draft, ProjectPhase::SupervisorReview)
            .await?;
        self.milestones.begin(project_id, PROPOSAL_PHASE).await?;

        if let Some(supervisor_id) = project.supervisor_id {
            deliver_best_effort(
                self.sink.as_ref(),
                Notification::new(
                    supervisor_id,
                    NotificationKind::ProposalSubmitted,
                    format!("Proposal \"{}\" was submitted for your review", project.title),
                ),
            )
            .await;
        }

        tracing::info!(project_id, actor = actor.id, "proposal submitted");
        self.load(project_id).await
    }

    /// Review a submitted proposal.
    ///
    /// `approve` is legal only from supervisor_review; `request_changes` and
    /// `reject` move any reviewable phase to changes_requested and require
    /// feedback text. The reject/request_changes distinction survives only in
    /// the milestone record, not in the project phase.
    pub async fn review(
        &self,
        project_id: Id,
        actor: &Principal,
        action: ReviewAction,
        feedback: Option<String>,
    ) -> CoreResult<Project> {
        let project = self.load(project_id).await?;
        self.authorize_reviewer(&project, actor)?;

        match action {
            ReviewAction::Approve => {
                if project.phase != ProjectPhase::SupervisorReview {
                    return Err(self.invalid_transition(&project, ProjectPhase::Approved));
                }
                self.move_phase(project_id, project.phase, ProjectPhase::Approved)
                    .await?;
                self.milestones
                    .complete(project_id, PROPOSAL_PHASE, Some(actor.id), feedback)
                    .await?;
            }
            ReviewAction::RequestChanges | ReviewAction::Reject => {
                let feedback = feedback.map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
                if feedback.is_none() {
                    return Err(CoreError::validation("feedback", "can't be blank"));
                }
                if !reviewable(project.phase) {
                    return Err(self.invalid_transition(&project, ProjectPhase::ChangesRequested));
                }
                self.move_phase(project_id, project.phase, ProjectPhase::ChangesRequested)
                    .await?;
                self.milestones
                    .reject(project_id, PROPOSAL_PHASE, Some(actor.id), feedback)
                    .await?;
            }
        }

        deliver_best_effort(
            self.sink.as_ref(),
            Notification::new(
                project.author_id,
                NotificationKind::ProposalReviewed,
                format!("Your proposal \"{}\" was reviewed", project.title),
            ),
        )
        .await;

        tracing::info!(project_id, actor = actor.id, ?action, "proposal reviewed");
        self.load(project_id).await
    }

    /// Advance the project to a direct successor phase.
    ///
    /// Surfaces the legal successor set on an illegal target so the caller
    /// can retry correctly.
    pub async fn advance(
        &self,
        project_id: Id,
        actor: &Principal,
        target: ProjectPhase,
    ) -> CoreResult<Project> {
        let project = self.load(project_id).await?;
        self.authorize_reviewer(&project, actor)?;

        if !is_successor(project.phase, target) {
            return Err(self.invalid_transition(&project, target));
        }

        let previous = project.phase;
        self.move_phase(project_id, previous, target).await?;

        // Close out the phase being left, if it had an open milestone, and
        // open one for the phase entered.
        if let Some(open) = self.milestones.find(project_id, previous).await? {
            if open.status == cap_core::types::MilestoneStatus::InProgress {
                self.milestones
                    .complete(project_id, previous, Some(actor.id), None)
                    .await?;
            }
        }
        self.milestones.begin(project_id, target).await?;

        deliver_best_effort(
            self.sink.as_ref(),
            Notification::new(
                project.author_id,
                NotificationKind::PhaseAdvanced,
                format!("Project \"{}\" advanced to {}", project.title, target),
            ),
        )
        .await;

        tracing::info!(project_id, actor = actor.id, from = %previous, to = %target, "phase advanced");
        self.load(project_id).await
    }

    async fn load(&self, project_id: Id) -> CoreResult<Project> {
        self.projects
            .find(project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project", project_id))
    }

    fn authorize_reviewer(&self, project: &Project, actor: &Principal) -> CoreResult<()> {
        if actor.is_admin() || project.supervisor_id == Some(actor.id) {
            return Ok(());
        }
        Err(CoreError::forbidden(
            "only the assigned supervisor or an admin may do this",
        ))
    }

    fn invalid_transition(&self, project: &Project, target: ProjectPhase) -> CoreError {
        CoreError::InvalidTransition {
            from: project.phase,
            target,
            valid: successors(project.phase).to_vec(),
        }
    }

    async fn move_phase(
        &self,
        project_id: Id,
        expected: ProjectPhase,
        next: ProjectPhase,
    ) -> CoreResult<()> {
        if self.projects.set_phase(project_id, expected, next).await? {
            Ok(())
        } else {
            Err(CoreError::precondition(
                "project phase changed concurrently; reload and retry",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_core::types::{MilestoneStatus, Role};
    use cap_notifications::MemorySink;
    use cap_store::{MemoryStores, ProjectStore as _};

    struct Fixture {
        engine: WorkflowEngine,
        stores: MemoryStores,
        author: Principal,
        supervisor: Principal,
        admin: Principal,
    }

    async fn fixture() -> Fixture {
        let stores = MemoryStores::new();
        let sink = Arc::new(MemorySink::new());
        let engine = WorkflowEngine::new(
            stores.projects.clone(),
            MilestoneTracker::new(stores.milestones.clone()),
            sink,
        );
        Fixture {
            engine,
            stores,
            author: Principal::new(1, Role::Student),
            supervisor: Principal::new(10, Role::Supervisor),
            admin: Principal::new(99, Role::Admin),
        }
    }

    async fn seed_project(fixture: &Fixture, phase: ProjectPhase, supervised: bool) -> Id {
        let mut project = Project::new(fixture.author.id, "Compiler for a toy language");
        project.phase = phase;
        if supervised {
            project.supervisor_id = Some(fixture.supervisor.id);
        }
        let inserted = fixture.stores.projects.insert(project).await.unwrap();
        inserted.id.unwrap()
    }

    #[tokio::test]
    async fn test_submit_proposal_happy_path() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::Draft, true).await;

        let project = fixture
            .engine
            .submit_proposal(id, &fixture.author)
            .await
            .unwrap();
        assert_eq!(project.phase, ProjectPhase::SupervisorReview);

        let milestone = fixture
            .engine
            .milestones()
            .find(id, ProjectPhase::SupervisorReview)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(milestone.status, MilestoneStatus::InProgress);
    }

    #[tokio::test]
    async fn test_submit_requires_supervisor() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::Draft, false).await;

        let err = fixture
            .engine
            .submit_proposal(id, &fixture.author)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PreconditionFailed { .. }));

        // Phase unchanged.
        let project = fixture.stores.projects.find(id).await.unwrap().unwrap();
        assert_eq!(project.phase, ProjectPhase::Draft);
    }

    #[tokio::test]
    async fn test_submit_requires_author() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::Draft, true).await;

        let intruder = Principal::new(555, Role::Student);
        let err = fixture
            .engine
            .submit_proposal(id, &intruder)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_submit_twice_fails_second_time() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::Draft, true).await;

        fixture.engine.submit_proposal(id, &fixture.author).await.unwrap();
        let err = fixture
            .engine
            .submit_proposal(id, &fixture.author)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PreconditionFailed { .. }));
    }

    #[tokio::test]
    async fn test_approve_from_review() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::SupervisorReview, true).await;

        let project = fixture
            .engine
            .review(id, &fixture.supervisor, ReviewAction::Approve, Some("solid".into()))
            .await
            .unwrap();
        assert_eq!(project.phase, ProjectPhase::Approved);

        let milestone = fixture
            .engine
            .milestones()
            .find(id, ProjectPhase::SupervisorReview)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(milestone.status, MilestoneStatus::Completed);
        assert_eq!(milestone.reviewer_id, Some(fixture.supervisor.id));
    }

    #[tokio::test]
    async fn test_approve_only_from_review_phase() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::PendingProposal, true).await;

        let err = fixture
            .engine
            .review(id, &fixture.supervisor, ReviewAction::Approve, None)
            .await
            .unwrap_err();
        match err {
            CoreError::InvalidTransition { valid, .. } => {
                assert_eq!(valid, vec![ProjectPhase::SupervisorReview]);
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reject_requires_feedback() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::SupervisorReview, true).await;

        let err = fixture
            .engine
            .review(id, &fixture.supervisor, ReviewAction::Reject, Some("   ".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_reject_and_request_changes_collapse() {
        let fixture = fixture().await;
        for action in [ReviewAction::Reject, ReviewAction::RequestChanges] {
            let id = seed_project(&fixture, ProjectPhase::SupervisorReview, true).await;
            let project = fixture
                .engine
                .review(id, &fixture.supervisor, action, Some("needs narrower scope".into()))
                .await
                .unwrap();
            assert_eq!(project.phase, ProjectPhase::ChangesRequested);

            let milestone = fixture
                .engine
                .milestones()
                .find(id, ProjectPhase::SupervisorReview)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(milestone.status, MilestoneStatus::Rejected);
            assert_eq!(milestone.feedback.as_deref(), Some("needs narrower scope"));
        }
    }

    #[tokio::test]
    async fn test_review_requires_supervisor_or_admin() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::SupervisorReview, true).await;

        let err = fixture
            .engine
            .review(id, &fixture.author, ReviewAction::Approve, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));

        // Admin passes the actor check.
        let project = fixture
            .engine
            .review(id, &fixture.admin, ReviewAction::Approve, None)
            .await
            .unwrap();
        assert_eq!(project.phase, ProjectPhase::Approved);
    }

    #[tokio::test]
    async fn test_advance_walks_the_tail_of_the_graph() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::Approved, true).await;

        for target in [
            ProjectPhase::MidDefense,
            ProjectPhase::FinalSubmission,
            ProjectPhase::Completed,
            ProjectPhase::Archived,
        ] {
            let project = fixture
                .engine
                .advance(id, &fixture.supervisor, target)
                .await
                .unwrap();
            assert_eq!(project.phase, target);
        }
    }

    #[tokio::test]
    async fn test_advance_rejects_all_illegal_pairs() {
        let fixture = fixture().await;
        for from in ProjectPhase::ALL {
            for target in ProjectPhase::ALL {
                if is_successor(from, target) {
                    continue;
                }
                let id = seed_project(&fixture, from, true).await;
                let err = fixture
                    .engine
                    .advance(id, &fixture.supervisor, target)
                    .await
                    .unwrap_err();
                match err {
                    CoreError::InvalidTransition { valid, .. } => {
                        assert_eq!(valid, successors(from).to_vec());
                    }
                    other => panic!(
                        "expected InvalidTransition for {} -> {}, got {:?}",
                        from, target, other
                    ),
                }
            }
        }
    }

    #[tokio::test]
    async fn test_advance_requires_reviewer() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::Approved, true).await;

        let err = fixture
            .engine
            .advance(id, &fixture.author, ProjectPhase::MidDefense)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_advance_closes_open_milestone() {
        let fixture = fixture().await;
        let id = seed_project(&fixture, ProjectPhase::Approved, true).await;

        fixture
            .engine
            .advance(id, &fixture.supervisor, ProjectPhase::MidDefense)
            .await
            .unwrap();
        fixture
            .engine
            .advance(id, &fixture.supervisor, ProjectPhase::FinalSubmission)
            .await
            .unwrap();

        let mid_defense = fixture
            .engine
            .milestones()
            .find(id, ProjectPhase::MidDefense)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mid_defense.status, MilestoneStatus::Completed);

        let final_submission = fixture
            .engine
            .milestones()
            .find(id, ProjectPhase::FinalSubmission)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(final_submission.status, MilestoneStatus::InProgress);
    }

    #[tokio::test]
    async fn test_missing_project_is_not_found() {
        let fixture = fixture().await;
        let err = fixture
            .engine
            .submit_proposal(404, &fixture.author)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
