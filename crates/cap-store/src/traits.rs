//! Storage traits
//!
//! Single-document operations only; the compare-and-set mutations encode the
//! concurrency discipline (a racing transition loses cleanly instead of
//! producing a lost update).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cap_core::traits::Id;
use cap_core::types::{MembershipStatus, ProjectPhase, RequestStatus};
use cap_models::{
    DirectoryUser, Project, ProjectMilestone, SupervisorRequest, TeamMatchSuggestion, TeamMember,
};

use crate::error::StoreResult;

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert(&self, project: Project) -> StoreResult<Project>;

    async fn find(&self, id: Id) -> StoreResult<Option<Project>>;

    /// All projects; used to assemble the duplicate-detection corpus.
    async fn list(&self) -> StoreResult<Vec<Project>>;

    /// Move the phase iff it still equals `expected`. Returns whether the
    /// transition won.
    async fn set_phase(
        &self,
        id: Id,
        expected: ProjectPhase,
        next: ProjectPhase,
    ) -> StoreResult<bool>;

    /// Set the supervisor iff none is assigned. Returns whether it won.
    async fn assign_supervisor(&self, id: Id, supervisor_id: Id) -> StoreResult<bool>;

    /// Set-semantic add to `student_ids`.
    async fn add_student(&self, id: Id, user_id: Id) -> StoreResult<()>;

    async fn remove_student(&self, id: Id, user_id: Id) -> StoreResult<()>;
}

#[async_trait]
pub trait SupervisorRequestStore: Send + Sync {
    async fn insert(&self, request: SupervisorRequest) -> StoreResult<SupervisorRequest>;

    async fn find(&self, id: Id) -> StoreResult<Option<SupervisorRequest>>;

    /// Whether a pending request exists for the exact
    /// `(student, supervisor, project)` triple.
    async fn pending_exists(
        &self,
        student_id: Id,
        supervisor_id: Id,
        project_id: Option<Id>,
    ) -> StoreResult<bool>;

    /// Move a pending request to a terminal status. Returns false when the
    /// request was already resolved (or does not exist).
    async fn resolve(
        &self,
        id: Id,
        status: RequestStatus,
        response: Option<String>,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<bool>;
}

#[async_trait]
pub trait TeamMemberStore: Send + Sync {
    async fn insert(&self, member: TeamMember) -> StoreResult<TeamMember>;

    async fn find(&self, id: Id) -> StoreResult<Option<TeamMember>>;

    /// The user's non-`left` membership on the project, if any.
    async fn find_current(&self, project_id: Id, user_id: Id) -> StoreResult<Option<TeamMember>>;

    /// Move the status iff it still equals `expected`, optionally stamping
    /// `joined_at`. Returns whether the transition won.
    async fn set_status(
        &self,
        id: Id,
        expected: MembershipStatus,
        next: MembershipStatus,
        joined_at: Option<DateTime<Utc>>,
    ) -> StoreResult<bool>;

    /// Remove the record outright (rejected invitations leave no trace).
    async fn delete(&self, id: Id) -> StoreResult<bool>;
}

#[async_trait]
pub trait SuggestionStore: Send + Sync {
    /// Replace the project's whole suggestion set in one snapshot swap; a
    /// concurrent reader sees either the old set or the new one, never an
    /// empty interval.
    async fn replace_for_project(
        &self,
        project_id: Id,
        suggestions: Vec<TeamMatchSuggestion>,
    ) -> StoreResult<()>;

    async fn list_for_project(&self, project_id: Id) -> StoreResult<Vec<TeamMatchSuggestion>>;
}

#[async_trait]
pub trait MilestoneStore: Send + Sync {
    async fn find(&self, project_id: Id, phase: ProjectPhase)
        -> StoreResult<Option<ProjectMilestone>>;

    /// Insert or overwrite the record keyed by `(project_id, phase)`.
    async fn upsert(&self, milestone: ProjectMilestone) -> StoreResult<ProjectMilestone>;

    async fn list_for_project(&self, project_id: Id) -> StoreResult<Vec<ProjectMilestone>>;
}

/// User directory surface consumed by the core
///
/// Lookup by id and the student candidate pool are reads; the only write is
/// recording a newly supervised project on approval.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find(&self, id: Id) -> StoreResult<Option<DirectoryUser>>;

    async fn students(&self) -> StoreResult<Vec<DirectoryUser>>;

    async fn record_supervised_project(&self, supervisor_id: Id, project_id: Id)
        -> StoreResult<()>;

    async fn upsert(&self, user: DirectoryUser) -> StoreResult<()>;
}
