//! Application state

use std::sync::Arc;

use cap_collab::{SupervisorAssignmentCoordinator, TeamFormationCoordinator};
use cap_core::config::AppConfig;
use cap_notifications::NotificationSink;
use cap_store::{
    MemoryStores, MilestoneStore, ProjectStore, SuggestionStore, SupervisorRequestStore,
    TeamMemberStore, UserDirectory,
};
use cap_workflow::{MilestoneTracker, WorkflowEngine};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub workflow: WorkflowEngine,
    pub supervision: SupervisorAssignmentCoordinator,
    pub teams: TeamFormationCoordinator,
    pub projects: Arc<dyn ProjectStore>,
}

impl AppState {
    /// Wire the engine and coordinators over one set of stores.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: AppConfig,
        projects: Arc<dyn ProjectStore>,
        requests: Arc<dyn SupervisorRequestStore>,
        members: Arc<dyn TeamMemberStore>,
        suggestions: Arc<dyn SuggestionStore>,
        milestones: Arc<dyn MilestoneStore>,
        users: Arc<dyn UserDirectory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let workflow = WorkflowEngine::new(
            projects.clone(),
            MilestoneTracker::new(milestones),
            sink.clone(),
        );
        let supervision = SupervisorAssignmentCoordinator::new(
            requests,
            projects.clone(),
            users.clone(),
            sink.clone(),
        );
        let teams =
            TeamFormationCoordinator::new(projects.clone(), members, suggestions, users, sink);

        Self {
            config: Arc::new(config),
            workflow,
            supervision,
            teams,
            projects,
        }
    }

    /// State over the in-memory stores, for tests and DB-less runs.
    pub fn in_memory(config: AppConfig, stores: &MemoryStores, sink: Arc<dyn NotificationSink>) -> Self {
        Self::new(
            config,
            stores.projects.clone(),
            stores.requests.clone(),
            stores.members.clone(),
            stores.suggestions.clone(),
            stores.milestones.clone(),
            stores.users.clone(),
            sink,
        )
    }
}
