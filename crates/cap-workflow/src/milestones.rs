//! Milestone tracker
//!
//! Records phase-scoped review state keyed by `(project_id, phase)`. The
//! tracker has no transition table of its own; it writes whatever the
//! workflow engine asks it to record.

use std::sync::Arc;

use chrono::Utc;
use cap_core::traits::Id;
use cap_core::types::{MilestoneStatus, ProjectPhase};
use cap_core::CoreResult;
use cap_models::ProjectMilestone;
use cap_store::MilestoneStore;

#[derive(Clone)]
pub struct MilestoneTracker {
    store: Arc<dyn MilestoneStore>,
}

impl MilestoneTracker {
    pub fn new(store: Arc<dyn MilestoneStore>) -> Self {
        Self { store }
    }

    /// Mark the milestone for a phase in progress, creating it if needed.
    pub async fn begin(&self, project_id: Id, phase: ProjectPhase) -> CoreResult<ProjectMilestone> {
        let milestone = match self.store.find(project_id, phase).await? {
            Some(mut existing) => {
                existing.status = MilestoneStatus::InProgress;
                existing
            }
            None => ProjectMilestone::begin(project_id, phase),
        };
        Ok(self.store.upsert(milestone).await?)
    }

    /// Record a completed review outcome for a phase.
    pub async fn complete(
        &self,
        project_id: Id,
        phase: ProjectPhase,
        reviewer_id: Option<Id>,
        feedback: Option<String>,
    ) -> CoreResult<ProjectMilestone> {
        self.finish(project_id, phase, MilestoneStatus::Completed, reviewer_id, feedback)
            .await
    }

    /// Record a rejected review outcome for a phase.
    pub async fn reject(
        &self,
        project_id: Id,
        phase: ProjectPhase,
        reviewer_id: Option<Id>,
        feedback: Option<String>,
    ) -> CoreResult<ProjectMilestone> {
        self.finish(project_id, phase, MilestoneStatus::Rejected, reviewer_id, feedback)
            .await
    }

    /// The phase's milestone, if one has been recorded.
    pub async fn find(
        &self,
        project_id: Id,
        phase: ProjectPhase,
    ) -> CoreResult<Option<ProjectMilestone>> {
        Ok(self.store.find(project_id, phase).await?)
    }

    pub async fn list(&self, project_id: Id) -> CoreResult<Vec<ProjectMilestone>> {
        Ok(self.store.list_for_project(project_id).await?)
    }

    async fn finish(
        &self,
        project_id: Id,
        phase: ProjectPhase,
        status: MilestoneStatus,
        reviewer_id: Option<Id>,
        feedback: Option<String>,
    ) -> CoreResult<ProjectMilestone> {
        let mut milestone = self
            .store
            .find(project_id, phase)
            .await?
            .unwrap_or_else(|| ProjectMilestone::begin(project_id, phase));

        milestone.status = status;
        milestone.reviewer_id = reviewer_id;
        milestone.feedback = feedback;
        milestone.completed_at = (status == MilestoneStatus::Completed).then(Utc::now);

        Ok(self.store.upsert(milestone).await?)
    }
}
