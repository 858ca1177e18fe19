//! Project milestone model
//!
//! Table: project_milestones

use chrono::{DateTime, Utc};
use cap_core::traits::{Entity, Id, Identifiable, Timestamped};
use cap_core::types::{MilestoneStatus, ProjectPhase};
use serde::{Deserialize, Serialize};

/// Durable record of a workflow phase's review outcome and feedback
///
/// Keyed by `(project_id, phase)`; at most one record per key is
/// meaningfully active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMilestone {
    pub id: Option<Id>,
    pub project_id: Id,
    pub phase: ProjectPhase,
    #[serde(default)]
    pub status: MilestoneStatus,
    pub reviewer_id: Option<Id>,
    pub feedback: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProjectMilestone {
    /// Fresh in-progress record for a phase being entered.
    pub fn begin(project_id: Id, phase: ProjectPhase) -> Self {
        Self {
            id: None,
            project_id,
            phase,
            status: MilestoneStatus::InProgress,
            reviewer_id: None,
            feedback: None,
            completed_at: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for ProjectMilestone {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for ProjectMilestone {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for ProjectMilestone {
    const TABLE_NAME: &'static str = "project_milestones";
    const TYPE_NAME: &'static str = "ProjectMilestone";
}
