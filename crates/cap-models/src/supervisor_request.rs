//! Supervisor request model
//!
//! Table: supervisor_requests

use chrono::{DateTime, Utc};
use cap_core::traits::{Entity, Id, Identifiable, Timestamped};
use cap_core::types::RequestStatus;
use serde::{Deserialize, Serialize};

/// One-shot proposal from a student to a supervisor
///
/// At most one pending request may exist per
/// `(student_id, supervisor_id, project_id)` triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorRequest {
    pub id: Option<Id>,
    pub student_id: Id,
    pub supervisor_id: Id,
    /// Project the request is tied to, if any; approving such a request
    /// assigns the supervisor to the project.
    pub project_id: Option<Id>,
    pub message: String,
    #[serde(default)]
    pub status: RequestStatus,
    pub supervisor_response: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl SupervisorRequest {
    pub fn new(
        student_id: Id,
        supervisor_id: Id,
        project_id: Option<Id>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            student_id,
            supervisor_id,
            project_id,
            message: message.into(),
            status: RequestStatus::Pending,
            supervisor_response: None,
            created_at: None,
            responded_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

impl Identifiable for SupervisorRequest {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for SupervisorRequest {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }
}

impl Entity for SupervisorRequest {
    const TABLE_NAME: &'static str = "supervisor_requests";
    const TYPE_NAME: &'static str = "SupervisorRequest";
}
