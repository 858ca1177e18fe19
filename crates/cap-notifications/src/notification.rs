//! Notification record

use chrono::{DateTime, Utc};
use cap_core::traits::Id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SupervisorRequestReceived,
    SupervisorRequestApproved,
    SupervisorRequestRejected,
    ProposalSubmitted,
    ProposalReviewed,
    PhaseAdvanced,
    TeamInviteReceived,
    TeamInviteAccepted,
    TeamMemberLeft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub recipient: Id,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(recipient: Id, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            recipient,
            kind,
            message: message.into(),
            created_at: None,
        }
    }
}
