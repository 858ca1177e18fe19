//! Team membership model
//!
//! Table: team_members

use chrono::{DateTime, Utc};
use cap_core::traits::{Entity, Id, Identifiable, Timestamped};
use cap_core::types::{MembershipStatus, TeamRole};
use serde::{Deserialize, Serialize};

/// Invitation/membership record for a project team
///
/// A user holds at most one non-`left` membership per project; the leader
/// (project author) can never reach `left`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Option<Id>,
    pub project_id: Id,
    pub user_id: Id,
    #[serde(default)]
    pub role: TeamRole,
    #[serde(default)]
    pub status: MembershipStatus,
    pub invite_message: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TeamMember {
    /// Pending invitation for a regular member.
    pub fn invitation(project_id: Id, user_id: Id, message: Option<String>) -> Self {
        Self {
            id: None,
            project_id,
            user_id,
            role: TeamRole::Member,
            status: MembershipStatus::Invited,
            invite_message: message,
            joined_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Active leader record for the project author.
    pub fn leader(project_id: Id, user_id: Id, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            project_id,
            user_id,
            role: TeamRole::Leader,
            status: MembershipStatus::Active,
            invite_message: None,
            joined_at: Some(joined_at),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_invited(&self) -> bool {
        self.status == MembershipStatus::Invited
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    pub fn is_leader(&self) -> bool {
        self.role == TeamRole::Leader
    }
}

impl Identifiable for TeamMember {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for TeamMember {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for TeamMember {
    const TABLE_NAME: &'static str = "team_members";
    const TYPE_NAME: &'static str = "TeamMember";
}
