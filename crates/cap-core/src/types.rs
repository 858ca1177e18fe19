//! Common types used throughout Capstone RS

use serde::{Deserialize, Serialize};

use crate::traits::Id;

/// Lifecycle phase of a project
///
/// The legal transitions between phases are owned by the workflow engine;
/// this enum only names the states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectPhase {
    #[default]
    Draft,
    PendingProposal,
    SupervisorReview,
    ChangesRequested,
    Approved,
    MidDefense,
    FinalSubmission,
    Completed,
    Archived,
}

impl ProjectPhase {
    pub const ALL: [ProjectPhase; 9] = [
        Self::Draft,
        Self::PendingProposal,
        Self::SupervisorReview,
        Self::ChangesRequested,
        Self::Approved,
        Self::MidDefense,
        Self::FinalSubmission,
        Self::Completed,
        Self::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingProposal => "pending_proposal",
            Self::SupervisorReview => "supervisor_review",
            Self::ChangesRequested => "changes_requested",
            Self::Approved => "approved",
            Self::MidDefense => "mid_defense",
            Self::FinalSubmission => "final_submission",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }

    /// Archived projects accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }
}

impl std::fmt::Display for ProjectPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role supplied by the authentication layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Supervisor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Supervisor => "supervisor",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Self::Student),
            "supervisor" => Some(Self::Supervisor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Authenticated principal, injected by the upstream auth layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id: Id,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Id, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Categorical bucket derived from a match score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
    BestFit,
    GoodFit,
    NeedsTraining,
    /// The project declared no required skills; not a real candidate signal.
    NoRequirements,
}

impl MatchLevel {
    /// Bucket a 0-100 score: >= 70 best fit, 40-69 good fit, else training.
    pub fn for_score(score: u8) -> Self {
        if score >= 70 {
            Self::BestFit
        } else if score >= 40 {
            Self::GoodFit
        } else {
            Self::NeedsTraining
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestFit => "best_fit",
            Self::GoodFit => "good_fit",
            Self::NeedsTraining => "needs_training",
            Self::NoRequirements => "no_requirements",
        }
    }
}

/// Milestone review state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Rejected,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

/// Supervisor request state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Team membership state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Invited,
    Active,
    Left,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Active => "active",
            Self::Left => "left",
        }
    }
}

/// Role within a project team
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Leader,
    #[default]
    Member,
}

/// Action taken by a reviewer on a proposal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    RequestChanges,
    Reject,
}

/// Accept/reject answer to a supervisor request or a team invitation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RespondAction {
    Approve,
    Reject,
}
