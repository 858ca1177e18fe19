//! Core types for Capstone RS
//!
//! Shared error taxonomy, domain enums, entity traits and configuration used
//! by every other crate in the workspace.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoreError, CoreResult, ValidationErrors};
pub use traits::{Entity, Id, Identifiable, Timestamped};
pub use types::{
    MatchLevel, MembershipStatus, MilestoneStatus, Principal, ProjectPhase, RequestStatus,
    RespondAction, ReviewAction, Role, TeamRole,
};
