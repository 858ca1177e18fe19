//! Collaboration protocols for Capstone RS
//!
//! Two coordinators over the shared project record: attaching a supervisor
//! through a request/approve protocol, and building a student team through
//! skill-matched invitations.

pub mod supervision;
pub mod team;

pub use supervision::{AssignmentOutcome, SupervisorAssignmentCoordinator};
pub use team::{GroupedMatches, MatchResults, TeamFormationCoordinator};
