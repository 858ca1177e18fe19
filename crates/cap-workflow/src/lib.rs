//! Project lifecycle workflow engine
//!
//! Owns the project's phase field and the transition graph between phases,
//! and records one milestone per phase entered.

pub mod engine;
pub mod milestones;
pub mod transitions;

pub use engine::WorkflowEngine;
pub use milestones::MilestoneTracker;
pub use transitions::{is_successor, reviewable, successors};
