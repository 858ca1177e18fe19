//! Phase transition table
//!
//! The single source of truth for legal phase transitions. Kept as data so
//! adding a phase cannot silently create an unreachable or duplicate edge.

use cap_core::types::ProjectPhase;

/// Direct successors of a phase.
///
/// The only back-edge is `changes_requested -> pending_proposal`; `archived`
/// is terminal.
pub fn successors(phase: ProjectPhase) -> &'static [ProjectPhase] {
    use ProjectPhase::*;
    match phase {
        Draft => &[PendingProposal],
        PendingProposal => &[SupervisorReview],
        SupervisorReview => &[Approved, ChangesRequested],
        ChangesRequested => &[PendingProposal],
        Approved => &[MidDefense],
        MidDefense => &[FinalSubmission],
        FinalSubmission => &[Completed],
        Completed => &[Archived],
        Archived => &[],
    }
}

pub fn is_successor(from: ProjectPhase, target: ProjectPhase) -> bool {
    successors(from).contains(&target)
}

/// Phases from which a reviewer may request changes or reject.
pub fn reviewable(phase: ProjectPhase) -> bool {
    matches!(
        phase,
        ProjectPhase::PendingProposal | ProjectPhase::SupervisorReview
    )
}
