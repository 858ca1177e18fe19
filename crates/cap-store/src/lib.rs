//! Storage traits and in-memory implementations
//!
//! Each entity family gets its own trait; mutations that must not lose
//! updates under concurrent requests are compare-and-set operations. The
//! in-memory stores back tests and database-less development runs.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{
    MemoryMilestoneStore, MemoryProjectStore, MemoryRequestStore, MemoryStores,
    MemorySuggestionStore, MemoryTeamMemberStore, MemoryUserDirectory,
};
pub use traits::{
    MilestoneStore, ProjectStore, SuggestionStore, SupervisorRequestStore, TeamMemberStore,
    UserDirectory,
};
