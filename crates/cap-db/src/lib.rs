//! PostgreSQL storage for Capstone RS
//!
//! One repository per entity family, each implementing the corresponding
//! `cap-store` trait with the sqlx runtime query API. `schema.sql` documents
//! the tables.

pub mod milestones;
pub mod pool;
pub mod projects;
pub mod requests;
pub mod suggestions;
pub mod teams;
pub mod users;

use std::sync::Arc;

pub use milestones::PgMilestoneStore;
pub use pool::Database;
pub use projects::PgProjectStore;
pub use requests::PgRequestStore;
pub use suggestions::PgSuggestionStore;
pub use teams::PgTeamMemberStore;
pub use users::PgUserDirectory;

use cap_store::StoreError;

pub(crate) fn db_err(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

/// Bundle of every Postgres store over one pool.
#[derive(Clone)]
pub struct PgStores {
    pub projects: Arc<PgProjectStore>,
    pub requests: Arc<PgRequestStore>,
    pub members: Arc<PgTeamMemberStore>,
    pub suggestions: Arc<PgSuggestionStore>,
    pub milestones: Arc<PgMilestoneStore>,
    pub users: Arc<PgUserDirectory>,
}

impl PgStores {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            projects: Arc::new(PgProjectStore::new(pool.clone())),
            requests: Arc::new(PgRequestStore::new(pool.clone())),
            members: Arc::new(PgTeamMemberStore::new(pool.clone())),
            suggestions: Arc::new(PgSuggestionStore::new(pool.clone())),
            milestones: Arc::new(PgMilestoneStore::new(pool.clone())),
            users: Arc::new(PgUserDirectory::new(pool)),
        }
    }
}
