//! REST API for Capstone RS
//!
//! Thin handlers over the workflow engine and the collaboration
//! coordinators. The upstream auth layer injects the authenticated
//! principal as headers; see [`extractors::AuthPrincipal`].

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
