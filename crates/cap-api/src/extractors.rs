//! Axum extractors
//!
//! The upstream auth layer terminates authentication and injects the
//! verified principal as `x-user-id` and `x-user-role` headers; requests
//! reaching this service without them are rejected.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use cap_core::traits::Id;
use cap_core::types::{Principal, Role};

use crate::error::ApiError;

/// Authenticated principal extractor
pub struct AuthPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Id>().ok());
        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
            .and_then(Role::parse);

        match (id, role) {
            (Some(id), Some(role)) => Ok(AuthPrincipal(Principal::new(id, role))),
            _ => Err(ApiError::unauthorized(
                "missing or invalid principal headers",
            )),
        }
    }
}

impl std::ops::Deref for AuthPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
