//! # Request Extractors
//!
//! Both extractors reject with [`ApiError`], so a bad body or a bad path
//! segment gets the same JSON envelope as every other failure.
//!
//! - `ValidJson<T>` decodes the body as `T` and runs `T::validate`, so handlers
//!   receive the typed value (`NewPlanet`, `StationChanges`, ...) or never run.
//! - `PathParam<T>` decodes path parameters (ids, names).

use super::error::ApiError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use starmap_core::Validate;

/// A request body that has been decoded and validated.
pub struct ValidJson<T: Validate>(pub T::Valid);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: Validate + DeserializeOwned + Send,
    T::Valid: Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await?;
        Ok(Self(payload.validate()?))
    }
}

/// A decoded path parameter.
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
