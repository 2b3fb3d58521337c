//! Custom Axum extractors

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::response::Redirect;

/// Message id from the path.
///
/// A malformed id is treated like a missing one: the request is sent back
/// to the home page instead of failing.
pub struct MessageId(pub i32);

impl<S> FromRequestParts<S> for MessageId
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<i32> = Path::from_request_parts(parts, state).await.map_err(|e| {
            tracing::debug!("rejected message id: {}", e);
            Redirect::to("/")
        })?;

        Ok(Self(id))
    }
}
