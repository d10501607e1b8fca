//! Lenient JSON extractor
//!
//! Producers and editors post loosely formed JSON, sometimes without a
//! content type. [`LenientJson`] accepts any body: an empty or unparseable
//! one is logged and replaced by `T::default()`. Only a body over the size
//! limit is rejected, with 413.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// JSON body that never rejects on content
#[derive(Debug, Clone, Default)]
pub struct LenientJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| match e.status() {
                StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(e.body_text()),
                _ => ApiError::Validation(e.body_text()),
            })?;

        Ok(LenientJson(parse_or_default(&path, &bytes)))
    }
}

fn parse_or_default<T: DeserializeOwned + Default>(path: &str, bytes: &[u8]) -> T {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }

    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Malformed request body, using defaults");
            T::default()
        }
    }
}
