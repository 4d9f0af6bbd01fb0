//! Location HTTP routes.
//!
//! `POST /api/location` stores a reading, `GET /api/location/last` returns
//! the newest one.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::location::{LocationRecord, NewLocation};
use crate::storage::LocationStore;

/// Path of the create endpoint.
pub const LOCATION_PATH: &str = "/api/location";

/// Path of the fetch-latest endpoint.
pub const LAST_LOCATION_PATH: &str = "/api/location/last";

/// Acknowledgement message returned after a successful save.
pub const SAVED_MESSAGE: &str = "Location saved successfully";

/// Body of a successful create response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl Default for SavedResponse {
    fn default() -> Self {
        Self {
            message: SAVED_MESSAGE.to_string(),
        }
    }
}

/// Failures surfaced to HTTP clients.
///
/// Rendered as plain-text bodies with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The route exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request body could not be read or decoded.
    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),

    /// The store holds no records yet.
    #[error("No locations found")]
    NotFound,

    /// Persisting a reading failed.
    #[error("Failed to save location: {0}")]
    SaveFailed(#[source] Error),

    /// Reading the latest record failed.
    #[error("Failed to retrieve last location: {0}")]
    FetchFailed(#[source] Error),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::SaveFailed(_) | Self::FetchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Build the location routes over the given store.
///
/// `get` would also answer `HEAD`, so that method is routed to the 405
/// handler explicitly.
pub fn location_routes(store: Arc<LocationStore>) -> Router {
    Router::new()
        .route(
            LOCATION_PATH,
            post(create_location_handler).fallback(method_not_allowed),
        )
        .route(
            LAST_LOCATION_PATH,
            get(last_location_handler)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .with_state(store)
}

async fn create_location_handler(
    State(store): State<Arc<LocationStore>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> std::result::Result<(StatusCode, Json<SavedResponse>), ApiError> {
    let body = body.map_err(|e| {
        warn!(error = %e, "Failed to read location payload");
        ApiError::InvalidPayload(e.body_text())
    })?;

    let location: NewLocation = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected invalid location payload");
        ApiError::InvalidPayload(e.to_string())
    })?;

    let record = run_blocking(move || store.insert(location.latitude, location.longitude))
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to save location");
            ApiError::SaveFailed(e)
        })?;

    info!(
        id = record.id,
        latitude = record.latitude,
        longitude = record.longitude,
        "Received and saved location: Lat={:.6}, Lon={:.6}",
        record.latitude,
        record.longitude
    );

    Ok((StatusCode::CREATED, Json(SavedResponse::default())))
}

async fn last_location_handler(
    State(store): State<Arc<LocationStore>>,
) -> std::result::Result<Json<LocationRecord>, ApiError> {
    let latest = run_blocking(move || store.fetch_latest())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to retrieve last location");
            ApiError::FetchFailed(e)
        })?;

    match latest {
        Some(record) => Ok(Json(record)),
        None => {
            debug!("No locations stored yet");
            Err(ApiError::NotFound)
        }
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Run a blocking store call off the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("storage task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_response_serialization() {
        let json = serde_json::to_string(&SavedResponse::default()).unwrap();
        assert_eq!(json, r#"{"message":"Location saved successfully"}"#);
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::InvalidPayload("EOF".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::SaveFailed(Error::internal("disk full")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::FetchFailed(Error::internal("disk full")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_messages_embed_detail() {
        let err = ApiError::InvalidPayload("expected value at line 1 column 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid request payload: expected value at line 1 column 1"
        );

        let err = ApiError::SaveFailed(Error::internal("disk full"));
        assert_eq!(
            err.to_string(),
            "Failed to save location: internal error: disk full"
        );

        let err = ApiError::FetchFailed(Error::internal("disk full"));
        assert!(err.to_string().starts_with("Failed to retrieve last location: "));
    }

    #[tokio::test]
    async fn test_run_blocking_propagates_result() {
        let ok = run_blocking(|| Ok(42)).await.unwrap();
        assert_eq!(ok, 42);

        let err = run_blocking::<(), _>(|| Err(Error::internal("boom")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "internal error: boom");
    }
}
