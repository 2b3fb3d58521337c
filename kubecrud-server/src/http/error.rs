//! Cluster-info error responses
//!
//! Errors are converted to JSON bodies `{"error": ..., "details"?: ...}`.
//! Permission problems get their own 403 so operators can tell a missing
//! RoleBinding apart from an unreachable API server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::k8s::ClusterError;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Cluster-info error type with HTTP status mapping
#[derive(Debug)]
pub enum ClusterApiError {
    /// No usable cluster configuration at startup (500)
    NotInitialized,

    /// The API call failed (403 when forbidden, 500 otherwise)
    Cluster(ClusterError),
}

impl IntoResponse for ClusterApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotInitialized => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Kubernetes client not initialized. Check logs for details.".into(),
                    details: None,
                },
            ),
            Self::Cluster(e) if e.is_forbidden() => {
                tracing::warn!("Kubernetes API denied access: {}", e);
                (
                    StatusCode::FORBIDDEN,
                    ErrorBody {
                        error: "Permission denied to access Kubernetes API. \
                                Check ServiceAccount and RoleBinding."
                            .into(),
                        details: Some(e.to_string()),
                    },
                )
            }
            Self::Cluster(e) => {
                tracing::error!("Kubernetes API error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: format!("Error accessing Kubernetes API: {}", e),
                        details: Some(e.to_string()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClusterError> for ClusterApiError {
    fn from(e: ClusterError) -> Self {
        Self::Cluster(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn forbidden_is_403_with_details() {
        let err = ClusterApiError::Cluster(ClusterError::Forbidden("pods is forbidden".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Permission denied"));
        assert!(body["details"].as_str().unwrap().contains("pods is forbidden"));
    }

    #[tokio::test]
    async fn api_failure_is_500() {
        let err = ClusterApiError::Cluster(ClusterError::Api {
            code: 503,
            message: "etcd unavailable".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Error accessing Kubernetes API"));
    }

    #[tokio::test]
    async fn not_initialized_has_no_details() {
        let response = ClusterApiError::NotInitialized.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(body.get("details").is_none());
    }
}
