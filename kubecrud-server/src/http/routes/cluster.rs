//! Cluster-info page: pods and deployments in the configured namespace

use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};

use crate::http::error::ClusterApiError;
use crate::http::server::AppState;
use crate::http::views;

/// GET /k8s-info
async fn k8s_info(State(state): State<Arc<AppState>>) -> Result<Html<String>, ClusterApiError> {
    let client = state.cluster.as_ref().ok_or(ClusterApiError::NotInitialized)?;

    let pods = client.list_pods(&state.namespace).await?;
    let deployments = client.list_deployments(&state.namespace).await?;
    tracing::debug!(
        namespace = %state.namespace,
        pods = pods.len(),
        deployments = deployments.len(),
        "listed cluster resources"
    );

    Ok(Html(views::cluster(&state.namespace, &pods, &deployments)))
}

/// Cluster routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/k8s-info", get(k8s_info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::http::test_support::{unreachable_state, FakeCluster};
    use crate::k8s::ClusterClient;

    async fn get_info(cluster: Option<Arc<dyn ClusterClient>>) -> Response {
        router()
            .with_state(Arc::new(unreachable_state(cluster)))
            .oneshot(Request::builder().uri("/k8s-info").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn lists_resources_as_html() {
        let response = get_info(Some(Arc::new(FakeCluster::healthy()))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Namespace: test-ns"));
        assert!(html.contains("web-0"));
        assert!(html.contains("10.1.0.4"));
        assert!(html.contains("web"));
    }

    #[tokio::test]
    async fn forbidden_gets_distinct_403() {
        let response = get_info(Some(Arc::new(FakeCluster::forbidden()))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Permission denied"));
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn other_failure_is_500() {
        let response = get_info(Some(Arc::new(FakeCluster::failing(500)))).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Error accessing Kubernetes API"));
    }

    #[tokio::test]
    async fn missing_client_is_500() {
        let response = get_info(None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body["error"],
            "Kubernetes client not initialized. Check logs for details."
        );
    }
}
