use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use serde::Serialize;
use thiserror::Error;

/// HTTP status the API server uses for RBAC denials.
const FORBIDDEN: u16 = 403;

/// Errors emitted by the Kubernetes integration.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The service account is not allowed to list the resource.
    #[error("permission denied by the Kubernetes API: {0}")]
    Forbidden(String),
    /// The API server answered with a non-success status other than 403.
    #[error("Kubernetes API returned {code}: {message}")]
    Api { code: u16, message: String },
    /// Transport, TLS or decoding failure inside the [`kube`] client.
    #[error("Kubernetes client error: {0}")]
    Kube(#[source] kube::Error),
}

impl ClusterError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == FORBIDDEN => {
                Self::Forbidden(response.message)
            }
            kube::Error::Api(response) => Self::Api {
                code: response.code,
                message: response.message,
            },
            other => Self::Kube(other),
        }
    }
}

/// Flat view of a pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodSummary {
    pub name: String,
    /// Pod phase, e.g. `Running`
    pub status: Option<String>,
    pub ip: Option<String>,
    pub node: Option<String>,
}

impl From<&Pod> for PodSummary {
    fn from(pod: &Pod) -> Self {
        let status = pod.status.as_ref();
        Self {
            name: pod.metadata.name.clone().unwrap_or_default(),
            status: status.and_then(|s| s.phase.clone()),
            ip: status.and_then(|s| s.pod_ip.clone()),
            node: pod.spec.as_ref().and_then(|s| s.node_name.clone()),
        }
    }
}

/// Flat view of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentSummary {
    pub name: String,
    /// Desired replicas
    pub replicas: Option<i32>,
    pub available_replicas: Option<i32>,
}

impl From<&Deployment> for DeploymentSummary {
    fn from(deployment: &Deployment) -> Self {
        Self {
            name: deployment.metadata.name.clone().unwrap_or_default(),
            replicas: deployment.spec.as_ref().and_then(|s| s.replicas),
            available_replicas: deployment
                .status
                .as_ref()
                .and_then(|s| s.available_replicas),
        }
    }
}

/// Read-only cluster operations used by the cluster-info page.
///
/// Implementations are pre-authenticated; callers only pick the namespace.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Lists pods in `namespace`.
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>, ClusterError>;

    /// Lists deployments in `namespace`.
    async fn list_deployments(
        &self,
        namespace: &str,
    ) -> Result<Vec<DeploymentSummary>, ClusterError>;
}
