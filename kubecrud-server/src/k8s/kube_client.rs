//! [`ClusterClient`] backed by the [`kube`] crate.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config};

use super::base::{ClusterClient, ClusterError, DeploymentSummary, PodSummary};

/// Where the cluster configuration came from.
///
/// Resolution tries the in-cluster service account first and falls back to
/// the local kubeconfig; it is done once at startup.
pub enum ClusterConfigSource {
    InCluster(Config),
    Kubeconfig(Config),
    Unavailable { in_cluster: String, kubeconfig: String },
}

impl ClusterConfigSource {
    pub async fn resolve() -> Self {
        let in_cluster = match Config::incluster() {
            Ok(config) => return Self::InCluster(config),
            Err(err) => err,
        };
        tracing::info!(
            error = %in_cluster,
            "could not load in-cluster Kubernetes config, falling back to kubeconfig"
        );

        match Config::from_kubeconfig(&KubeConfigOptions::default()).await {
            Ok(config) => Self::Kubeconfig(config),
            Err(kubeconfig) => Self::Unavailable {
                in_cluster: in_cluster.to_string(),
                kubeconfig: kubeconfig.to_string(),
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InCluster(_) => "in-cluster",
            Self::Kubeconfig(_) => "kubeconfig",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

/// Read-only client for pods and deployments.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from a resolved configuration.
    ///
    /// Returns `None` when no configuration was found or the client could
    /// not be constructed; cluster-info is disabled in that case.
    pub fn from_source(source: ClusterConfigSource) -> Option<Self> {
        let label = source.label();
        let config = match source {
            ClusterConfigSource::InCluster(config) | ClusterConfigSource::Kubeconfig(config) => {
                config
            }
            ClusterConfigSource::Unavailable {
                in_cluster,
                kubeconfig,
            } => {
                tracing::warn!(
                    %in_cluster,
                    %kubeconfig,
                    "no Kubernetes config found, Kubernetes API access will be unavailable"
                );
                return None;
            }
        };

        match Client::try_from(config) {
            Ok(client) => {
                tracing::info!(source = label, "Kubernetes client initialized");
                Some(Self::new(client))
            }
            Err(err) => {
                tracing::warn!(
                    source = label,
                    error = %err,
                    "could not build Kubernetes client, Kubernetes API access will be unavailable"
                );
                None
            }
        }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>, ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default()).await?;
        Ok(pods.items.iter().map(PodSummary::from).collect())
    }

    async fn list_deployments(
        &self,
        namespace: &str,
    ) -> Result<Vec<DeploymentSummary>, ClusterError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let deployments = api.list(&ListParams::default()).await?;
        Ok(deployments.items.iter().map(DeploymentSummary::from).collect())
    }
}
