//! Kubernetes integration for the cluster-info page.
//!
//! Handlers depend on the [`ClusterClient`] trait only. The default
//! implementation, [`KubeClusterClient`], talks to the API server with the
//! ambient configuration (in-cluster service account or local
//! `~/.kube/config`); tests substitute in-process fakes.

mod base;
pub mod kube_client;

use std::sync::Arc;

pub use base::*;
pub use kube_client::{ClusterConfigSource, KubeClusterClient};

/// Resolve configuration and build the shared client, if any.
pub async fn init_cluster_client() -> Option<Arc<dyn ClusterClient>> {
    let source = ClusterConfigSource::resolve().await;
    KubeClusterClient::from_source(source).map(|client| Arc::new(client) as Arc<dyn ClusterClient>)
}
