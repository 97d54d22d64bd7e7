use kube::Client;

use crate::collector::{KubeMetricsSource, MetricsSource, PodFilter};
use crate::errors::CollectError;

/// Resolves ambient cluster credentials (kubeconfig or in-cluster).
pub async fn connect() -> Result<Client, CollectError> {
    Client::try_default().await.map_err(CollectError::from)
}

/// One probing poll so missing credentials or a missing metrics API fail
/// before any output is created. Returns the number of matching pods.
pub async fn ensure_metrics_available(client: &Client, filter: &PodFilter) -> Result<usize, CollectError> {
    let mut probe = KubeMetricsSource::new(client.clone(), filter.clone());
    Ok(probe.collect().await?.len())
}
