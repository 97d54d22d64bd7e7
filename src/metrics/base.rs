use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Client;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::errors::CollectError;
use crate::types::{ContainerUsage, PodMetricSample};

pub const POD_METRICS_PATH: &str = "/apis/metrics.k8s.io/v1beta1/pods";

// Wire shape of `kubectl get --raw /apis/metrics.k8s.io/v1beta1/pods`.

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    #[serde(default)]
    pub usage: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodMetricsItem {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

#[derive(Debug, Deserialize)]
pub struct PodMetricsList {
    pub items: Vec<PodMetricsItem>,
}

/// Why a usage record could not become a [`PodMetricSample`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record has no pod name")]
    MissingName,
    #[error("container {container} has no {resource} usage")]
    MissingUsage {
        container: String,
        resource: &'static str,
    },
    #[error("pod {pod} has {found} containers, at most {max} fit in a row")]
    TooManyContainers { pod: String, found: usize, max: usize },
}

/// A per-pod resource usage record as delivered by some metrics backend.
pub trait ResourceUsageRecord {
    fn namespace(&self) -> Option<&str>;
    fn pod_name(&self) -> Option<&str>;
    fn container_usage(&self) -> Result<Vec<ContainerUsage>, RecordError>;

    /// Validation boundary between the wire format and [`PodMetricSample`].
    fn to_sample(&self, max_containers: usize) -> Result<PodMetricSample, RecordError> {
        let pod = self.pod_name().ok_or(RecordError::MissingName)?;
        let containers = self.container_usage()?;
        if containers.len() > max_containers {
            return Err(RecordError::TooManyContainers {
                pod: pod.to_string(),
                found: containers.len(),
                max: max_containers,
            });
        }
        Ok(PodMetricSample::new(pod, containers))
    }
}

impl ResourceUsageRecord for PodMetricsItem {
    fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    fn pod_name(&self) -> Option<&str> {
        self.metadata.name.as_deref().filter(|n| !n.is_empty())
    }

    fn container_usage(&self) -> Result<Vec<ContainerUsage>, RecordError> {
        self.containers
            .iter()
            .map(|c| {
                let get = |resource: &'static str| {
                    c.usage
                        .get(resource)
                        .cloned()
                        .ok_or_else(|| RecordError::MissingUsage {
                            container: c.name.clone(),
                            resource,
                        })
                };
                Ok(ContainerUsage {
                    name: c.name.clone(),
                    cpu: get("cpu")?,
                    memory: get("memory")?,
                })
            })
            .collect()
    }
}

/// Lists PodMetrics across all namespaces.
pub async fn list_pod_metrics_http(client: &Client) -> Result<Vec<PodMetricsItem>, CollectError> {
    use http::Request as HttpRequest;
    let req = HttpRequest::builder()
        .method("GET")
        .uri(POD_METRICS_PATH)
        .body(Vec::new())
        .map_err(|e| CollectError::ApiUnavailable(format!("build request: {}", e)))?;
    let list: PodMetricsList = client.request(req).await?;
    Ok(list.items)
}
