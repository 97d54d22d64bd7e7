use kube::Client;
use tracing::{debug, warn};

use crate::errors::CollectError;
use crate::metrics::{list_pod_metrics_http, ResourceUsageRecord};
use crate::types::{Config, PodMetricSample};

/// Anything that can produce one poll's worth of pod samples.
#[allow(async_fn_in_trait)]
pub trait MetricsSource {
    async fn collect(&mut self) -> Result<Vec<PodMetricSample>, CollectError>;

    /// Records dropped at the validation boundary so far.
    fn skipped(&self) -> usize {
        0
    }
}

/// Namespace + name-prefix selection applied to every poll.
#[derive(Debug, Clone)]
pub struct PodFilter {
    pub namespace: String,
    pub prefixes: Vec<String>,
    pub max_containers: usize,
}

impl PodFilter {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            namespace: cfg.namespace.clone(),
            prefixes: cfg.pod_prefixes.clone(),
            max_containers: cfg.containers_per_row,
        }
    }

    pub fn matches<R: ResourceUsageRecord>(&self, record: &R) -> bool {
        if record.namespace() != Some(self.namespace.as_str()) {
            return false;
        }
        match record.pod_name() {
            Some(name) => self.prefixes.iter().any(|p| name.starts_with(p.as_str())),
            None => false,
        }
    }

    /// Keeps matching records in source order and validates them. Invalid
    /// records are logged and dropped; the count of dropped records is returned.
    pub fn select<R, I>(&self, records: I) -> (Vec<PodMetricSample>, usize)
    where
        R: ResourceUsageRecord,
        I: IntoIterator<Item = R>,
    {
        let mut samples = Vec::new();
        let mut skipped = 0;
        for record in records {
            if !self.matches(&record) {
                continue;
            }
            match record.to_sample(self.max_containers) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    warn!("Skipping {}/{}: {}", self.namespace, record.pod_name().unwrap_or("?"), e);
                    skipped += 1;
                }
            }
        }
        (samples, skipped)
    }
}

/// Collector backed by the cluster's metrics.k8s.io API.
pub struct KubeMetricsSource {
    client: Client,
    filter: PodFilter,
    skipped: usize,
}

impl KubeMetricsSource {
    pub fn new(client: Client, filter: PodFilter) -> Self {
        Self {
            client,
            filter,
            skipped: 0,
        }
    }
}

impl MetricsSource for KubeMetricsSource {
    async fn collect(&mut self) -> Result<Vec<PodMetricSample>, CollectError> {
        let items = list_pod_metrics_http(&self.client).await?;
        let total = items.len();
        let (samples, skipped) = self.filter.select(items);
        self.skipped += skipped;
        debug!("PodMetrics listed: {} total, {} matched", total, samples.len());
        Ok(samples)
    }

    fn skipped(&self) -> usize {
        self.skipped
    }
}
