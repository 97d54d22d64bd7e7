use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub namespace: String,
    pub pod_prefixes: Vec<String>,
    pub sampler: SamplerConfig,
    pub containers_per_row: usize,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    pub fail_if_no_metrics: bool,
}

pub const DEFAULT_NAMESPACE: &str = "olmv1-system";
pub const DEFAULT_POD_PREFIXES: &[&str] = &["catalogd", "operator-controller"];
pub const DEFAULT_OUTPUT_PREFIX: &str = "olm_v1_metrics";
pub const DEFAULT_CONTAINERS_PER_ROW: usize = 2;

/// Cadence of the sampling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Fixed sleep between polls; collection latency is not subtracted.
    pub interval: Duration,
    pub sample_count: usize,
    /// Flush the output file every N polls.
    pub checkpoint_every: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            sample_count: 150,
            checkpoint_every: 10,
        }
    }
}

/// Usage of one container as reported by the metrics API. Quantities are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerUsage {
    pub name: String,
    pub cpu: String,
    pub memory: String,
}

/// One poll's view of a single pod. Containers are ordered by name, descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodMetricSample {
    pub pod_name: String,
    pub containers: Vec<ContainerUsage>,
}

impl PodMetricSample {
    pub fn new(pod_name: impl Into<String>, mut containers: Vec<ContainerUsage>) -> Self {
        containers.sort_by(|a, b| b.name.cmp(&a.name));
        Self {
            pod_name: pod_name.into(),
            containers,
        }
    }

    /// Flattens into `[pod, name0, cpu0, mem0, name1, cpu1, mem1, ...]`.
    pub fn to_row(&self) -> Row {
        let mut cells = Vec::with_capacity(1 + self.containers.len() * 3);
        cells.push(self.pod_name.clone());
        for c in &self.containers {
            cells.push(c.name.clone());
            cells.push(c.cpu.clone());
            cells.push(c.memory.clone());
        }
        Row(cells)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(pub Vec<String>);

impl Row {
    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pads with empty cells up to `width`. Never truncates.
    pub fn padded(mut self, width: usize) -> Row {
        if self.0.len() < width {
            self.0.resize(width, String::new());
        }
        self
    }
}

/// Number of cells in a row sized for `containers` containers.
pub fn row_width(containers: usize) -> usize {
    1 + containers * 3
}

/// Column labels after the index column: `pod, c0, cpu0, mem0, c1, ...`.
pub fn header_columns(containers: usize) -> Vec<String> {
    let mut cols = Vec::with_capacity(row_width(containers));
    cols.push("pod".to_string());
    for i in 0..containers {
        cols.push(format!("c{}", i));
        cols.push(format!("cpu{}", i));
        cols.push(format!("mem{}", i));
    }
    cols
}
