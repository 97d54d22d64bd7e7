use std::collections::BTreeMap;
use tracing::info;

use crate::parsing::{parse_cpu_millicores, parse_memory_bytes};
use crate::types::PodMetricSample;

/// Highest usage seen for one pod, summed across its containers per poll.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PodPeak {
    pub samples: usize,
    pub cpu_millicores: i64,
    pub memory_bytes: i64,
}

/// Aggregated statistics for one sampling run.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub polls: usize,
    pub rows: usize,
    pub skipped: usize,
    pub cancelled: bool,
    pub pods: BTreeMap<String, PodPeak>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: &PodMetricSample) {
        let cpu: i64 = sample
            .containers
            .iter()
            .filter_map(|c| parse_cpu_millicores(&c.cpu))
            .fold(0, i64::saturating_add);
        let memory: i64 = sample
            .containers
            .iter()
            .filter_map(|c| parse_memory_bytes(&c.memory))
            .fold(0, i64::saturating_add);

        let peak = self.pods.entry(sample.pod_name.clone()).or_default();
        peak.samples += 1;
        peak.cpu_millicores = peak.cpu_millicores.max(cpu);
        peak.memory_bytes = peak.memory_bytes.max(memory);
        self.rows += 1;
    }

    pub fn log(&self) {
        info!(
            "Run finished: {} polls, {} rows, {} skipped records{}",
            self.polls,
            self.rows,
            self.skipped,
            if self.cancelled { " (cancelled)" } else { "" }
        );
        for (pod, peak) in &self.pods {
            info!(
                "  {}: {} samples, peak cpu {}m, peak memory {:.1}Mi",
                pod,
                peak.samples,
                peak.cpu_millicores,
                peak.memory_bytes as f64 / (1024.0 * 1024.0)
            );
        }
    }
}
