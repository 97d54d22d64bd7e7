// PodMetrics wire types and the validation boundary
pub mod base;

pub use base::{
    list_pod_metrics_http, ContainerMetrics, PodMetricsItem, PodMetricsList, RecordError,
    ResourceUsageRecord, POD_METRICS_PATH,
};
