// Public modules
pub mod types;
pub mod errors;
pub mod config;
pub mod parsing;
pub mod kubernetes;
pub mod metrics;
pub mod collector;
pub mod sampler;
pub mod output;
pub mod report;

// Re-export commonly used items
pub use types::*;
pub use errors::{CollectError, SampleError, WriteError};
pub use config::{load_config, load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_cpu_millicores, parse_memory_bytes};
pub use kubernetes::{connect, ensure_metrics_available};
pub use metrics::{PodMetricsItem, ResourceUsageRecord};
pub use collector::{KubeMetricsSource, MetricsSource, PodFilter};
pub use sampler::Sampler;
pub use output::{output_filename, CsvSink};
pub use report::{PodPeak, RunSummary};
