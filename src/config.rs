use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::types::{
    Config, SamplerConfig, DEFAULT_CONTAINERS_PER_ROW, DEFAULT_NAMESPACE, DEFAULT_OUTPUT_PREFIX,
    DEFAULT_POD_PREFIXES,
};

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    let namespace = env
        .get_var("TARGET_NAMESPACE")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let pod_prefixes: Vec<String> = match env.get_var("POD_PREFIXES") {
        Some(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => DEFAULT_POD_PREFIXES.iter().map(|s| s.to_string()).collect(),
    };
    if pod_prefixes.is_empty() {
        return Err(anyhow!("POD_PREFIXES must list at least one prefix (comma-separated)"));
    }

    let interval_secs: u64 = parse_var(env, "POLL_INTERVAL_SECONDS", 2)?;
    let sample_count: usize = positive(parse_var(env, "SAMPLE_COUNT", 150)?, "SAMPLE_COUNT")?;
    let checkpoint_every: usize =
        positive(parse_var(env, "CHECKPOINT_EVERY", 10)?, "CHECKPOINT_EVERY")?;
    let containers_per_row: usize = positive(
        parse_var(env, "CONTAINERS_PER_ROW", DEFAULT_CONTAINERS_PER_ROW)?,
        "CONTAINERS_PER_ROW",
    )?;

    let output_dir = env
        .get_var("OUTPUT_DIR")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let output_prefix = env
        .get_var("OUTPUT_PREFIX")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string());

    let fail_if_no_metrics = env
        .get_var("FAIL_IF_NO_METRICS")
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(true);

    Ok(Config {
        namespace,
        pod_prefixes,
        sampler: SamplerConfig {
            interval: Duration::from_secs(interval_secs),
            sample_count,
            checkpoint_every,
        },
        containers_per_row,
        output_dir,
        output_prefix,
        fail_if_no_metrics,
    })
}

fn parse_var<E, T>(env: &E, key: &str, default: T) -> Result<T>
where
    E: EnvironmentProvider,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env.get_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn positive(value: usize, key: &str) -> Result<usize> {
    if value == 0 {
        return Err(anyhow!("{} must be greater than zero", key));
    }
    Ok(value)
}
