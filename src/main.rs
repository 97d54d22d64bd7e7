use anyhow::{Context, Result};
use chrono::Local;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use olm_metrics_sampler::{
    connect, ensure_metrics_available, load_config, CsvSink, KubeMetricsSource, PodFilter, Sampler,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config()?;
    let started = Local::now().naive_local();
    info!(
        "namespace = {}, prefixes = {:?}, {} samples every {:?}",
        cfg.namespace, cfg.pod_prefixes, cfg.sampler.sample_count, cfg.sampler.interval
    );

    let client = connect().await.context("Failed to resolve cluster credentials")?;
    let filter = PodFilter::from_config(&cfg);

    // Check metrics API availability early (fail fast if requested)
    if cfg.fail_if_no_metrics {
        let matching = ensure_metrics_available(&client, &filter)
            .await
            .context("PodMetrics API check failed")?;
        if matching == 0 {
            warn!("No pods in {} match {:?} yet", cfg.namespace, cfg.pod_prefixes);
        }
    }

    let (mut sink, path) = CsvSink::create(
        &cfg.output_dir,
        &cfg.output_prefix,
        started,
        cfg.containers_per_row,
    )
    .context("Failed to create metrics file")?;
    info!("Writing samples to {}", path.display());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current poll");
            on_signal.cancel();
        }
    });

    let mut sampler = Sampler::new(KubeMetricsSource::new(client, filter), cfg.sampler.clone());
    let summary = match sampler.run(&mut sink, &cancel).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Sampling aborted, partial data kept in {}", path.display());
            return Err(e).context("Sampling failed");
        }
    };
    sink.finish().context("Failed to finalize metrics file")?;

    summary.log();
    println!("Metrics written to file {}", path.display());
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
