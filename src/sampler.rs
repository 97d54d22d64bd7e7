use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::collector::MetricsSource;
use crate::errors::SampleError;
use crate::output::CsvSink;
use crate::report::RunSummary;
use crate::types::SamplerConfig;

/// Drives a [`MetricsSource`] on a fixed cadence and streams rows into a sink.
pub struct Sampler<S> {
    source: S,
    config: SamplerConfig,
}

impl<S: MetricsSource> Sampler<S> {
    pub fn new(source: S, config: SamplerConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Polls `sample_count` times unless cancelled. On a failed poll, rows
    /// already appended are flushed before the error is returned.
    pub async fn run<W: Write>(
        &mut self,
        sink: &mut CsvSink<W>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, SampleError> {
        let mut summary = RunSummary::new();
        let checkpoint_every = self.config.checkpoint_every.max(1);

        for poll in 1..=self.config.sample_count {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let polled = tokio::select! {
                biased;
                polled = self.source.collect() => polled,
                _ = cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
            };
            let samples = match polled {
                Ok(samples) => samples,
                Err(e) => {
                    // the collect error is the one worth reporting
                    if let Err(flush) = sink.checkpoint() {
                        warn!("Could not flush rows before aborting: {}", flush);
                    }
                    return Err(e.into());
                }
            };
            summary.polls = poll;
            debug!("Poll {}/{}: {} pods", poll, self.config.sample_count, samples.len());

            for sample in &samples {
                sink.append(sample.to_row())?;
                summary.record(sample);
            }

            if poll % checkpoint_every == 0 {
                sink.checkpoint()?;
                info!("Checkpoint after {} polls, {} rows", poll, sink.rows_written());
            }

            if poll < self.config.sample_count {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        summary.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.config.interval) => {}
                }
            }
        }

        if summary.cancelled {
            info!("Sampling cancelled after {} polls", summary.polls);
        }
        sink.checkpoint()?;
        summary.skipped = self.source.skipped();
        Ok(summary)
    }
}
