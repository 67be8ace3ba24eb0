use anyhow::{Context, Result};
use mworkers_watch::{NotifyChannel, Pipeline, PipelineConfig, SleepTask};
use std::sync::Arc;
use tracing::info;

/// Watch the configured directory until the notification stream ends.
///
/// Without `drain_on_eof` the workers are abandoned when this returns, and
/// whatever is still queued is lost at process exit.
pub fn run(config: &PipelineConfig) -> Result<()> {
    let task = Arc::new(SleepTask::new(config.task_delay()));
    let pipeline = Pipeline::start(config, task).context("Failed to start worker pool")?;

    let channel = NotifyChannel::open(&config.watch_dir, config.events)
        .with_context(|| format!("Failed to watch {}", config.watch_dir.display()))?;

    let summary = pipeline
        .dispatch(channel, &config.watch_dir)
        .context("Notification stream failed")?;
    info!(queued = summary.queued, "dispatch finished");

    if config.drain_on_eof {
        let completed = pipeline.shutdown();
        info!(completed, "workers drained");
    }
    Ok(())
}
