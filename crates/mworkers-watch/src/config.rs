//! Configuration schema for the watch pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default directory watched when none is configured.
pub const DEFAULT_WATCH_DIR: &str = "/tmp";

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 2;

/// Default placeholder task delay in milliseconds.
pub const DEFAULT_TASK_DELAY_MS: u64 = 1000;

/// Which close events are turned into work items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchEvents {
    /// Files closed after being opened for writing
    #[default]
    CloseWrite,
    /// Any file close, including read-only opens
    Close,
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory to watch
    pub watch_dir: PathBuf,
    /// Number of worker threads
    pub workers: usize,
    /// Queue capacity, `None` for unbounded
    pub queue_capacity: Option<usize>,
    /// Delay of the placeholder task in milliseconds
    pub task_delay_ms: u64,
    /// Close events to react to
    pub events: WatchEvents,
    /// Close the queue and wait for workers once the channel ends
    pub drain_on_eof: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from(DEFAULT_WATCH_DIR),
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
            task_delay_ms: DEFAULT_TASK_DELAY_MS,
            events: WatchEvents::default(),
            drain_on_eof: false,
        }
    }
}

impl PipelineConfig {
    /// Set the watched directory.
    pub fn with_watch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.watch_dir = dir.into();
        self
    }

    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Bound the queue.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Placeholder task delay as a [`Duration`].
    pub fn task_delay(&self) -> Duration {
        Duration::from_millis(self.task_delay_ms)
    }

    /// Check the configuration for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        if self.queue_capacity == Some(0) {
            return Err(Error::Config(
                "queue_capacity must be at least 1 when set".to_string(),
            ));
        }
        if self.watch_dir.as_os_str().is_empty() {
            return Err(Error::Config("watch_dir must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.watch_dir, PathBuf::from("/tmp"));
        assert_eq!(config.workers, 2);
        assert_eq!(config.queue_capacity, None);
        assert_eq!(config.events, WatchEvents::CloseWrite);
        assert!(!config.drain_on_eof);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = PipelineConfig::default().with_workers(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = PipelineConfig::default().with_queue_capacity(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_events_serialize_snake_case() {
        let json = serde_json::to_string(&WatchEvents::CloseWrite).unwrap();
        assert_eq!(json, "\"close_write\"");
        let parsed: WatchEvents = serde_json::from_str("\"close\"").unwrap();
        assert_eq!(parsed, WatchEvents::Close);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"workers": 4, "watch_dir": "/srv/in"}"#).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.watch_dir, PathBuf::from("/srv/in"));
        assert_eq!(config.task_delay_ms, DEFAULT_TASK_DELAY_MS);
    }
}
