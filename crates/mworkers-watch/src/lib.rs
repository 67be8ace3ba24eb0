//! # mworkers watch pipeline
//!
//! A bounded producer/consumer pipeline driven by filesystem close
//! notifications on a single directory.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │  NotifyChannel  │───▶│   Notification   │───▶│   Dispatcher    │
//! │   (inotify fd)  │    │     Decoder      │    │                 │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//!                                                         │
//!                                                         ▼
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │      Task       │◀───│    WorkerPool    │◀───│    WorkQueue    │
//! │                 │    │   (N threads)    │    │ (mutex+condvar) │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! The dispatcher is the only producer. Workers claim items from the queue
//! in FIFO order and run the task outside the queue lock, so completion order
//! across workers is not guaranteed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

#[cfg(target_os = "linux")]
pub mod channel;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod pool;
pub mod queue;
pub mod task;
pub mod types;

#[cfg(target_os = "linux")]
pub use channel::NotifyChannel;
pub use config::{PipelineConfig, WatchEvents};
pub use decoder::{NotificationDecoder, RawEvent};
pub use dispatch::{DispatchSummary, Dispatcher, Pipeline};
pub use error::*;
pub use pool::{WorkerPool, WorkerState, WorkerStatus};
pub use queue::{QueueStats, WorkQueue};
pub use task::{SleepTask, Task};
pub use types::WorkItem;
