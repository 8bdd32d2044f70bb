//! Fixed-interval polling task
//!
//! One background task per device drives the refresh routine on a fixed
//! interval. Ticks never overlap: a refresh that overruns the interval
//! delays the next tick instead of queueing a burst. Failures are counted
//! and logged, the previously published snapshot stays visible, and the
//! loop keeps going until the scheduler is shut down or dropped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::model::Snapshot;
use crate::{Result, StateError};

/// Something the scheduler can refresh on each tick
#[async_trait]
pub trait RefreshSource: Send + Sync + 'static {
    /// Refresh and publish, returning the published snapshot
    async fn refresh_and_publish(&self) -> Result<Snapshot>;
}

/// A running polling task
#[derive(Debug)]
pub struct PollingScheduler {
    /// Interval between ticks
    interval: Duration,

    /// Task handle for the background polling loop, taken by `shutdown`
    task_handle: Option<JoinHandle<()>>,

    /// Shutdown signal for graceful termination
    shutdown_signal: Arc<AtomicBool>,

    /// Wakes the loop out of its interval wait
    shutdown_notify: Arc<Notify>,

    /// When this task was started
    started_at: SystemTime,

    /// Number of consecutive failed ticks
    error_count: Arc<RwLock<u32>>,

    /// Total number of ticks performed
    poll_count: Arc<RwLock<u64>>,

    /// Whether the most recent tick succeeded
    last_success: Arc<AtomicBool>,
}

impl PollingScheduler {
    /// Start polling `source` every `interval`
    ///
    /// The first tick fires one full interval after start; callers that need
    /// an immediate refresh run it themselves before starting the scheduler.
    pub fn start<R: RefreshSource>(source: Arc<R>, interval: Duration) -> Self {
        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let shutdown_notify = Arc::new(Notify::new());
        let error_count = Arc::new(RwLock::new(0));
        let poll_count = Arc::new(RwLock::new(0));
        let last_success = Arc::new(AtomicBool::new(true));

        let task_shutdown_signal = Arc::clone(&shutdown_signal);
        let task_shutdown_notify = Arc::clone(&shutdown_notify);
        let task_error_count = Arc::clone(&error_count);
        let task_poll_count = Arc::clone(&poll_count);
        let task_last_success = Arc::clone(&last_success);

        let task_handle = tokio::spawn(async move {
            Self::polling_loop(
                source,
                interval,
                task_shutdown_signal,
                task_shutdown_notify,
                task_error_count,
                task_poll_count,
                task_last_success,
            )
            .await;
        });

        Self {
            interval,
            task_handle: Some(task_handle),
            shutdown_signal,
            shutdown_notify,
            started_at: SystemTime::now(),
            error_count,
            poll_count,
            last_success,
        }
    }

    async fn polling_loop<R: RefreshSource>(
        source: Arc<R>,
        interval: Duration,
        shutdown_signal: Arc<AtomicBool>,
        shutdown_notify: Arc<Notify>,
        error_count: Arc<RwLock<u32>>,
        poll_count: Arc<RwLock<u64>>,
        last_success: Arc<AtomicBool>,
    ) {
        info!("Starting polling task (interval: {:?})", interval);

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if shutdown_signal.load(Ordering::Acquire) {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_notify.notified() => break,
            }

            {
                let mut count = poll_count.write().await;
                *count += 1;
            }

            match source.refresh_and_publish().await {
                Ok(snapshot) => {
                    *error_count.write().await = 0;
                    last_success.store(true, Ordering::Release);
                    debug!("Scheduled refresh published {}", snapshot.state);
                }
                Err(e) => {
                    let errors = {
                        let mut errors = error_count.write().await;
                        *errors += 1;
                        *errors
                    };
                    last_success.store(false, Ordering::Release);
                    warn!("Scheduled refresh failed (attempt {}): {}", errors, e);
                }
            }
        }

        info!("Polling task stopped");
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if the task is still running
    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn last_success(&self) -> bool {
        self.last_success.load(Ordering::Acquire)
    }

    pub async fn stats(&self) -> PollingStats {
        PollingStats {
            interval: self.interval,
            started_at: self.started_at,
            error_count: *self.error_count.read().await,
            poll_count: *self.poll_count.read().await,
            last_success: self.last_success(),
            is_running: self.is_running(),
        }
    }

    /// Stop the loop, interrupting any interval wait, and wait for it to end
    ///
    /// A refresh already in progress runs to completion first.
    pub async fn shutdown(mut self) -> Result<()> {
        self.signal_shutdown();

        match self.task_handle.take() {
            Some(handle) => handle.await.map_err(|e| {
                StateError::Polling(format!("Failed to await task completion: {}", e))
            }),
            None => Ok(()),
        }
    }

    fn signal_shutdown(&self) {
        self.shutdown_signal.store(true, Ordering::Release);
        self.shutdown_notify.notify_one();
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        // Can't await the task here; it exits at its next wakeup
        if self.task_handle.is_some() {
            debug!("Polling scheduler dropped, signalling shutdown");
            self.signal_shutdown();
        }
    }
}

/// Statistics for a polling task
#[derive(Debug, Clone)]
pub struct PollingStats {
    pub interval: Duration,
    pub started_at: SystemTime,
    pub error_count: u32,
    pub poll_count: u64,
    pub last_success: bool,
    pub is_running: bool,
}

impl fmt::Display for PollingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Polling Stats:")?;
        writeln!(f, "  Interval: {:?}", self.interval)?;
        writeln!(f, "  Polls: {}", self.poll_count)?;
        writeln!(f, "  Consecutive errors: {}", self.error_count)?;
        writeln!(f, "  Last poll succeeded: {}", self.last_success)?;
        write!(f, "  Running: {}", self.is_running)
    }
}
