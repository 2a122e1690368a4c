//! Trigger scheduler
//!
//! Invokes the engine's drain entry point on a fixed period and once whenever
//! connectivity transitions from offline to online. Ticks observed while
//! offline are skipped; the tick interval doubles as the implicit retry
//! backoff for records left pending by a failed attempt.

use std::sync::Arc;
use std::time::Duration;

use ebb_engine::{DrainOutcome, ReconcileEngine};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Scheduler configuration
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Fixed drain period
    pub tick_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            tick_interval: Duration::from_secs(10),
        }
    }
}

/// Connectivity signal feeding the scheduler.
///
/// The embedding application flips this from its own online/offline
/// detection; the scheduler reacts to the offline-to-online edge.
pub struct ConnectivityGauge {
    tx: watch::Sender<bool>,
}

impl ConnectivityGauge {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        ConnectivityGauge { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn set_online(&self, online: bool) {
        self.tx.send_replace(online);
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Background loop driving the engine
pub struct SyncScheduler {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncScheduler {
    /// Spawn the scheduler loop on the current runtime
    pub fn spawn(
        engine: Arc<ReconcileEngine>,
        config: SchedulerConfig,
        mut connectivity: watch::Receiver<bool>,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // An interval yields immediately; swallow that so the first
            // drain happens one full period after startup.
            ticker.tick().await;

            let mut online = *connectivity.borrow();
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if online {
                            Self::run_drain(&engine).await;
                        }
                    }
                    changed = connectivity.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let now_online = *connectivity.borrow();
                        if now_online && !online {
                            debug!("connectivity regained, draining");
                            Self::run_drain(&engine).await;
                        }
                        online = now_online;
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        SyncScheduler { shutdown, task }
    }

    async fn run_drain(engine: &ReconcileEngine) {
        match engine.drain().await {
            Ok(DrainOutcome::Completed(report)) => {
                debug!("drain pass complete: {report:?}");
            }
            Ok(DrainOutcome::AlreadyDraining) => {
                debug!("drain overlapped an in-flight pass");
            }
            Err(err) => warn!("drain failed: {err}"),
        }
    }

    /// Stop the loop and wait for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
