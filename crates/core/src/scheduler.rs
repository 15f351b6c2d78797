//! Background refresh and ignore-list cleanup loops.
//!
//! Both loops are started by [`DataService::start`] and cancelled together by
//! [`DataService::stop`]. Cancellation is only observed between iterations,
//! so a refresh cycle that is already running completes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ignore::CLEANUP_INTERVAL;
use crate::service::DataService;

/// Running background loops of one service.
#[derive(Debug)]
pub(crate) struct SchedulerHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl DataService {
    /// Refresh once, then start the refresh and cleanup loops.
    ///
    /// The first scheduled refresh happens one full poll interval after this
    /// call returns. Calling `start` on a running service does nothing. The
    /// slot is reserved before the initial refresh and released while it runs,
    /// so `stop` issued meanwhile returns at once and no loop is spawned.
    pub async fn start(self: &Arc<Self>) {
        let token = {
            let mut slot = self.scheduler.lock().await;
            if slot.is_some() {
                tracing::warn!("Data service already started");
                return;
            }
            let token = CancellationToken::new();
            *slot = Some(SchedulerHandle { token: token.clone(), tasks: Vec::new() });
            token
        };

        tracing::info!(poll_interval = ?self.poll_interval(), "Data service started");
        self.refresh().await;

        // stop() cancels under this lock, so an uncancelled token means our handle is still in the slot
        let mut slot = self.scheduler.lock().await;
        if token.is_cancelled() {
            tracing::debug!("Data service stopped during initial refresh");
            return;
        }

        let refresh = {
            let service = Arc::clone(self);
            every(self.poll_interval(), token.child_token(), "refresh", move || {
                let service = Arc::clone(&service);
                async move {
                    service.refresh().await;
                }
            })
        };

        let cleanup = {
            let service = Arc::clone(self);
            every(CLEANUP_INTERVAL, token.child_token(), "cleanup", move || {
                let service = Arc::clone(&service);
                async move {
                    let removed = service.sweep_ignored().await;
                    if removed > 0 {
                        tracing::debug!(removed, "Swept expired ignored databases");
                    }
                }
            })
        };

        if let Some(handle) = slot.as_mut() {
            handle.tasks.extend([refresh, cleanup]);
        }
    }

    /// Stop both background loops. In-flight work is not interrupted.
    pub async fn stop(&self) {
        let mut slot = self.scheduler.lock().await;
        match slot.take() {
            Some(handle) => {
                handle.token.cancel();
                tracing::info!(loops = handle.tasks.len(), "Data service stopped");
            }
            None => tracing::debug!("Data service not running"),
        }
    }

    /// True from `start` until `stop`, including the initial refresh.
    pub async fn is_running(&self) -> bool {
        self.scheduler.lock().await.as_ref().is_some_and(|h| {
            !h.token.is_cancelled() && (h.tasks.is_empty() || h.tasks.iter().any(|t| !t.is_finished()))
        })
    }
}

/// Spawn a loop running `tick` every `period`, starting one period from now.
fn every<F, Fut>(period: Duration, token: CancellationToken, name: &'static str, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tick().await;
        }

        tracing::debug!(task = name, "Background loop stopped");
    })
}
