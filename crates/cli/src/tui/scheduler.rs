use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::management::ManagementApi;
use crate::poller;
use crate::tui::state::AppEvent;

/// Repeating poll-and-render timer. At most one timer task is alive.
pub struct RefreshScheduler {
    interval: Duration,
    api: Arc<dyn ManagementApi>,
    tx: mpsc::UnboundedSender<AppEvent>,
    running: Option<(oneshot::Sender<()>, JoinHandle<()>)>,
}

impl RefreshScheduler {
    pub fn new(
        interval: Duration,
        api: Arc<dyn ManagementApi>,
        tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self { interval, api, tx, running: None }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Cancel any existing timer and start a fresh one; the first tick fires immediately.
    pub fn resume(&mut self) {
        self.pause();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let api = self.api.clone();
        let tx = self.tx.clone();
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut intv = tokio::time::interval(period);
            intv.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = intv.tick() => {
                        // A poll already in flight is allowed to finish.
                        let fetch = poller::poll(api.as_ref()).await;
                        if tx.send(AppEvent::Topology(fetch)).is_err() {
                            break;
                        }
                        // Next poll is a full period after this one returned, however slow it was.
                        intv.reset();
                    }
                }
            }
            debug!("refresh timer stopped");
        });
        self.running = Some((stop_tx, handle));
    }

    pub fn pause(&mut self) {
        if let Some((stop, _handle)) = self.running.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.pause();
    }
}
