use std::sync::Arc;

use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{error, info};

use super::gate::StoreHoursGate;

/// Owns the periodic re-evaluation task. Stopping or dropping it cancels the task.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub(crate) fn spawn(gate: Arc<StoreHoursGate>) -> Self {
        let task = tokio::spawn(run_poll_loop(gate));
        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        self.task.abort();
        info!("store hours poller stopped");
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_poll_loop(gate: Arc<StoreHoursGate>) {
    let period = gate.poll_interval();
    info!(poll_interval_ms = period.as_millis() as u64, "store hours poller started");
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and the gate was just evaluated.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(err) = gate.refresh() {
            error!(error = %err, "store hours re-evaluation failed");
        }
    }
}
