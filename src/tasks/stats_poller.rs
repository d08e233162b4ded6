use crate::api::ApiClient;
use crate::models::StatsSnapshot;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

pub const STATS_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Background refresh of the statistics snapshot. Stopping clears the
/// timer; a fetch already in flight is allowed to finish.
pub struct StatsPoller {
    stop: watch::Sender<bool>,
}

impl StatsPoller {
    pub fn spawn(api: ApiClient, snapshot: watch::Sender<Option<StatsSnapshot>>) -> Self {
        Self::spawn_every(api, snapshot, STATS_POLL_INTERVAL)
    }

    pub fn spawn_every(
        api: ApiClient,
        snapshot: watch::Sender<Option<StatsSnapshot>>,
        every: Duration,
    ) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        tokio::spawn(poll_stats_task(api, snapshot, stop_rx, every));
        Self { stop }
    }

    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}

async fn poll_stats_task(
    api: ApiClient,
    snapshot: watch::Sender<Option<StatsSnapshot>>,
    mut stop: watch::Receiver<bool>,
    every: Duration,
) {
    info!("Starting statistics polling every {}s", every.as_secs());
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // First tick completes immediately, so the view fills on mount
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => {}
        }

        match api.fetch_stats().await {
            Ok(stats) => {
                debug!("Statistics refreshed: {} votes", stats.total);
                snapshot.send_replace(Some(stats));
            }
            // Stale data stays on screen until the next good poll
            Err(e) => warn!("Failed to fetch statistics: {}", e),
        }
    }

    info!("Statistics polling stopped");
}
