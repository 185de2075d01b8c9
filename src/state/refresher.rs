use crate::state::messages::NetworkRequest;
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Re-fetches the tournament list on a fixed period. The open bracket is
/// never refreshed here so local projections survive.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>, period: Duration) -> Self {
        Self {
            network_requests,
            period,
        }
    }

    pub async fn run(self) {
        let mut list_interval = interval(self.period);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        list_interval.tick().await;

        loop {
            list_interval.tick().await;
            debug!("periodic tournament list refresh");
            if self
                .network_requests
                .send(NetworkRequest::LoadTournaments)
                .await
                .is_err()
            {
                break;
            }
        }
    }
}
