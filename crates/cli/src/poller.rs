use tracing::warn;

use common::{ConnectionInfo, QueueInfo, TopologySnapshot, VHostInfo};

use crate::error::MonitorError;
use crate::management::ManagementApi;

/// Outcome of one poll; each list succeeds or fails on its own.
#[derive(Debug)]
pub struct TopologyFetch {
    pub connections: Result<Vec<ConnectionInfo>, MonitorError>,
    pub queues: Result<Vec<QueueInfo>, MonitorError>,
    pub vhosts: Result<Vec<VHostInfo>, MonitorError>,
}

pub async fn poll(api: &dyn ManagementApi) -> TopologyFetch {
    let (connections, queues, vhosts) =
        tokio::join!(api.connections(), api.queues(), api.vhosts());
    TopologyFetch { connections, queues, vhosts }
}

impl TopologyFetch {
    /// Swap successful lists into `snapshot`; a failed list keeps its last good value.
    /// Returns how many of the three fetches failed.
    pub fn apply_to(self, snapshot: &mut TopologySnapshot) -> usize {
        let mut failures = 0;
        keep_or_replace(&mut snapshot.connections, self.connections, "connections", &mut failures);
        keep_or_replace(&mut snapshot.queues, self.queues, "queues", &mut failures);
        keep_or_replace(&mut snapshot.vhosts, self.vhosts, "vhosts", &mut failures);
        failures
    }
}

fn keep_or_replace<T>(
    slot: &mut Vec<T>,
    fetched: Result<Vec<T>, MonitorError>,
    what: &str,
    failures: &mut usize,
) {
    match fetched {
        Ok(list) => *slot = list,
        Err(e) => {
            *failures += 1;
            warn!(what, error = %e, "topology fetch failed; keeping previous list");
        }
    }
}
