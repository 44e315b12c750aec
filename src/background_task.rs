use tokio::time::{interval, Duration};

use crate::{constants::MEMORY_PURGE_INTERVAL_SECS, store::MemoryStore};

/// Sweeps expired entries of sessions that are never read again.
pub async fn start_purge_task(store: MemoryStore) {
    let mut interval = interval(Duration::from_secs(MEMORY_PURGE_INTERVAL_SECS));

    loop {
        interval.tick().await;

        let purged = store.purge_expired();
        if purged > 0 {
            tracing::debug!("Purged {} expired session entries", purged);
        }
    }
}
