//! Long-running background task that purges expired payment records and
//! banner counters from the database, and evicts idle in-memory sessions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info};

use funnel_core::persist::RECORD_TTL_HOURS;

use crate::db;
use crate::sessions::SessionStore;

pub struct SweeperState {
    pub pool: SqlitePool,
    pub sessions: SessionStore,
    pub interval: Duration,
}

/// Spawn the sweep loop as a background [`tokio`] task.
pub async fn run(state: Arc<SweeperState>) {
    info!(
        "Sweeper starting, interval {}s",
        state.interval.as_secs()
    );

    // Sessions share the record TTL: past it there is nothing durable to
    // resume, so the in-memory state has no value either.
    let session_idle = Duration::from_secs(RECORD_TTL_HOURS as u64 * 3_600);

    loop {
        match db::purge_expired(&state.pool, Utc::now()).await {
            Ok(0) => {}
            Ok(purged) => info!("Purged {purged} expired record(s)"),
            Err(e) => error!("Sweep failed: {e}"),
        }

        let evicted = state.sessions.purge_idle(session_idle).await;
        if evicted > 0 {
            info!("Evicted {evicted} idle session(s)");
        }

        tokio::time::sleep(state.interval).await;
    }
}
