//! Periodic removal of expired admin sessions.

use app::auth::AdminAuthority;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// One sweep pass. Returns the number of sessions dropped.
pub fn sweep_once(authority: &AdminAuthority, now: DateTime<Utc>) -> usize {
    let removed = authority.registry().purge_expired(now);
    if removed > 0 {
        info!("Purged {} expired admin session(s)", removed);
    } else {
        debug!("No expired admin sessions");
    }
    removed
}

pub async fn run_session_sweeper(authority: Arc<AdminAuthority>, every: Duration) {
    info!("Starting session sweeper (every {}s)", every.as_secs());

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        sweep_once(&authority, Utc::now());
    }
}
