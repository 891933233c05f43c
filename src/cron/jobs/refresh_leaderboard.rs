//! Job to re-query the leaderboard top rows.

use anyhow::Result;
use log::info;

use crate::chain::ChainReader;
use crate::db::LeaderboardStore;
use crate::service::ScoreService;

/// Refreshes the published leaderboard from the store.
///
/// A failure leaves the previous leaderboard published.
pub async fn run<R: ChainReader, S: LeaderboardStore>(service: &ScoreService<R, S>) -> Result<()> {
    info!("Starting refresh_leaderboard job...");

    let start = std::time::Instant::now();
    let entries = service.refresh_leaderboard().await?;

    info!(
        "Completed refresh_leaderboard job with {} entries in {:?}",
        entries.len(),
        start.elapsed()
    );
    Ok(())
}
