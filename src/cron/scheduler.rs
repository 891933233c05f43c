//! Periodic leaderboard refresh.
//!
//! Refreshes once when started, then on a fixed interval, independently of
//! score submissions.

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;

use crate::chain::ChainReader;
use crate::config::RefreshSettings;
use crate::db::LeaderboardStore;
use crate::service::ScoreService;

use super::jobs;

/// Cron scheduler that owns the leaderboard refresh job.
pub struct RefreshScheduler<R, S> {
    service: Arc<ScoreService<R, S>>,
    settings: Arc<RefreshSettings>,
}

impl<R, S> RefreshScheduler<R, S>
where
    R: ChainReader + 'static,
    S: LeaderboardStore + 'static,
{
    pub fn new(service: Arc<ScoreService<R, S>>, settings: RefreshSettings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }

    /// Starts the cron scheduler and runs until cancellation.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        // Initial load
        if let Err(e) = jobs::refresh_leaderboard::run(&*self.service).await {
            error!("Failed to refresh leaderboard: {:#}", e);
        }

        let mut scheduler = JobScheduler::new().await?;
        self.register_refresh_leaderboard_job(&scheduler).await?;

        scheduler.start().await?;
        info!("Cron scheduler started");

        // Wait for cancellation
        cancellation_token.cancelled().await;
        info!("Cron scheduler shutting down...");

        scheduler.shutdown().await?;
        Ok(())
    }

    async fn register_refresh_leaderboard_job(&self, scheduler: &JobScheduler) -> Result<()> {
        let service = self.service.clone();
        let interval = self.settings.interval_secs;

        let job = Job::new_repeated_async(
            std::time::Duration::from_secs(interval),
            move |_uuid, _lock| {
                let service = service.clone();
                Box::pin(async move {
                    if let Err(e) = jobs::refresh_leaderboard::run(&*service).await {
                        error!("Failed to refresh leaderboard: {:#}", e);
                    }
                })
            },
        )?;

        scheduler.add(job).await?;
        info!("Registered refresh_leaderboard job (every {}s)", interval);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::config::ChainSettings;
    use crate::db::MemoryLeaderboard;
    use crate::error::Error;

    struct NoChain;

    impl ChainReader for NoChain {
        async fn current_block_height(&self) -> crate::error::Result<u64> {
            Err(Error::Network("offline".into()))
        }

        async fn token_balance(&self, _address: &str) -> crate::error::Result<U256> {
            Err(Error::Network("offline".into()))
        }
    }

    fn chain() -> ChainSettings {
        ChainSettings {
            rpc_url: "http://localhost:8545".to_string(),
            token_address: "0x1111111111111111111111111111111111111111".to_string(),
            pool_address: "0x2222222222222222222222222222222222222222".to_string(),
            start_block: 0,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_loads_leaderboard_on_start() {
        let store = MemoryLeaderboard::default();
        store
            .upsert("0x01", &BigDecimal::from(3), Utc::now())
            .await
            .unwrap();

        let service = Arc::new(ScoreService::new(NoChain, store, &chain()));
        let scheduler = RefreshScheduler::new(service.clone(), RefreshSettings::default());

        let token = CancellationToken::new();
        token.cancel();
        scheduler.run(token).await.unwrap();

        let board = service.leaderboard();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].address, "0x01");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_repeated_job_refreshes_on_interval() {
        let service = Arc::new(ScoreService::new(
            NoChain,
            MemoryLeaderboard::default(),
            &chain(),
        ));
        let settings = RefreshSettings {
            interval_secs: 1,
            ..RefreshSettings::default()
        };
        let scheduler = RefreshScheduler::new(service.clone(), settings);

        let token = CancellationToken::new();
        let handle = {
            let token = token.clone();
            tokio::spawn(async move { scheduler.run(token).await })
        };

        // Let the initial refresh publish an empty board
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(service.leaderboard().is_empty());

        // Written directly to the store; only the repeated job can publish it
        service
            .store()
            .upsert("0x01", &BigDecimal::from(3), Utc::now())
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;

        let board = service.leaderboard();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].address, "0x01");

        token.cancel();
        handle.await.unwrap().unwrap();
    }
}
