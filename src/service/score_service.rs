use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::watch;

use crate::chain::ChainReader;
use crate::config::ChainSettings;
use crate::db::models::{rank_entries, LeaderboardEntry};
use crate::db::LeaderboardStore;
use crate::error::{Error, Result};
use crate::scoring::{self, PointsSnapshot};
use crate::service::SessionState;
use crate::utils::{normalize_address, same_address};

/// Rows shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Ties a chain reader and a leaderboard store into the check-score flow.
///
/// The session state and the displayed leaderboard are published through
/// `watch` channels. Requests are not sequenced: when two submissions
/// overlap, whichever finishes last owns the displayed state and the stored
/// row.
pub struct ScoreService<R, S> {
    reader: R,
    store: S,
    pool_address: String,
    start_block: u64,
    leaderboard_size: usize,
    state_tx: watch::Sender<SessionState>,
    leaderboard_tx: watch::Sender<Vec<LeaderboardEntry>>,
}

impl<R: ChainReader, S: LeaderboardStore> ScoreService<R, S> {
    pub fn new(reader: R, store: S, chain: &ChainSettings) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        let (leaderboard_tx, _) = watch::channel(Vec::new());

        Self {
            reader,
            store,
            pool_address: normalize_address(&chain.pool_address),
            start_block: chain.start_block,
            leaderboard_size: LEADERBOARD_SIZE,
            state_tx,
            leaderboard_tx,
        }
    }

    pub fn with_leaderboard_size(mut self, size: usize) -> Self {
        self.leaderboard_size = size;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_leaderboard(&self) -> watch::Receiver<Vec<LeaderboardEntry>> {
        self.leaderboard_tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.leaderboard_tx.borrow().clone()
    }

    /// Check the points of `input`, publish the result, then persist it.
    ///
    /// The snapshot is published before the upsert starts, so a store
    /// failure never hides it. A successful upsert triggers one leaderboard
    /// refresh.
    pub async fn submit(&self, input: &str) -> SessionState {
        let address = normalize_address(input);
        self.state_tx.send_replace(SessionState::Loading {
            address: address.clone(),
        });

        let snapshot = match self.check(&address).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Points check for {:?} failed: {}", address, e);
                let state = SessionState::from_error(&e);
                self.state_tx.send_replace(state.clone());
                return state;
            },
        };

        info!(
            "Address {} holds {} tokens for {} blocks: {} points (level {})",
            address, snapshot.token_balance, snapshot.blocks_held, snapshot.points, snapshot.level
        );

        let state = SessionState::Success {
            address: address.clone(),
            snapshot: snapshot.clone(),
        };
        self.state_tx.send_replace(state.clone());

        self.persist(&address, &snapshot).await;

        state
    }

    /// A connected wallet is treated exactly like a typed submission.
    pub async fn on_wallet_connected(&self, address: &str) -> SessionState {
        info!("Wallet connected: {}", address);
        self.submit(address).await
    }

    /// Validate, read the chain and score. No store access.
    pub async fn check(&self, address: &str) -> Result<PointsSnapshot> {
        let address = normalize_address(address);

        if address.is_empty() {
            return Err(Error::Validation("Please enter an address.".to_string()));
        }
        if same_address(&address, &self.pool_address) {
            return Err(Error::Validation(
                "The pool address is not eligible for points.".to_string(),
            ));
        }

        let (current_block, raw_balance) = tokio::try_join!(
            self.reader.current_block_height(),
            self.reader.token_balance(&address),
        )?;

        scoring::snapshot(raw_balance, current_block, self.start_block)
    }

    async fn persist(&self, address: &str, snapshot: &PointsSnapshot) {
        match self.store.upsert(address, &snapshot.points, Utc::now()).await {
            Ok(()) => {
                if let Err(e) = self.refresh_leaderboard().await {
                    error!("Failed to refresh leaderboard after upsert: {}", e);
                }
            },
            Err(e) => {
                error!("Failed to save points for {}: {}", address, e);
            },
        }
    }

    /// Re-query the top rows and publish them.
    ///
    /// On error the previously published leaderboard stays in place.
    pub async fn refresh_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let entries = self
            .store
            .top_n(self.leaderboard_size, &self.pool_address)
            .await?;
        let entries = rank_entries(entries, self.leaderboard_size, &self.pool_address);

        self.leaderboard_tx.send_replace(entries.clone());
        Ok(entries)
    }
}
