use std::future::Future;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use log::info;

use crate::config::{StoreBackend, StoreSettings};
use crate::error::Result;

pub mod memory;
pub mod models;
pub mod postgres;
pub mod rest;

pub use memory::MemoryLeaderboard;
pub use models::LeaderboardEntry;
pub use postgres::PostgresClient;
pub use rest::RestClient;

/// Persisted leaderboard keyed by address.
///
/// No isolation is offered: concurrent upserts for the same address race and
/// the store's own ordering decides the winner.
pub trait LeaderboardStore: Send + Sync {
    /// Replace-or-insert the row for `address`.
    fn upsert(
        &self,
        address: &str,
        points: &BigDecimal,
        timestamp: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Up to `n` rows ordered by points descending, never including
    /// `exclude_address`.
    fn top_n(
        &self,
        n: usize,
        exclude_address: &str,
    ) -> impl Future<Output = Result<Vec<LeaderboardEntry>>> + Send;
}

/// Leaderboard backend chosen at startup from [`StoreSettings::backend`].
pub enum Leaderboard {
    Rest(RestClient),
    Postgres(PostgresClient),
    Memory(MemoryLeaderboard),
}

impl Leaderboard {
    pub async fn connect(settings: &StoreSettings) -> Result<Self> {
        let store = match settings.backend {
            StoreBackend::Rest => Self::Rest(RestClient::new(settings)?),
            StoreBackend::Postgres => {
                let client = PostgresClient::new(settings).await?;
                client.migrate().await?;
                Self::Postgres(client)
            },
            StoreBackend::Memory => Self::Memory(MemoryLeaderboard::default()),
        };

        info!("Leaderboard store ready ({:?} backend)", settings.backend);
        Ok(store)
    }
}

impl LeaderboardStore for Leaderboard {
    async fn upsert(&self, address: &str, points: &BigDecimal, timestamp: DateTime<Utc>) -> Result<()> {
        match self {
            Self::Rest(client) => client.upsert(address, points, timestamp).await,
            Self::Postgres(client) => client.upsert(address, points, timestamp).await,
            Self::Memory(table) => table.upsert(address, points, timestamp).await,
        }
    }

    async fn top_n(&self, n: usize, exclude_address: &str) -> Result<Vec<LeaderboardEntry>> {
        match self {
            Self::Rest(client) => client.top_n(n, exclude_address).await,
            Self::Postgres(client) => client.top_n(n, exclude_address).await,
            Self::Memory(table) => table.top_n(n, exclude_address).await,
        }
    }
}
