use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::db::models::{rank_entries, LeaderboardEntry};
use crate::db::LeaderboardStore;
use crate::error::Result;
use crate::utils::normalize_address;

/// Process-local leaderboard. Rows live as long as the process.
#[derive(Default)]
pub struct MemoryLeaderboard {
    rows: RwLock<HashMap<String, LeaderboardEntry>>,
}

impl MemoryLeaderboard {
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    pub async fn get(&self, address: &str) -> Option<LeaderboardEntry> {
        self.rows.read().await.get(&normalize_address(address)).cloned()
    }
}

impl LeaderboardStore for MemoryLeaderboard {
    async fn upsert(&self, address: &str, points: &BigDecimal, timestamp: DateTime<Utc>) -> Result<()> {
        let entry = LeaderboardEntry::new(address, points.clone(), timestamp);
        self.rows.write().await.insert(entry.address.clone(), entry);
        Ok(())
    }

    async fn top_n(&self, n: usize, exclude_address: &str) -> Result<Vec<LeaderboardEntry>> {
        let entries = self.rows.read().await.values().cloned().collect();
        Ok(rank_entries(entries, n, exclude_address))
    }
}
