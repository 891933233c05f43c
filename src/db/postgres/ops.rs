use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use log::error;

use crate::db::models::LeaderboardEntry;
use crate::db::postgres::PostgresClient;
use crate::db::LeaderboardStore;
use crate::error::{Error, Result};
use crate::utils::normalize_address;

impl LeaderboardStore for PostgresClient {
    async fn upsert(&self, address: &str, points: &BigDecimal, timestamp: DateTime<Utc>) -> Result<()> {
        let client = self.pool.get().await?;
        // NUMERIC travels as text to keep every digit
        let query = format!(
            r#"
            INSERT INTO {} (address, points, last_updated)
            VALUES ($1, $2::text::numeric, $3)
            ON CONFLICT (address) DO UPDATE SET
                points = EXCLUDED.points,
                last_updated = EXCLUDED.last_updated
            "#,
            self.table
        );

        let address = normalize_address(address);
        let points = points.to_string();

        client
            .execute(query.as_str(), &[&address, &points, &timestamp])
            .await
            .map_err(|e| {
                error!("Failed to upsert leaderboard row {}: {:?}", address, e);
                e
            })?;

        Ok(())
    }

    async fn top_n(&self, n: usize, exclude_address: &str) -> Result<Vec<LeaderboardEntry>> {
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            SELECT address, points::text AS points, last_updated
            FROM {}
            WHERE address <> $1
            ORDER BY {}.points DESC
            LIMIT $2
            "#,
            self.table, self.table
        );

        let exclude = normalize_address(exclude_address);
        let limit = n as i64;

        let rows = client.query(query.as_str(), &[&exclude, &limit]).await?;
        rows.iter().map(row_to_entry).collect()
    }
}

fn row_to_entry(row: &tokio_postgres::Row) -> Result<LeaderboardEntry> {
    let address: String = row.try_get("address")?;
    let points: String = row.try_get("points")?;
    let last_updated: DateTime<Utc> = row.try_get("last_updated")?;

    let points = BigDecimal::from_str(&points)
        .map_err(|e| Error::store(format!("invalid points {:?} for {}: {}", points, address, e)))?;

    Ok(LeaderboardEntry::new(&address, points, last_updated))
}
