use std::str::FromStr;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use log::{info, warn};
use tokio_postgres::NoTls;

use crate::config::StoreSettings;
use crate::error::{Error, Result};

/// Split a schema file into statements. The schema has no dollar-quoted bodies.
fn split_sql_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|stmt| !stmt.is_empty())
}

/// Leaderboard schema, bundled so migrations do not depend on the working directory.
const SCHEMA: &str = include_str!("../../../schema/postgres.sql");

/// Schema statements with `{table}` substituted.
fn schema_statements(table: &str) -> Vec<String> {
    split_sql_statements(SCHEMA)
        .map(|stmt| stmt.replace("{table}", table))
        .collect()
}

/// PostgreSQL leaderboard client with connection pooling.
///
/// `store.url` is a connection string, `store.key` the password if the
/// string does not carry one.
#[derive(Clone)]
pub struct PostgresClient {
    pub pool: Pool,
    pub(crate) table: String,
}

impl PostgresClient {
    pub async fn new(settings: &StoreSettings) -> Result<Self> {
        info!("Connecting to PostgreSQL");

        let mut pg_config = tokio_postgres::Config::from_str(&settings.url)
            .map_err(|e| Error::Config(format!("invalid postgres connection string: {}", e)))?;
        if !settings.key.is_empty() {
            pg_config.password(&settings.key);
        }

        let mut retries = 0;
        let max_retries = 3;

        loop {
            let mgr_config = ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            };

            let mgr = Manager::from_config(pg_config.clone(), NoTls, mgr_config);
            let pool = Pool::builder(mgr)
                .max_size(settings.pool_size)
                .build()
                .map_err(|e| Error::store(format!("failed to create connection pool: {}", e)))?;

            // Test the connection
            match pool.get().await {
                Ok(_conn) => {
                    info!("Successfully connected to PostgreSQL");
                    return Ok(Self {
                        pool,
                        table: settings.table.clone(),
                    });
                },
                Err(e) => {
                    retries += 1;

                    if retries >= max_retries {
                        return Err(Error::store(format!(
                            "failed to connect to PostgreSQL after {} attempts: {}",
                            max_retries, e
                        )));
                    }

                    let delay = std::time::Duration::from_millis(100 * 2_u64.pow(retries));
                    warn!(
                        "Failed to connect to PostgreSQL (attempt {}/{}), retrying in {:?}...",
                        retries, max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                },
            }
        }
    }

    pub async fn migrate(&self) -> Result<()> {
        info!("Running PostgreSQL migrations");
        let client = self.pool.get().await?;

        for stmt in schema_statements(&self.table) {
            client
                .execute(stmt.as_str(), &[])
                .await
                .map_err(|e| Error::store(format!("migration statement failed: {}: {}", stmt, e)))?;
        }

        info!("PostgreSQL migrations completed successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sql_statements() {
        let sql = "CREATE TABLE a (x int);\n\n  CREATE INDEX i ON a (x);\n";
        let stmts: Vec<&str> = split_sql_statements(sql).collect();
        assert_eq!(stmts, vec!["CREATE TABLE a (x int)", "CREATE INDEX i ON a (x)"]);
    }

    #[test]
    fn test_schema_statements_use_configured_table() {
        let stmts = schema_statements("scores_v2");

        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].starts_with("CREATE TABLE IF NOT EXISTS scores_v2"));
        assert!(stmts[1].contains("scores_v2_points_idx ON scores_v2"));
        assert!(stmts.iter().all(|s| !s.contains("{table}")));
    }
}
