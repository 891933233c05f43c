use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::StoreSettings;
use crate::db::models::LeaderboardEntry;
use crate::db::LeaderboardStore;
use crate::error::{Error, Result};
use crate::utils::normalize_address;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Columns requested from the table; points cast to text to keep precision.
const SELECT_COLUMNS: &str = "address,points::text,last_updated";

/// Highest first; rows without points sort last.
const ORDER_BY: &str = "points.desc.nullslast";

/// Client for a hosted PostgREST-compatible table API.
#[derive(Debug, Clone)]
pub struct RestClient {
    table_url: Url,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct UpsertRow<'a> {
    address: &'a str,
    points: String,
    last_updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SelectRow {
    address: String,
    points: Option<String>,
    last_updated: DateTime<Utc>,
}

impl RestClient {
    pub fn new(settings: &StoreSettings) -> Result<Self> {
        let table_url = table_url(&settings.url, &settings.table)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            table_url,
            api_key: settings.key.clone(),
            http,
        })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            return req;
        }
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

/// `{base}/rest/v1/{table}`, tolerating a trailing slash on the base.
fn table_url(base: &str, table: &str) -> Result<Url> {
    let mut base = base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|url| url.join(&format!("rest/v1/{}", table)))
        .map_err(|e| Error::Config(format!("invalid store url {}: {}", base, e)))
}

async fn error_for_status(resp: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let snippet: String = text.chars().take(1024).collect();
    Err(Error::store(format!(
        "{} failed with http {}: {}",
        action, status, snippet
    )))
}

fn decode_rows(text: &str) -> Result<Vec<LeaderboardEntry>> {
    let rows: Vec<SelectRow> = serde_json::from_str(text).map_err(|e| {
        let snippet: String = text.chars().take(1024).collect();
        Error::store(format!(
            "failed to decode leaderboard rows: {} body_snippet: {}",
            e, snippet
        ))
    })?;

    rows.into_iter()
        .filter_map(|row| match row.points {
            Some(points) => Some((row.address, points, row.last_updated)),
            None => {
                debug!("Skipping leaderboard row {} without points", row.address);
                None
            },
        })
        .map(|(address, points, last_updated)| {
            let points = BigDecimal::from_str(&points).map_err(|e| {
                Error::store(format!("invalid points {:?} for {}: {}", points, address, e))
            })?;
            Ok(LeaderboardEntry::new(&address, points, last_updated))
        })
        .collect()
}

impl LeaderboardStore for RestClient {
    async fn upsert(&self, address: &str, points: &BigDecimal, timestamp: DateTime<Utc>) -> Result<()> {
        let address = normalize_address(address);
        let body = [UpsertRow {
            address: &address,
            points: points.to_string(),
            last_updated: timestamp,
        }];

        let req = self
            .http
            .post(self.table_url.clone())
            .query(&[("on_conflict", "address")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);

        let resp = self.authorize(req).send().await?;
        error_for_status(resp, "upsert").await?;

        debug!("Upserted leaderboard row for {}", address);
        Ok(())
    }

    async fn top_n(&self, n: usize, exclude_address: &str) -> Result<Vec<LeaderboardEntry>> {
        let exclude = format!("neq.{}", normalize_address(exclude_address));
        let limit = n.to_string();

        let req = self.http.get(self.table_url.clone()).query(&[
            ("select", SELECT_COLUMNS),
            ("address", exclude.as_str()),
            ("order", ORDER_BY),
            ("limit", limit.as_str()),
        ]);

        let resp = self.authorize(req).send().await?;
        let text = error_for_status(resp, "top_n").await?.text().await?;

        decode_rows(&text)
    }
}
