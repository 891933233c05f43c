use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use crate::utils::{normalize_address, same_address};

/// One leaderboard row (table `leaderboard`).
///
/// Primary Key: address
/// A write replaces the whole row; there is no history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub address: String,
    pub points: BigDecimal,
    pub last_updated: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn new(address: &str, points: BigDecimal, last_updated: DateTime<Utc>) -> Self {
        Self {
            // Always lowercase addresses for consistent comparisons
            address: normalize_address(address),
            points,
            last_updated,
        }
    }
}

/// Drop the excluded address, order by points descending and keep `n`.
pub fn rank_entries(
    mut entries: Vec<LeaderboardEntry>,
    n: usize,
    exclude_address: &str,
) -> Vec<LeaderboardEntry> {
    entries.retain(|entry| !same_address(&entry.address, exclude_address));
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: &str = "0x2222222222222222222222222222222222222222";

    fn entry(address: &str, points: i64) -> LeaderboardEntry {
        LeaderboardEntry::new(address, BigDecimal::from(points), Utc::now())
    }

    #[test]
    fn test_new_lowercases_address() {
        let e = entry("0xABCDEF0000000000000000000000000000000001", 1);
        assert_eq!(e.address, "0xabcdef0000000000000000000000000000000001");
    }

    #[test]
    fn test_rank_sorts_descending_and_excludes_pool() {
        let entries = vec![
            entry("0x01", 5),
            entry(&POOL.to_uppercase().replace("0X", "0x"), 1_000),
            entry("0x02", 50),
            entry("0x03", 20),
        ];

        let ranked = rank_entries(entries, 10, POOL);
        let addresses: Vec<&str> = ranked.iter().map(|e| e.address.as_str()).collect();

        assert_eq!(addresses, vec!["0x02", "0x03", "0x01"]);
    }

    #[test]
    fn test_rank_truncates() {
        let entries = (0..15).map(|i| entry(&format!("0x{:02}", i), i)).collect();
        let ranked = rank_entries(entries, 10, POOL);

        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].points, BigDecimal::from(14));
        assert_eq!(ranked[9].points, BigDecimal::from(5));
    }
}
