//! Plain-text rendering of the result card and leaderboard table.

use bigdecimal::BigDecimal;
use num_traits::Signed;

use crate::db::models::LeaderboardEntry;
use crate::scoring::PointsSnapshot;
use crate::service::SessionState;
use crate::utils::shorten_address;

/// Fractional digits printed for balances and points.
const DISPLAY_PLACES: i64 = 4;

/// Fixed-point string truncated to `places` fractional digits.
pub fn format_decimal(value: &BigDecimal, places: i64) -> String {
    let truncated = value.with_scale(places);
    let (digits, _) = truncated.as_bigint_and_exponent();

    let sign = if digits.is_negative() { "-" } else { "" };
    let mut abs = digits.abs().to_string();
    let places = places.max(0) as usize;

    if places == 0 {
        return format!("{}{}", sign, abs);
    }
    if abs.len() <= places {
        abs = format!("{}{}", "0".repeat(places + 1 - abs.len()), abs);
    }
    let (int_part, frac_part) = abs.split_at(abs.len() - places);
    format!("{}{}.{}", sign, int_part, frac_part)
}

pub fn card(address: &str, snapshot: &PointsSnapshot) -> String {
    format!(
        "Address:      {}\nBalance:      {}\nBlocks held:  {}\nPoints:       {}\nLevel:        {}",
        address,
        format_decimal(&snapshot.token_balance, DISPLAY_PLACES),
        snapshot.blocks_held,
        format_decimal(&snapshot.points, DISPLAY_PLACES),
        snapshot.level,
    )
}

pub fn leaderboard(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return "Leaderboard is empty".to_string();
    }

    let mut out = String::from("Rank  Address        Points");
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "\n{:<5} {:<14} {}",
            i + 1,
            shorten_address(&entry.address),
            format_decimal(&entry.points, DISPLAY_PLACES)
        ));
    }
    out
}

pub fn state(state: &SessionState) -> String {
    match state {
        SessionState::Idle => "Enter an address to check its points".to_string(),
        SessionState::Loading { address } => format!("Checking {}...", address),
        SessionState::Success { address, snapshot } => card(address, snapshot),
        SessionState::Error { message, .. } => format!("Error: {}", message),
    }
}
