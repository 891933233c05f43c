mod leaderboard_entry;

pub use leaderboard_entry::{rank_entries, LeaderboardEntry};
