pub mod refresh_leaderboard;
