pub mod abis;
pub mod chain;
pub mod config;
pub mod cron;
pub mod db;
pub mod error;
pub mod render;
pub mod scoring;
pub mod service;
pub mod utils;

pub use self::config::Settings;
pub use chain::{ChainReader, RpcChainReader};
pub use cron::RefreshScheduler;
pub use db::{Leaderboard, LeaderboardStore};
pub use error::{Error, ErrorKind, Result};
pub use scoring::{compute_score, PointsSnapshot, Score};
pub use service::{ScoreService, SessionState};
