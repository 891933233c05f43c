mod score_service;
mod state;

pub use score_service::ScoreService;
pub use state::SessionState;
