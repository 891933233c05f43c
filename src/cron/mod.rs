pub mod jobs;
mod scheduler;

pub use scheduler::RefreshScheduler;
