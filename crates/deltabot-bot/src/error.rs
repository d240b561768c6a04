//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Feed error: {0}")]
    Feed(#[from] deltabot_feed::FeedError),

    #[error("Executor error: {0}")]
    Executor(#[from] deltabot_executor::ExecutorError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] deltabot_persistence::PersistenceError),
}

pub type AppResult<T> = Result<T, AppError>;
