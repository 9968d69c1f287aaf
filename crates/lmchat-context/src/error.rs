use lmchat_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub type Result<T> = std::result::Result<T, ContextError>;
