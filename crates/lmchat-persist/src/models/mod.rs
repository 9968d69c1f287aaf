mod db_message;
mod db_thread;

// Export database-agnostic models
pub use db_message::{DBMessage, NewMessage};
pub use db_thread::{NewThread, Thread, ThreadPatch, DEFAULT_THREAD_TITLE};
