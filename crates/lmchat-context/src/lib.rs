mod strategy;
mod default;
mod memory;
mod templates;
mod error;

pub use strategy::{ContextEntry, ContextStrategy, ContextWindow};
pub use default::DefaultContextStrategy;
pub use memory::MemoryUpdater;
pub use templates::{DEFAULT_SYSTEM_PROMPT, MEMORY_RECAP_HEADER};
pub use error::{ContextError, Result};
