pub mod models;
pub mod error;
pub mod trait_client;
pub mod in_memory;
pub mod dbs;

pub use models::{DBMessage, NewMessage, NewThread, Thread, ThreadPatch, DEFAULT_THREAD_TITLE};
pub use error::{PersistError, Result};
pub use trait_client::{MessageStore, PersistenceClient, ThreadStore};
pub use in_memory::InMemoryPersistenceClient;

#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
