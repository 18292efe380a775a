pub mod connection;
pub mod entities;
pub mod repositories;
pub mod store;

pub use repositories::{HistoryRepository, KeyValueRepository, HISTORY_KEY};
pub use store::{KeyValueStore, MemoryStore};
