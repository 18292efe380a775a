pub mod history_repository;
pub mod kv_repository;

pub use history_repository::{HistoryRepository, HISTORY_KEY};
pub use kv_repository::KeyValueRepository;
