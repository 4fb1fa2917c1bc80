#![forbid(unsafe_code)]

pub mod codec;
pub mod history;
pub mod repository;
pub mod sqlite;

pub use history::{DEFAULT_HISTORY_KEY, HistoryStore};
pub use repository::{BlobStore, InMemoryRepository, Storage, StorageError};
