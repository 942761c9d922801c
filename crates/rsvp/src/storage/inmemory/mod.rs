//! In-memory storage backend for testing.
//!
//! Stores all data in HashMaps wrapped in `Arc<RwLock<_>>`. Guest list
//! mutations happen under the write lock, so they are as atomic as the SQLite
//! backend's single-statement updates.

mod repository;

pub use repository::InMemoryRepository;
