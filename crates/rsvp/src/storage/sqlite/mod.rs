//! SQLite storage backend.
//!
//! Uses `rusqlite` for the queries and `tokio-rusqlite` to run them off the
//! async runtime. Guest lists are JSON arrays mutated in place by single
//! statements, so concurrent invites cannot lose updates.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
