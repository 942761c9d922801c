//! Storage backend implementations.
//!
//! Concrete implementations of [`rsvp_core::storage::AttendanceStore`],
//! selected at compile time via feature flags, plus the cached decorator that
//! wraps whichever backend is active.
//!
//! # Feature Flags
//!
//! - `sqlite` (default): SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//! - `inmemory`: HashMap-backed store, also compiled for tests
//!
//! ```bash
//! cargo build -p rsvp --no-default-features --features inmemory
//! ```

#[cfg(not(any(feature = "sqlite", feature = "inmemory")))]
compile_error!(
    "No storage backend selected. Enable 'sqlite' or 'inmemory' feature. \
    Example: cargo build -p rsvp --features sqlite"
);

pub mod cached;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

pub use cached::{CacheTtls, CachedAttendanceStore};

#[cfg(any(feature = "inmemory", test))]
pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
