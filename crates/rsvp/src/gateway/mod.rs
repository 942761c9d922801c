//! Calendar gateway implementations.
//!
//! - [`google`]: Google Calendar v3 over REST
//! - [`inmemory`]: a HashMap-backed calendar, used when the remote calendar is
//!   disabled in tests and as the test fake
//! - [`timeout`]: a decorator bounding every call of another gateway

pub mod google;
pub mod inmemory;
pub mod timeout;

pub use google::{GoogleCalendarConfig, GoogleCalendarGateway};
pub use inmemory::InMemoryCalendarGateway;
pub use timeout::TimeoutGateway;
