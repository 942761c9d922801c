//! Google Calendar v3 gateway over REST.
//!
//! Requests carry a bearer token read from an OAuth token file. Obtaining and
//! refreshing that token happens outside this process.

mod client;
mod conversions;

pub use client::{GoogleCalendarConfig, GoogleCalendarGateway, DEFAULT_API_URL};
