//! Contract for the remote calendar that mirrors Fridays as events.

mod error;
mod traits;
mod types;

pub use error::{GatewayError, Result};
pub use traits::CalendarGateway;
pub use types::{Attendee, CalendarEvent, EventStatus, ResponseStatus, Visibility};
