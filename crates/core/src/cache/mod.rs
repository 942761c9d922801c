mod error;
mod keys;
mod ttl;

pub use error::{CacheError, Result};
pub use keys::{
    days_from_upcoming_fridays_key, friend_key, upcoming_fridays_key, wrapped_key,
    year_from_wrapped_key,
};
pub use ttl::{Refresh, RefreshFn, TtlCache};
