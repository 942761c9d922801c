mod error;
mod identity;
mod operations;
mod preferences;
mod types;

pub use error::{FridayIdError, PreferenceError};
pub use identity::{Identity, HOST_ROLE, PLUS_ONE_ROLE};
pub use operations::{admission, can_join, can_view, in_friday_group, visible_fridays, Admission};
pub use preferences::{Cheese, Doneness, Preferences, Sauce, Topping};
pub use types::{normalize_email, Friday, FridayId, FridayUpdate, Friend, DEFAULT_MAX_GUESTS};
