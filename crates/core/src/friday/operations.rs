//! Visibility and admission rules.
//!
//! Pure functions, no I/O: given an identity and a Friday, decide what the
//! caller may see and do.

use super::{Friday, Identity};

/// Why a caller may not join a Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// The Friday is restricted to a group the caller is not in.
    WrongGroup,
    /// The Friday is closed for RSVP.
    Disabled,
}

/// Returns true if the caller belongs to the Friday's group, or the Friday has none.
pub fn in_friday_group(identity: &Identity, friday: &Friday) -> bool {
    match &friday.group {
        None => true,
        Some(group) => identity.in_group(group),
    }
}

/// Whether the caller may see this Friday at all.
///
/// Hosts see everything. Everyone else sees enabled Fridays that are either
/// open or restricted to one of their groups.
pub fn can_view(identity: &Identity, friday: &Friday) -> bool {
    identity.is_host() || (friday.enabled && in_friday_group(identity, friday))
}

/// Decides whether the caller may add a guest to this Friday.
pub fn admission(identity: &Identity, friday: &Friday) -> Admission {
    if identity.is_host() {
        return Admission::Allowed;
    }
    if !in_friday_group(identity, friday) {
        return Admission::WrongGroup;
    }
    if !friday.enabled {
        return Admission::Disabled;
    }
    Admission::Allowed
}

pub fn can_join(identity: &Identity, friday: &Friday) -> bool {
    admission(identity, friday) == Admission::Allowed
}

/// Filters Fridays down to the ones the caller may see, preserving order.
pub fn visible_fridays(identity: &Identity, fridays: Vec<Friday>) -> Vec<Friday> {
    fridays
        .into_iter()
        .filter(|friday| can_view(identity, friday))
        .collect()
}
