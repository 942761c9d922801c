use serde::{Deserialize, Serialize};

use super::normalize_email;

/// Role that grants host privileges.
pub const HOST_ROLE: &str = "pizza_host";

/// Role that allows RSVPing on behalf of another friend.
pub const PLUS_ONE_ROLE: &str = "plusOne";

/// An already-validated caller identity handed over by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub given_name: String,
    pub groups: Vec<String>,
    pub roles: Vec<String>,
}

impl Identity {
    pub fn new(email: &str, given_name: impl Into<String>) -> Self {
        Self {
            email: normalize_email(email),
            given_name: given_name.into(),
            groups: Vec::new(),
            roles: Vec::new(),
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Grants host privileges.
    pub fn as_host(self) -> Self {
        self.with_role(HOST_ROLE)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn is_host(&self) -> bool {
        self.has_role(HOST_ROLE)
    }

    pub fn can_plus_one(&self) -> bool {
        self.is_host() || self.has_role(PLUS_ONE_ROLE)
    }
}
