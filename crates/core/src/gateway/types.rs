use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An attendee's answer to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    #[default]
    NeedsAction,
    Declined,
    Tentative,
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Default,
    Public,
    Private,
    Confidential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub display_name: Option<String>,
    pub response_status: ResponseStatus,
}

impl Attendee {
    /// A freshly invited attendee that has not answered yet.
    pub fn invited(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: Some(name.into()),
            response_status: ResponseStatus::NeedsAction,
        }
    }

    pub fn has_declined(&self) -> bool {
        self.response_status == ResponseStatus::Declined
    }
}

/// Remote-side mirror of a Friday. Never assumed consistent with the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendees: Vec<Attendee>,
    pub status: EventStatus,
    pub visibility: Visibility,
    pub anyone_can_add_self: bool,
    pub guests_can_invite_others: bool,
    pub guests_can_modify: bool,
    pub locked: bool,
}

impl CalendarEvent {
    /// A confirmed, private, locked event with no attendees.
    pub fn new(id: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            summary: String::new(),
            description: String::new(),
            start_time,
            end_time,
            attendees: Vec::new(),
            status: EventStatus::Confirmed,
            visibility: Visibility::Private,
            anyone_can_add_self: false,
            guests_can_invite_others: false,
            guests_can_modify: false,
            locked: true,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn attendee(&self, email: &str) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.email.eq_ignore_ascii_case(email))
    }

    /// Emails of attendees whose response is `declined`.
    pub fn declined(&self) -> impl Iterator<Item = &str> {
        self.attendees
            .iter()
            .filter(|a| a.has_declined())
            .map(|a| a.email.as_str())
    }

    /// Adds an attendee, or flips a declined one back to `needsAction`.
    ///
    /// Returns false when the email is already invited and has not declined.
    pub fn invite(&mut self, email: &str, name: &str) -> bool {
        match self
            .attendees
            .iter_mut()
            .find(|a| a.email.eq_ignore_ascii_case(email))
        {
            Some(attendee) if !attendee.has_declined() => false,
            Some(attendee) => {
                attendee.response_status = ResponseStatus::NeedsAction;
                true
            }
            None => {
                self.attendees.push(Attendee::invited(email, name));
                true
            }
        }
    }

    /// Marks an attendee declined. Returns false if the email is not an attendee.
    pub fn decline(&mut self, email: &str) -> bool {
        match self
            .attendees
            .iter_mut()
            .find(|a| a.email.eq_ignore_ascii_case(email))
        {
            Some(attendee) => {
                attendee.response_status = ResponseStatus::Declined;
                true
            }
            None => false,
        }
    }
}
