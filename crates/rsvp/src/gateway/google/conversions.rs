//! Google Calendar wire types and conversions to domain events.
//!
//! Unknown fields are kept in `extra` so a read-modify-write cycle never drops
//! data this crate does not model.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use rsvp_core::gateway::{
    Attendee, CalendarEvent, EventStatus, GatewayError, ResponseStatus, Visibility,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    /// All-day events carry a date instead of a date-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAttendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub response_status: ResponseStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub start: GoogleDateTime,
    #[serde(default)]
    pub end: GoogleDateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<GoogleAttendee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub anyone_can_add_self: bool,
    #[serde(default = "default_true")]
    pub guests_can_invite_others: bool,
    #[serde(default)]
    pub guests_can_modify: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleEventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}

/// Error payload: `{"error": {"code": 404, "message": "Not Found"}}`.
#[derive(Debug, Deserialize)]
pub struct GoogleErrorBody {
    pub error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct GoogleErrorDetail {
    #[serde(default)]
    pub message: String,
}

fn instant(value: &GoogleDateTime, field: &str, event_id: &str) -> Result<DateTime<Utc>, GatewayError> {
    if let Some(date_time) = value.date_time {
        return Ok(date_time);
    }
    value
        .date
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| GatewayError::InvalidResponse(format!("event {event_id} has no {field} time")))
}

/// Converts a wire event into the domain mirror.
pub fn to_calendar_event(event: &GoogleEvent) -> Result<CalendarEvent, GatewayError> {
    Ok(CalendarEvent {
        id: event.id.clone(),
        summary: event.summary.clone().unwrap_or_default(),
        description: event.description.clone().unwrap_or_default(),
        start_time: instant(&event.start, "start", &event.id)?,
        end_time: instant(&event.end, "end", &event.id)?,
        attendees: event
            .attendees
            .iter()
            .map(|a| Attendee {
                email: a.email.clone(),
                display_name: a.display_name.clone(),
                response_status: a.response_status,
            })
            .collect(),
        status: event.status.unwrap_or_default(),
        visibility: event.visibility.unwrap_or_default(),
        anyone_can_add_self: event.anyone_can_add_self,
        guests_can_invite_others: event.guests_can_invite_others,
        guests_can_modify: event.guests_can_modify,
        locked: event.locked,
    })
}

/// Converts a domain event into a wire event with times pinned to `tz`.
pub fn from_calendar_event(event: &CalendarEvent, tz: Tz) -> GoogleEvent {
    let at = |instant: DateTime<Utc>| GoogleDateTime {
        date_time: Some(instant),
        time_zone: Some(tz.name().to_string()),
        ..Default::default()
    };
    GoogleEvent {
        id: event.id.clone(),
        summary: Some(event.summary.clone()),
        description: Some(event.description.clone()),
        start: at(event.start_time),
        end: at(event.end_time),
        attendees: Vec::new(),
        status: Some(event.status),
        visibility: Some(event.visibility),
        anyone_can_add_self: event.anyone_can_add_self,
        guests_can_invite_others: event.guests_can_invite_others,
        guests_can_modify: event.guests_can_modify,
        locked: event.locked,
        extra: Map::new(),
    }
    .with_attendees(&event.attendees)
}

impl GoogleEvent {
    /// Replaces the attendee list, keeping unknown fields of attendees that remain.
    pub fn with_attendees(mut self, attendees: &[Attendee]) -> Self {
        self.merge_attendees(attendees);
        self
    }

    pub fn merge_attendees(&mut self, attendees: &[Attendee]) {
        let previous = std::mem::take(&mut self.attendees);
        self.attendees = attendees
            .iter()
            .map(|attendee| {
                let extra = previous
                    .iter()
                    .find(|p| p.email.eq_ignore_ascii_case(&attendee.email))
                    .map(|p| p.extra.clone())
                    .unwrap_or_default();
                GoogleAttendee {
                    email: attendee.email.clone(),
                    display_name: attendee.display_name.clone(),
                    response_status: attendee.response_status,
                    extra,
                }
            })
            .collect();
    }
}
