use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::null_to_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EventAttendee {
    #[serde(default, deserialize_with = "null_to_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub status: String,
}

/// A calendar event as normalized by the calendar collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalendarEvent {
    #[serde(default, deserialize_with = "null_to_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub end: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub location: String,
    #[serde(rename = "htmlLink", default, deserialize_with = "null_to_default")]
    pub html_link: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub attendees: Vec<EventAttendee>,
    #[serde(rename = "meetLink", default, skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
}

/// Scheduling form as the user filled it in: local date-times and a
/// comma-separated attendee list.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct NewEventForm {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attendees: String,
    #[serde(default)]
    pub location: String,
}

/// Event creation request as transmitted; times are absolute UTC instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewEvent {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub attendees: Vec<String>,
    pub location: String,
}

#[derive(Debug, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalendarEventsResponse {
    #[serde(default, deserialize_with = "null_to_default")]
    pub events: Vec<CalendarEvent>,
}

/// Query parameters for listing events
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
pub struct ListEventsRequest {
    pub max_results: Option<u32>,
}

/// Calendar panel contents; `NotConnected` means show the connect affordance.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "state", content = "events", rename_all = "snake_case")]
pub enum CalendarView {
    NotConnected,
    Events(Vec<CalendarEvent>),
}
