use chrono::{DateTime, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use shared_types::{CalendarEvent, CalendarView, NewEvent, NewEventForm};
use std::sync::Arc;

use crate::account::AccountLink;
use crate::error::{EngagementError, Result};
use crate::gateway::{require_session, ServiceGateway, Session};

pub const DEFAULT_MAX_RESULTS: u32 = 15;

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Lists and creates events on the user's linked calendar. Local wall-clock
/// input is resolved against `timezone` (or the host zone) before anything
/// is sent.
pub struct CalendarGateway {
    gateway: Arc<dyn ServiceGateway>,
    account: AccountLink,
    timezone: Option<Tz>,
    default_max_results: u32,
}

impl CalendarGateway {
    pub fn new(gateway: Arc<dyn ServiceGateway>, account: AccountLink) -> Self {
        Self {
            gateway,
            account,
            timezone: None,
            default_max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_timezone(mut self, timezone: Option<Tz>) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_default_max_results(mut self, max_results: u32) -> Self {
        self.default_max_results = max_results.max(1);
        self
    }

    /// `NotConnected` here is a view state, not an error: the panel shows the
    /// connect affordance and no event call is made.
    pub async fn list_events(
        &self,
        session: Option<&Session>,
        max_results: Option<u32>,
    ) -> Result<CalendarView> {
        let session = require_session(session)?;
        let status = self.gateway.connection_status(session).await?;
        if !status.connected {
            return Ok(CalendarView::NotConnected);
        }

        let max_results = max_results.unwrap_or(self.default_max_results);
        let events = self.gateway.list_events(session, max_results).await?;
        Ok(CalendarView::Events(events))
    }

    pub async fn create_event(
        &self,
        session: Option<&Session>,
        form: &NewEventForm,
    ) -> Result<CalendarEvent> {
        let session = require_session(session)?;
        let event = self.prepare_event(form)?;

        self.account.require_connected(session).await?;
        let created = self.gateway.create_event(session, &event).await?;
        tracing::info!("Created calendar event '{}' at {}", created.summary, created.start);
        Ok(created)
    }

    /// Validate the form and turn it into the wire request.
    pub fn prepare_event(&self, form: &NewEventForm) -> Result<NewEvent> {
        let summary = form.summary.trim();
        if summary.is_empty() {
            return Err(EngagementError::validation("Event title is required"));
        }
        if form.start_time.trim().is_empty() {
            return Err(EngagementError::validation("Start time is required"));
        }
        if form.end_time.trim().is_empty() {
            return Err(EngagementError::validation("End time is required"));
        }

        let start = self.normalize_local_time(&form.start_time)?;
        let end = self.normalize_local_time(&form.end_time)?;
        if end < start {
            return Err(EngagementError::validation("End time must be after start time"));
        }

        Ok(NewEvent {
            summary: summary.to_string(),
            start_time: format_instant(&start),
            end_time: format_instant(&end),
            description: form.description.trim().to_string(),
            attendees: split_attendees(&form.attendees),
            location: form.location.trim().to_string(),
        })
    }

    /// Input that already carries an offset is taken as-is.
    pub fn normalize_local_time(&self, raw: &str) -> Result<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(instant.with_timezone(&Utc));
        }

        let naive = LOCAL_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .ok_or_else(|| EngagementError::validation(format!("Invalid date/time '{}'", raw)))?;

        match self.timezone {
            Some(tz) => resolve(&tz, &naive, raw),
            None => resolve(&chrono::Local, &naive, raw),
        }
    }
}

fn resolve<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime, raw: &str) -> Result<DateTime<Utc>> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(_, _) => Err(EngagementError::validation(format!(
            "'{}' is ambiguous in this time zone (clocks go back); pick another time",
            raw
        ))),
        LocalResult::None => Err(EngagementError::validation(format!(
            "'{}' does not exist in this time zone (clocks go forward); pick another time",
            raw
        ))),
    }
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ`
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Comma-separated input; entries are trimmed and blanks dropped.
pub fn split_attendees(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect()
}
