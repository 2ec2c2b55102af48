//! Calendar materialization
//!
//! Turns approved and completed tour requests into display events. Nothing
//! here is persisted; the calendar is rebuilt from the requests on demand.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::tour_request::{TimeSlot, TourRequestDetails, TourRequestStatus};

const UNKNOWN_PROPERTY: &str = "Unknown Property";
const UNKNOWN_CLIENT: &str = "Unknown Client";

const APPROVED_BACKGROUND: &str = "#10b981";
const APPROVED_BORDER: &str = "#059669";
const COMPLETED_BACKGROUND: &str = "#3b82f6";
const COMPLETED_BORDER: &str = "#2563eb";
const TEXT_COLOR: &str = "#ffffff";

/// Extra data the calendar widget shows in the tour details popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEventProps {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: TourRequestStatus,
    pub property_address: String,
    pub client_name: String,
    pub request_id: String,
}

/// One time block on the agent's calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub text_color: &'static str,
    pub extended_props: CalendarEventProps,
}

/// Start and end hour for a slot. Absent or unrecognized slots get 10–11.
pub fn slot_hours(slot: Option<TimeSlot>) -> (u32, u32) {
    match slot {
        Some(TimeSlot::Morning) => (9, 10),
        Some(TimeSlot::Afternoon) => (14, 15),
        Some(TimeSlot::Evening) => (17, 18),
        None => (10, 11),
    }
}

fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// Event window: slot hours on the requested date, or a one-hour block
/// starting at `now` when the request has no date.
pub fn event_window(
    requested_date: Option<NaiveDate>,
    slot: Option<TimeSlot>,
    now: NaiveDateTime,
) -> (NaiveDateTime, NaiveDateTime) {
    match requested_date {
        Some(date) => {
            let (start, end) = slot_hours(slot);
            (at_hour(date, start), at_hour(date, end))
        }
        None => (now, now + Duration::hours(1)),
    }
}

/// Map a single request to a calendar event.
///
/// Returns `None` for requests that are not approved or completed.
pub fn to_calendar_event(details: &TourRequestDetails, now: NaiveDateTime) -> Option<CalendarEvent> {
    let request = &details.request;
    if !request.status.is_scheduled() {
        return None;
    }

    let property_address = details
        .property
        .as_ref()
        .map(|p| p.address.clone())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| UNKNOWN_PROPERTY.to_string());
    let client_name = details
        .user
        .as_ref()
        .and_then(|u| u.full_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    let (start, end) = event_window(request.requested_date, request.time_slot(), now);

    let (background_color, border_color) = match request.status {
        TourRequestStatus::Completed => (COMPLETED_BACKGROUND, COMPLETED_BORDER),
        _ => (APPROVED_BACKGROUND, APPROVED_BORDER),
    };

    Some(CalendarEvent {
        id: request.id.clone(),
        title: format!("Tour: {}", property_address),
        start,
        end,
        background_color,
        border_color,
        text_color: TEXT_COLOR,
        extended_props: CalendarEventProps {
            kind: "tour",
            status: request.status,
            property_address,
            client_name,
            request_id: request.id.clone(),
        },
    })
}

/// Materialize the calendar for a list of requests, ordered by requested
/// date with undated requests last.
pub fn materialize(requests: &[TourRequestDetails], now: NaiveDateTime) -> Vec<CalendarEvent> {
    let mut scheduled: Vec<&TourRequestDetails> = requests
        .iter()
        .filter(|d| d.request.status.is_scheduled())
        .collect();
    scheduled.sort_by_key(|d| (d.request.requested_date.is_none(), d.request.requested_date));

    scheduled
        .into_iter()
        .filter_map(|d| to_calendar_event(d, now))
        .collect()
}
