//! Calendar DTOs, shaped for the dashboard calendar widget (camelCase)

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::calendar::{CalendarEvent, CalendarEventProps};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPropsDto {
    /// Always "tour"
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub property_address: String,
    pub client_name: String,
    pub request_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventDto {
    pub id: String,
    pub title: String,
    /// Local time, no offset
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub background_color: String,
    pub border_color: String,
    pub text_color: String,
    pub extended_props: CalendarEventPropsDto,
}

impl From<CalendarEventProps> for CalendarEventPropsDto {
    fn from(p: CalendarEventProps) -> Self {
        Self {
            kind: p.kind.to_string(),
            status: p.status.as_str().to_string(),
            property_address: p.property_address,
            client_name: p.client_name,
            request_id: p.request_id,
        }
    }
}

impl From<CalendarEvent> for CalendarEventDto {
    fn from(e: CalendarEvent) -> Self {
        Self {
            id: e.id,
            title: e.title,
            start: e.start,
            end: e.end,
            background_color: e.background_color.to_string(),
            border_color: e.border_color.to_string(),
            text_color: e.text_color.to_string(),
            extended_props: e.extended_props.into(),
        }
    }
}
