//! Calendar feed for the agent dashboard

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use super::TourRequestService;
use crate::domain::calendar::{materialize, CalendarEvent};
use crate::domain::DomainResult;

pub struct CalendarService {
    tours: Arc<TourRequestService>,
}

impl CalendarService {
    pub fn new(tours: Arc<TourRequestService>) -> Self {
        Self { tours }
    }

    /// Approved and completed tours of an agent as calendar events.
    ///
    /// Slot windows are local wall-clock hours, so undated tours are anchored
    /// at local now as well.
    pub async fn events_for_agent(&self, agent_id: &str) -> DomainResult<Vec<CalendarEvent>> {
        self.events_for_agent_at(agent_id, Local::now().naive_local()).await
    }

    /// Same as [`Self::events_for_agent`] with an explicit clock for
    /// undated tours.
    pub async fn events_for_agent_at(
        &self,
        agent_id: &str,
        now: NaiveDateTime,
    ) -> DomainResult<Vec<CalendarEvent>> {
        let scheduled = self.tours.scheduled_for_agent(agent_id).await?;
        Ok(materialize(&scheduled, now))
    }
}
