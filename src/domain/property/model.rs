//! Property domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A listed property. Owned by the listing agent, referenced by tour requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub listing_agent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(address: impl Into<String>, listing_agent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            address: address.into(),
            city: None,
            state: None,
            zip_code: None,
            listing_agent_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_locality(
        mut self,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        self.city = Some(city.into());
        self.state = Some(state.into());
        self.zip_code = Some(zip_code.into());
        self
    }

    /// `"address, city, state zip"`, skipping whatever is missing.
    pub fn full_address(&self) -> String {
        let region = [self.state.as_deref(), self.zip_code.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        [Some(self.address.as_str()), self.city.as_deref(), Some(region.as_str())]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
