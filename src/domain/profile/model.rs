//! Profile domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a requester or an agent.
///
/// `id` matches the `sub` claim of tokens issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub is_agent: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: impl Into<String>, full_name: Option<String>, is_agent: bool) -> Self {
        Self {
            id: id.into(),
            full_name,
            email: None,
            is_agent,
            created_at: Utc::now(),
        }
    }
}
