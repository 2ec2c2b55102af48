use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Tour request cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity,
            field: "id",
            value: id.into(),
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Storage(format!("Database error: {}", e))
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {0}")]
    UpstreamStatus(u16),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let e = DomainError::not_found("TourRequest", "abc");
        assert_eq!(e.to_string(), "Not found: TourRequest with id=abc");
    }

    #[test]
    fn invalid_transition_message() {
        let e = DomainError::InvalidTransition {
            from: "denied".into(),
            to: "approved".into(),
        };
        assert_eq!(
            e.to_string(),
            "Tour request cannot move from denied to approved"
        );
    }

    #[test]
    fn db_errors_become_storage_errors() {
        let e: DomainError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(matches!(e, DomainError::Storage(ref m) if m.contains("boom")));
    }
}
