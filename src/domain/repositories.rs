//! Repository traits for the domain layer

use super::profile::ProfileRepository;
use super::property::PropertyRepository;
use super::tour_request::TourRequestRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let request = repos.tour_requests().find_by_id("...").await?;
///     let property = repos.properties().find_by_id(&request.property_id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn tour_requests(&self) -> &dyn TourRequestRepository;
    fn properties(&self) -> &dyn PropertyRepository;
    fn profiles(&self) -> &dyn ProfileRepository;
}
