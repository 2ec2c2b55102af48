//! Dashboard charts

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::analytics::{
    conversion_metrics, property_performance, requests_trend, status_distribution,
    ConversionMetrics, PropertyPerformance, StatusShare, TrendPoint,
};
use crate::domain::{DomainResult, RepositoryProvider};

/// Longest trend window the dashboard may ask for
pub const MAX_TREND_DAYS: u32 = 365;

pub struct AnalyticsService {
    repos: Arc<dyn RepositoryProvider>,
}

impl AnalyticsService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn status_distribution(&self, agent_id: &str) -> DomainResult<Vec<StatusShare>> {
        let requests = self.repos.tour_requests().find_for_agent(agent_id).await?;
        Ok(status_distribution(&requests))
    }

    /// Daily request counts for the last `days` days (clamped to 1..=365)
    pub async fn trend(&self, agent_id: &str, days: u32) -> DomainResult<Vec<TrendPoint>> {
        let days = days.clamp(1, MAX_TREND_DAYS);
        let today = Utc::now().date_naive();
        let since = (today - Duration::days(i64::from(days - 1)))
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);

        let requests = self
            .repos
            .tour_requests()
            .find_for_agent_since(agent_id, since)
            .await?;
        Ok(requests_trend(&requests, days, today))
    }

    pub async fn property_performance(&self, agent_id: &str) -> DomainResult<Vec<PropertyPerformance>> {
        let properties = self.repos.properties().find_by_agent(agent_id).await?;
        let requests = self.repos.tour_requests().find_for_agent(agent_id).await?;
        Ok(property_performance(&properties, &requests))
    }

    pub async fn conversion(&self, agent_id: &str) -> DomainResult<ConversionMetrics> {
        let requests = self.repos.tour_requests().find_for_agent(agent_id).await?;
        Ok(conversion_metrics(&requests))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Property, TourRequest, TourRequestStatus};
    use crate::infrastructure::InMemoryRepositoryProvider;

    async fn seeded() -> AnalyticsService {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let busy = Property::new("1 Busy Rd", Some("agent-1".into()));
        let quiet = Property::new("2 Quiet Ln", Some("agent-1".into()));
        let busy_id = busy.id.clone();
        repos.properties().save(busy).await.unwrap();
        repos.properties().save(quiet).await.unwrap();

        for i in 0..3 {
            let mut r = TourRequest::new("user-1", busy_id.as_str(), "agent-1", None, None, None, None);
            if i == 0 {
                r.approve(None, None, Utc::now()).unwrap();
                r.mark_completed(Utc::now()).unwrap();
            }
            repos.tour_requests().save(r).await.unwrap();
        }
        repos
            .tour_requests()
            .save(TourRequest::new("user-1", busy_id.as_str(), "agent-2", None, None, None, None))
            .await
            .unwrap();

        AnalyticsService::new(repos)
    }

    #[tokio::test]
    async fn distribution_is_scoped_to_agent() {
        let service = seeded().await;
        let shares = service.status_distribution("agent-1").await.unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].status, TourRequestStatus::Pending);
        assert_eq!(shares[0].count, 2);
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn trend_counts_today() {
        let service = seeded().await;
        let trend = service.trend("agent-1", 7).await.unwrap();
        assert_eq!(trend.len(), 7);
        assert_eq!(trend.last().unwrap().count, 3);
        assert_eq!(trend.iter().map(|p| p.count).sum::<u64>(), 3);
    }

    #[tokio::test]
    async fn zero_day_trend_is_clamped() {
        let service = seeded().await;
        assert_eq!(service.trend("agent-1", 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn performance_and_conversion() {
        let service = seeded().await;
        let perf = service.property_performance("agent-1").await.unwrap();
        assert_eq!(perf[0].property_address, "1 Busy Rd");
        assert_eq!(perf[0].tour_requests, 3);
        assert_eq!(perf[1].tour_requests, 0);

        let conversion = service.conversion("agent-1").await.unwrap();
        assert_eq!(conversion.total_tour_requests, 3);
        assert_eq!(conversion.completed_tours, 1);
        assert!((conversion.completion_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(conversion.conversion_rate, 0.0);
    }
}
