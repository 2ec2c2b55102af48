//! Dashboard filtering and aggregation over already-fetched tour requests.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::property::Property;
use super::tour_request::{TourRequest, TourRequestStatus};

/// How many properties the performance chart shows.
pub const TOP_PROPERTIES: usize = 10;

/// Status tab selected on the tour requests list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TourRequestStatus),
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        TourRequestStatus::parse(&s.trim().to_ascii_lowercase()).map(Self::Only)
    }

    pub fn matches(&self, status: TourRequestStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

pub fn filter_by_status(requests: Vec<TourRequest>, filter: StatusFilter) -> Vec<TourRequest> {
    requests
        .into_iter()
        .filter(|r| filter.matches(r.status))
        .collect()
}

/// Per-status totals for the badges on the list tabs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub denied: u64,
    pub cancelled: u64,
    pub expired: u64,
    pub completed: u64,
}

impl StatusCounts {
    pub fn get(&self, status: TourRequestStatus) -> u64 {
        match status {
            TourRequestStatus::Pending => self.pending,
            TourRequestStatus::Approved => self.approved,
            TourRequestStatus::Denied => self.denied,
            TourRequestStatus::Cancelled => self.cancelled,
            TourRequestStatus::Expired => self.expired,
            TourRequestStatus::Completed => self.completed,
        }
    }

    fn slot(&mut self, status: TourRequestStatus) -> &mut u64 {
        match status {
            TourRequestStatus::Pending => &mut self.pending,
            TourRequestStatus::Approved => &mut self.approved,
            TourRequestStatus::Denied => &mut self.denied,
            TourRequestStatus::Cancelled => &mut self.cancelled,
            TourRequestStatus::Expired => &mut self.expired,
            TourRequestStatus::Completed => &mut self.completed,
        }
    }

    pub fn add(&mut self, status: TourRequestStatus, n: u64) {
        *self.slot(status) += n;
    }

    pub fn total(&self) -> u64 {
        TourRequestStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

pub fn count_by_status(requests: &[TourRequest]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for r in requests {
        counts.add(r.status, 1);
    }
    counts
}

/// Chart color for a status
pub fn status_color(status: TourRequestStatus) -> &'static str {
    match status {
        TourRequestStatus::Pending => "#f59e0b",
        TourRequestStatus::Approved => "#10b981",
        TourRequestStatus::Denied => "#ef4444",
        TourRequestStatus::Cancelled => "#6b7280",
        TourRequestStatus::Completed => "#3b82f6",
        TourRequestStatus::Expired => "#9ca3af",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One slice of the status pie chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: TourRequestStatus,
    pub label: String,
    pub count: u64,
    pub percentage: f64,
    pub color: &'static str,
}

/// Slices for every status that occurs, largest first. Ties keep the
/// lifecycle order of [`TourRequestStatus::ALL`].
pub fn distribution_from_counts(counts: &StatusCounts) -> Vec<StatusShare> {
    let total = counts.total();
    let mut shares: Vec<StatusShare> = TourRequestStatus::ALL
        .iter()
        .filter(|s| counts.get(**s) > 0)
        .map(|&status| {
            let count = counts.get(status);
            StatusShare {
                status,
                label: capitalize(status.as_str()),
                count,
                percentage: if total > 0 {
                    count as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
                color: status_color(status),
            }
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

pub fn status_distribution(requests: &[TourRequest]) -> Vec<StatusShare> {
    distribution_from_counts(&count_by_status(requests))
}

/// Requests created on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: u64,
    /// Short label for the chart axis, e.g. "Jan 15"
    pub display_date: String,
}

/// Daily request counts for the `days` days ending at `today`, oldest first.
/// Days without requests are present with a zero count.
pub fn requests_trend(requests: &[TourRequest], days: u32, today: NaiveDate) -> Vec<TrendPoint> {
    let first = today - Duration::days(i64::from(days.saturating_sub(1)));
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for r in requests {
        let day = r.created_at.date_naive();
        if day >= first && day <= today {
            *per_day.entry(day).or_default() += 1;
        }
    }

    (0..days)
        .map(|offset| {
            let date = first + Duration::days(i64::from(offset));
            TrendPoint {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
                display_date: date.format("%b %-d").to_string(),
            }
        })
        .collect()
}

/// Tour interest per listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyPerformance {
    pub property_id: String,
    pub property_address: String,
    pub tour_requests: u64,
    /// Listing views are not tracked yet
    pub views: u64,
}

/// Most requested listings first, at most [`TOP_PROPERTIES`].
pub fn property_performance(
    properties: &[Property],
    requests: &[TourRequest],
) -> Vec<PropertyPerformance> {
    let mut per_property: HashMap<&str, u64> = HashMap::new();
    for r in requests {
        *per_property.entry(r.property_id.as_str()).or_default() += 1;
    }

    let mut rows: Vec<PropertyPerformance> = properties
        .iter()
        .map(|p| PropertyPerformance {
            property_id: p.id.clone(),
            property_address: p.full_address(),
            tour_requests: per_property.get(p.id.as_str()).copied().unwrap_or(0),
            views: 0,
        })
        .collect();
    rows.sort_by(|a, b| b.tour_requests.cmp(&a.tour_requests));
    rows.truncate(TOP_PROPERTIES);
    rows
}

/// Funnel from listing views to completed tours
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionMetrics {
    pub total_views: u64,
    pub total_tour_requests: u64,
    pub completed_tours: u64,
    /// Tour requests / views, in percent
    pub conversion_rate: f64,
    /// Completed / tour requests, in percent
    pub completion_rate: f64,
}

pub fn conversion_metrics(requests: &[TourRequest]) -> ConversionMetrics {
    let total_views = 0u64;
    let total_tour_requests = requests.len() as u64;
    let completed_tours = requests
        .iter()
        .filter(|r| r.status == TourRequestStatus::Completed)
        .count() as u64;

    let rate = |part: u64, whole: u64| {
        if whole > 0 {
            part as f64 / whole as f64 * 100.0
        } else {
            0.0
        }
    };

    ConversionMetrics {
        total_views,
        total_tour_requests,
        completed_tours,
        conversion_rate: rate(total_tour_requests, total_views),
        completion_rate: rate(completed_tours, total_tour_requests),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn with_status(status: TourRequestStatus) -> TourRequest {
        let mut r = TourRequest::new("u1", "p1", "a1", None, None, None, None);
        r.status = status;
        r
    }

    fn sample() -> Vec<TourRequest> {
        use TourRequestStatus::*;
        [Pending, Pending, Approved, Denied, Cancelled, Pending]
            .into_iter()
            .map(with_status)
            .collect()
    }

    #[test]
    fn filter_all_returns_everything() {
        let list = sample();
        let filtered = filter_by_status(list.clone(), StatusFilter::All);
        assert_eq!(filtered, list);
    }

    #[test]
    fn filter_specific_status_returns_only_matches() {
        let filtered = filter_by_status(sample(), StatusFilter::Only(TourRequestStatus::Pending));
        assert_eq!(filtered.len(), 3);
        assert!(filtered.iter().all(|r| r.status == TourRequestStatus::Pending));

        let none = filter_by_status(sample(), StatusFilter::Only(TourRequestStatus::Expired));
        assert!(none.is_empty());
    }

    #[test]
    fn status_filter_parse() {
        assert_eq!(StatusFilter::parse("all"), Some(StatusFilter::All));
        assert_eq!(
            StatusFilter::parse("Denied"),
            Some(StatusFilter::Only(TourRequestStatus::Denied))
        );
        assert_eq!(StatusFilter::parse(""), None);
        assert_eq!(StatusFilter::parse("bogus"), None);
    }

    #[test]
    fn count_by_status_single_pass() {
        let counts = count_by_status(&sample());
        assert_eq!(counts.pending, 3);
        assert_eq!(counts.approved, 1);
        assert_eq!(counts.denied, 1);
        assert_eq!(counts.cancelled, 1);
        assert_eq!(counts.completed, 0);
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn distribution_percentages_sum_to_hundred() {
        let mut counts = StatusCounts::default();
        counts.add(TourRequestStatus::Pending, 3);
        counts.add(TourRequestStatus::Approved, 5);
        counts.add(TourRequestStatus::Denied, 2);

        let shares = distribution_from_counts(&counts);
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);

        for share in &shares {
            let expected = share.count as f64 / 10.0 * 100.0;
            assert!((share.percentage - expected).abs() < 1e-9);
        }
        assert_eq!(shares[0].label, "Approved");
        assert_eq!(shares[0].color, "#10b981");
        assert_eq!(shares.len(), 3);
    }

    #[test]
    fn distribution_of_nothing_is_empty() {
        assert!(status_distribution(&[]).is_empty());
    }

    #[test]
    fn trend_is_zero_filled_and_ordered() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut a = with_status(TourRequestStatus::Pending);
        a.created_at = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let mut b = a.clone();
        b.created_at = Utc.with_ymd_and_hms(2024, 1, 13, 23, 0, 0).unwrap();
        let mut old = a.clone();
        old.created_at = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();

        let trend = requests_trend(&[a.clone(), a, b, old], 3, today);
        let counts: Vec<u64> = trend.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 0, 2]);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2024, 1, 13).unwrap());
        assert_eq!(trend[2].display_date, "Jan 15");
    }

    #[test]
    fn property_performance_sorted_and_capped() {
        let properties: Vec<Property> = (0..12)
            .map(|i| Property::new(format!("{} Main St", i), Some("a1".into())))
            .collect();
        let mut requests = Vec::new();
        for _ in 0..3 {
            let mut r = with_status(TourRequestStatus::Pending);
            r.property_id = properties[5].id.clone();
            requests.push(r);
        }
        let mut r = with_status(TourRequestStatus::Approved);
        r.property_id = properties[7].id.clone();
        requests.push(r);

        let rows = property_performance(&properties, &requests);
        assert_eq!(rows.len(), TOP_PROPERTIES);
        assert_eq!(rows[0].property_id, properties[5].id);
        assert_eq!(rows[0].tour_requests, 3);
        assert_eq!(rows[1].property_address, "7 Main St");
    }

    #[test]
    fn conversion_metrics_rates() {
        let mut list = sample();
        list.push(with_status(TourRequestStatus::Completed));
        list.push(with_status(TourRequestStatus::Completed));
        let m = conversion_metrics(&list);
        assert_eq!(m.total_tour_requests, 8);
        assert_eq!(m.completed_tours, 2);
        assert!((m.completion_rate - 25.0).abs() < 1e-9);
        assert_eq!(m.conversion_rate, 0.0);

        let empty = conversion_metrics(&[]);
        assert_eq!(empty.completion_rate, 0.0);
    }
}
