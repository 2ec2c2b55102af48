//! Analytics DTOs

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::analytics::{ConversionMetrics, PropertyPerformance, StatusShare, TrendPoint};

/// One slice of the status pie chart
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusShareDto {
    /// Capitalized label, e.g. "Pending"
    pub status: String,
    pub count: u64,
    pub percentage: f64,
    /// Hex color
    pub color: String,
}

impl From<StatusShare> for StatusShareDto {
    fn from(s: StatusShare) -> Self {
        Self {
            status: s.label,
            count: s.count,
            percentage: s.percentage,
            color: s.color.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrendPointDto {
    pub date: NaiveDate,
    pub count: u64,
    /// e.g. "Jan 15"
    pub display_date: String,
}

impl From<TrendPoint> for TrendPointDto {
    fn from(p: TrendPoint) -> Self {
        Self {
            date: p.date,
            count: p.count,
            display_date: p.display_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertyPerformanceDto {
    pub property_id: String,
    pub property_address: String,
    pub tour_requests: u64,
    pub views: u64,
}

impl From<PropertyPerformance> for PropertyPerformanceDto {
    fn from(p: PropertyPerformance) -> Self {
        Self {
            property_id: p.property_id,
            property_address: p.property_address,
            tour_requests: p.tour_requests,
            views: p.views,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversionMetricsDto {
    pub total_views: u64,
    pub total_tour_requests: u64,
    pub completed_tours: u64,
    pub conversion_rate: f64,
    pub completion_rate: f64,
}

impl From<ConversionMetrics> for ConversionMetricsDto {
    fn from(m: ConversionMetrics) -> Self {
        Self {
            total_views: m.total_views,
            total_tour_requests: m.total_tour_requests,
            completed_tours: m.completed_tours,
            conversion_rate: m.conversion_rate,
            completion_rate: m.completion_rate,
        }
    }
}
