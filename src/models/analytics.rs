use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventRef, EventResponse};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyticsQuery {
    /// `7d`, `30d` (default), `90d`, `1y`; anything else means all time.
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationStats {
    pub total_donations: u64,
    pub total_amount: i64,
    pub average_amount: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    #[serde(flatten)]
    pub stats: DonationStats,
    pub pending_approvals: u64,
    pub active_events: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    /// UTC day, `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopEvent {
    pub event_id: i64,
    pub title: String,
    pub slug: String,
    pub donation_count: u64,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentDonationSummary {
    pub id: i64,
    pub donor_name: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventRef>,
    pub is_approved: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub overview: OverviewStats,
    pub recent_donations: Vec<RecentDonationSummary>,
    pub daily_trends: Vec<DailyTrend>,
    pub top_events: Vec<TopEvent>,
    pub period: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventAnalyticsResponse {
    pub event: EventResponse,
    pub stats: DonationStats,
    pub daily_progress: Vec<DailyTrend>,
}
