use crate::entities::{
    EventStatus, PaymentStatus, donation_entity as donations, event_entity as events,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    DailyTrend, DonationStats, EventAnalyticsResponse, OverviewResponse, OverviewStats,
    RecentDonationSummary, TopEvent,
};
use crate::services::lookups::event_refs;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use std::collections::{BTreeMap, HashMap};

const DEFAULT_PERIOD: &str = "30d";
const RECENT_DONATIONS: u64 = 10;
const TOP_EVENTS: usize = 5;

/// Maps a period name to its look-back window. Unknown names mean all time.
pub fn period_window(period: &str) -> Option<Duration> {
    match period {
        "7d" => Some(Duration::days(7)),
        "30d" => Some(Duration::days(30)),
        "90d" => Some(Duration::days(90)),
        "1y" => Some(Duration::days(365)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonationPoint {
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub event_id: Option<i64>,
}

pub fn summarize(points: &[DonationPoint]) -> DonationStats {
    let total_donations = points.len() as u64;
    let total_amount: i64 = points.iter().map(|p| p.amount).sum();
    let average_amount = if total_donations == 0 {
        0.0
    } else {
        total_amount as f64 / total_donations as f64
    };
    DonationStats {
        total_donations,
        total_amount,
        average_amount,
    }
}

/// Per UTC day, ascending.
pub fn daily_trends(points: &[DonationPoint]) -> Vec<DailyTrend> {
    let mut days: BTreeMap<String, (u64, i64)> = BTreeMap::new();
    for point in points {
        let entry = days
            .entry(point.created_at.format("%Y-%m-%d").to_string())
            .or_default();
        entry.0 += 1;
        entry.1 += point.amount;
    }
    days.into_iter()
        .map(|(date, (count, amount))| DailyTrend {
            date,
            count,
            amount,
        })
        .collect()
}

/// `(event_id, count, amount)` for the `limit` best-funded events that pass
/// `exists`, ties broken by id.
pub fn top_event_totals(
    points: &[DonationPoint],
    limit: usize,
    exists: impl Fn(i64) -> bool,
) -> Vec<(i64, u64, i64)> {
    let mut totals: HashMap<i64, (u64, i64)> = HashMap::new();
    for point in points {
        if let Some(event_id) = point.event_id.filter(|&id| exists(id)) {
            let entry = totals.entry(event_id).or_default();
            entry.0 += 1;
            entry.1 += point.amount;
        }
    }
    let mut totals: Vec<(i64, u64, i64)> = totals
        .into_iter()
        .map(|(id, (count, amount))| (id, count, amount))
        .collect();
    totals.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
    totals.truncate(limit);
    totals
}

fn counted_donations() -> Select<donations::Entity> {
    donations::Entity::find()
        .filter(donations::Column::PaymentStatus.eq(PaymentStatus::Success))
        .filter(donations::Column::IsApproved.eq(true))
}

#[derive(Clone)]
pub struct AnalyticsService {
    pool: DatabaseConnection,
}

impl AnalyticsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn points(&self, select: Select<donations::Entity>) -> AppResult<Vec<DonationPoint>> {
        let rows: Vec<(i64, DateTime<Utc>, Option<i64>)> = select
            .select_only()
            .column(donations::Column::Amount)
            .column(donations::Column::CreatedAt)
            .column(donations::Column::EventId)
            .order_by_asc(donations::Column::CreatedAt)
            .into_tuple()
            .all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(amount, created_at, event_id)| DonationPoint {
                amount,
                created_at,
                event_id,
            })
            .collect())
    }

    pub async fn overview(&self, period: Option<&str>) -> AppResult<OverviewResponse> {
        let period = period
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PERIOD)
            .to_string();

        let mut window = counted_donations();
        if let Some(look_back) = period_window(&period) {
            window = window.filter(donations::Column::CreatedAt.gte(Utc::now() - look_back));
        }
        let points = self.points(window).await?;

        let pending_approvals = donations::Entity::find()
            .filter(donations::Column::PaymentStatus.eq(PaymentStatus::Success))
            .filter(donations::Column::IsApproved.eq(false))
            .count(&self.pool)
            .await?;
        let active_events = events::Entity::find()
            .filter(events::Column::Status.eq(EventStatus::Active))
            .count(&self.pool)
            .await?;

        let recent = donations::Entity::find()
            .filter(donations::Column::PaymentStatus.eq(PaymentStatus::Success))
            .order_by_desc(donations::Column::CreatedAt)
            .order_by_desc(donations::Column::Id)
            .limit(RECENT_DONATIONS)
            .all(&self.pool)
            .await?;

        let event_ids = recent
            .iter()
            .map(|d| d.event_id)
            .chain(points.iter().map(|p| p.event_id));
        let event_lookup = event_refs(&self.pool, event_ids.collect::<Vec<_>>(), true).await?;
        // Events deleted since the donation was made drop out before ranking.
        let top = top_event_totals(&points, TOP_EVENTS, |id| event_lookup.contains_key(&id));

        let recent_donations = recent
            .into_iter()
            .map(|d| RecentDonationSummary {
                id: d.id,
                event: d.event_id.and_then(|id| event_lookup.get(&id).cloned()),
                donor_name: d.donor_name,
                amount: d.amount,
                created_at: d.created_at,
                event_id: d.event_id,
                is_approved: d.is_approved,
            })
            .collect();

        let top_events = top
            .into_iter()
            .filter_map(|(event_id, donation_count, total_amount)| {
                let event = event_lookup.get(&event_id)?;
                Some(TopEvent {
                    event_id,
                    title: event.title.clone(),
                    slug: event.slug.clone().unwrap_or_default(),
                    donation_count,
                    total_amount,
                })
            })
            .collect();

        Ok(OverviewResponse {
            overview: OverviewStats {
                stats: summarize(&points),
                pending_approvals,
                active_events,
            },
            recent_donations,
            daily_trends: daily_trends(&points),
            top_events,
            period,
        })
    }

    pub async fn event(&self, event_id: i64) -> AppResult<EventAnalyticsResponse> {
        let event = events::Entity::find_by_id(event_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let points = self
            .points(counted_donations().filter(donations::Column::EventId.eq(event_id)))
            .await?;

        Ok(EventAnalyticsResponse {
            event: event.into(),
            stats: summarize(&points),
            daily_progress: daily_trends(&points),
        })
    }
}
