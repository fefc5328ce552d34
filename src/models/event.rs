use crate::entities::{EventCategory, EventStatus, event_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ImageRef, UserRef, images_from_json};

pub const MIN_TARGET_AMOUNT: i64 = 1000;
pub const DEFAULT_EVENT_LOCATION: &str = "Main Temple Complex";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub target_amount: i64,
    pub raised_amount: i64,
    pub images: Vec<ImageRef>,
    pub status: EventStatus,
    pub priority: i32,
    pub is_main_event: bool,
    pub event_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub category: EventCategory,
    pub donation_count: i64,
    pub created_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserRef>,
    pub progress_percentage: f64,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<event_entity::Model> for EventResponse {
    fn from(m: event_entity::Model) -> Self {
        let progress_percentage = m.progress_percentage();
        let is_completed = m.is_completed();
        Self {
            id: m.id,
            images: images_from_json(&m.images),
            title: m.title,
            slug: m.slug,
            description: m.description,
            target_amount: m.target_amount,
            raised_amount: m.raised_amount,
            status: m.status,
            priority: m.priority,
            is_main_event: m.is_main_event,
            event_date: m.event_date,
            end_date: m.end_date,
            location: m.location,
            category: m.category,
            donation_count: m.donation_count,
            created_by: m.created_by,
            creator: None,
            progress_percentage,
            is_completed,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicEventsResponse {
    pub main_event: Option<EventResponse>,
    pub other_events: Vec<EventResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentDonation {
    pub id: i64,
    pub donor_name: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub recent_donations: Vec<RecentDonation>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminEventQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Writable event fields. `None` leaves a field untouched on update;
/// for the nullable dates `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<i64>,
    pub status: Option<EventStatus>,
    pub priority: Option<i32>,
    pub is_main_event: Option<bool>,
    pub event_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub location: Option<String>,
    pub category: Option<EventCategory>,
    pub images: Option<Vec<ImageRef>>,
}
