use crate::entities::{GalleryCategory, gallery_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventRef, ImageRef, UserRef, images_from_json};

pub const DEFAULT_GALLERY_LOCATION: &str = "Temple Complex";
pub const MAX_GALLERY_DESCRIPTION: usize = 500;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: GalleryCategory,
    pub images: Vec<ImageRef>,
    pub is_public: bool,
    pub is_pinned: bool,
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventRef>,
    pub uploaded_by: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<UserRef>,
    pub date: DateTime<Utc>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<gallery_entity::Model> for GalleryResponse {
    fn from(m: gallery_entity::Model) -> Self {
        Self {
            id: m.id,
            images: images_from_json(&m.images),
            title: m.title,
            description: m.description,
            category: m.category,
            is_public: m.is_public,
            is_pinned: m.is_pinned,
            event_id: m.event_id,
            event: None,
            uploaded_by: m.uploaded_by,
            uploader: None,
            date: m.date,
            location: m.location,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Writable gallery fields; same `None` semantics as event input.
#[derive(Debug, Clone, Default)]
pub struct GalleryInput {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<GalleryCategory>,
    pub is_public: Option<bool>,
    pub event_id: Option<Option<i64>>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub images: Option<Vec<ImageRef>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PinToggleResponse {
    pub id: i64,
    pub is_pinned: bool,
}
