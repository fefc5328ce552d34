use sea_orm::prelude::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored image reference. `url` is a `data:` URI for uploaded files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// Reads the JSON `images` column; anything malformed reads as no images.
pub fn images_from_json(value: &Json) -> Vec<ImageRef> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

pub fn images_to_json(images: &[ImageRef]) -> Json {
    serde_json::to_value(images).unwrap_or_else(|_| Json::Array(Vec::new()))
}

/// Minimal event projection embedded in donation and gallery payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminNotesRequest {
    pub notes: Option<String>,
}
