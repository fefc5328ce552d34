use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MAX_PINNED: u64 = 6;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum GalleryCategory {
    #[sea_orm(string_value = "festivals")]
    Festivals,
    #[sea_orm(string_value = "mandir")]
    Mandir,
    #[sea_orm(string_value = "events")]
    Events,
    #[sea_orm(string_value = "daily")]
    Daily,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "gallery_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: GalleryCategory,
    pub images: Json,
    pub is_public: bool,
    pub is_pinned: bool,
    pub event_id: Option<i64>,
    pub uploaded_by: i64,
    pub date: DateTime<Utc>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.date.is_not_set() {
                self.date = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
