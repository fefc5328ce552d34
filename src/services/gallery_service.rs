use crate::entities::{
    GalleryCategory, event_entity as events, gallery_entity as gallery,
    gallery_items::MAX_PINNED,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    DEFAULT_GALLERY_LOCATION, GalleryInput, GalleryQuery, GalleryResponse, MAX_GALLERY_DESCRIPTION,
    PaginatedResponse, Pagination, PaginationParams, PinToggleResponse, images_to_json,
};
use crate::services::lookups::{event_refs, lower_contains, user_refs};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

const DEFAULT_PUBLIC_PAGE_SIZE: u64 = 12;
const DEFAULT_ADMIN_PAGE_SIZE: u64 = 20;

fn parse_category(raw: Option<&str>) -> AppResult<Option<GalleryCategory>> {
    match raw.map(str::trim).filter(|c| !c.is_empty() && *c != "all") {
        None => Ok(None),
        Some(c) => serde_json::from_value(serde_json::Value::String(c.to_string()))
            .map(Some)
            .map_err(|_| AppError::ValidationError(format!("Invalid category: {c}"))),
    }
}

fn validate_input(input: &GalleryInput) -> AppResult<()> {
    if input.title.as_deref().is_some_and(str::is_empty) {
        return Err(AppError::ValidationError("Title is required".to_string()));
    }
    if let Some(Some(description)) = &input.description
        && description.chars().count() > MAX_GALLERY_DESCRIPTION
    {
        return Err(AppError::ValidationError(
            "Description must be at most 500 characters".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct GalleryService {
    pool: DatabaseConnection,
}

impl GalleryService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn with_relations(
        &self,
        items: Vec<gallery::Model>,
        with_uploader: bool,
    ) -> AppResult<Vec<GalleryResponse>> {
        let events = event_refs(&self.pool, items.iter().map(|g| g.event_id), true).await?;
        let uploaders = if with_uploader {
            user_refs(&self.pool, items.iter().map(|g| Some(g.uploaded_by))).await?
        } else {
            Default::default()
        };

        Ok(items
            .into_iter()
            .map(|g| {
                let event = g.event_id.and_then(|id| events.get(&id).cloned());
                let uploader = uploaders.get(&g.uploaded_by).cloned();
                let mut item = GalleryResponse::from(g);
                item.event = event;
                item.uploader = uploader;
                item
            })
            .collect())
    }

    async fn paginate(
        &self,
        select: Select<gallery::Entity>,
        params: PaginationParams,
        with_uploader: bool,
    ) -> AppResult<PaginatedResponse<GalleryResponse>> {
        let total = select.clone().count(&self.pool).await?;
        let page = select
            .order_by_desc(gallery::Column::Date)
            .order_by_desc(gallery::Column::Id)
            .limit(params.limit)
            .offset(params.offset())
            .all(&self.pool)
            .await?;
        let items = self.with_relations(page, with_uploader).await?;
        Ok(PaginatedResponse::new(items, Pagination::new(&params, total)))
    }

    pub async fn list_public(
        &self,
        query: &GalleryQuery,
    ) -> AppResult<PaginatedResponse<GalleryResponse>> {
        let params = PaginationParams::new(query.page, query.limit, DEFAULT_PUBLIC_PAGE_SIZE);
        let mut select = gallery::Entity::find().filter(gallery::Column::IsPublic.eq(true));
        if let Some(category) = parse_category(query.category.as_deref())? {
            select = select.filter(gallery::Column::Category.eq(category));
        }
        self.paginate(select, params, false).await
    }

    pub async fn list_pinned(&self) -> AppResult<Vec<GalleryResponse>> {
        let pinned = gallery::Entity::find()
            .filter(gallery::Column::IsPublic.eq(true))
            .filter(gallery::Column::IsPinned.eq(true))
            .order_by_desc(gallery::Column::Date)
            .order_by_desc(gallery::Column::Id)
            .limit(MAX_PINNED)
            .all(&self.pool)
            .await?;
        self.with_relations(pinned, false).await
    }

    pub async fn list_admin(
        &self,
        query: &GalleryQuery,
    ) -> AppResult<PaginatedResponse<GalleryResponse>> {
        let params = PaginationParams::new(query.page, query.limit, DEFAULT_ADMIN_PAGE_SIZE);
        let mut select = gallery::Entity::find();
        if let Some(category) = parse_category(query.category.as_deref())? {
            select = select.filter(gallery::Column::Category.eq(category));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(lower_contains(gallery::Column::Title, search))
                    .add(lower_contains(gallery::Column::Description, search))
                    .add(lower_contains(gallery::Column::Location, search)),
            );
        }
        self.paginate(select, params, true).await
    }

    async fn ensure_event_exists(&self, event_id: Option<i64>) -> AppResult<()> {
        if let Some(id) = event_id {
            events::Entity::find_by_id(id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::ValidationError("Event not found".to_string()))?;
        }
        Ok(())
    }

    pub async fn create(
        &self,
        input: GalleryInput,
        uploaded_by: i64,
    ) -> AppResult<GalleryResponse> {
        validate_input(&input)?;
        let images = input.images.unwrap_or_default();
        if images.is_empty() {
            return Err(AppError::ValidationError(
                "At least one image is required".to_string(),
            ));
        }
        let (Some(title), Some(category)) = (input.title, input.category) else {
            return Err(AppError::ValidationError(
                "Title and category are required".to_string(),
            ));
        };
        let event_id = input.event_id.flatten();
        self.ensure_event_exists(event_id).await?;

        let mut item = gallery::ActiveModel {
            title: Set(title),
            description: Set(input.description.flatten().filter(|d| !d.is_empty())),
            category: Set(category),
            images: Set(images_to_json(&images)),
            is_public: Set(input.is_public.unwrap_or(true)),
            is_pinned: Set(false),
            event_id: Set(event_id),
            uploaded_by: Set(uploaded_by),
            location: Set(input
                .location
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_GALLERY_LOCATION.to_string())),
            ..Default::default()
        };
        if let Some(date) = input.date {
            item.date = Set(date);
        }
        let item = item.insert(&self.pool).await?;

        log::info!(
            "Gallery item {} created by admin {uploaded_by} with {} images",
            item.id,
            images.len()
        );
        self.single(item).await
    }

    /// Pin state is only changed through `toggle_pin`.
    pub async fn update(&self, id: i64, input: GalleryInput) -> AppResult<GalleryResponse> {
        validate_input(&input)?;
        let existing = gallery::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;
        if let Some(event_id) = input.event_id {
            self.ensure_event_exists(event_id).await?;
        }

        let mut active = existing.into_active_model();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description.filter(|d| !d.is_empty()));
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(is_public) = input.is_public {
            active.is_public = Set(is_public);
        }
        if let Some(event_id) = input.event_id {
            active.event_id = Set(event_id);
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(location) = input.location.filter(|l| !l.is_empty()) {
            active.location = Set(location);
        }
        if let Some(images) = input.images.filter(|i| !i.is_empty()) {
            active.images = Set(images_to_json(&images));
        }

        let item = active.update(&self.pool).await?;
        log::info!("Gallery item {id} updated");
        self.single(item).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = gallery::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Gallery item not found".to_string()));
        }
        log::info!("Gallery item {id} deleted");
        Ok(())
    }

    /// Flips the pin flag. The pinned count is checked inside the same transaction.
    pub async fn toggle_pin(&self, id: i64) -> AppResult<PinToggleResponse> {
        let txn = self.pool.begin().await?;
        let item = gallery::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Gallery item not found".to_string()))?;

        let pin = !item.is_pinned;
        if pin {
            let pinned = gallery::Entity::find()
                .filter(gallery::Column::IsPinned.eq(true))
                .count(&txn)
                .await?;
            if pinned >= MAX_PINNED {
                log::warn!("Pin of gallery item {id} refused: {pinned} already pinned");
                return Err(AppError::PinLimitExceeded(MAX_PINNED));
            }
        }

        let mut active = item.into_active_model();
        active.is_pinned = Set(pin);
        let item = active.update(&txn).await?;
        txn.commit().await?;

        log::info!("Gallery item {id} {}", if pin { "pinned" } else { "unpinned" });
        Ok(PinToggleResponse {
            id: item.id,
            is_pinned: item.is_pinned,
        })
    }

    async fn single(&self, item: gallery::Model) -> AppResult<GalleryResponse> {
        let mut items = self.with_relations(vec![item], true).await?;
        items
            .pop()
            .ok_or_else(|| AppError::InternalError("gallery item vanished".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EventStatus, UserRole};
    use crate::models::ImageRef;
    use crate::test_utils::{create_test_event, create_test_user, setup_test_db};

    fn image(name: &str) -> ImageRef {
        ImageRef {
            url: "data:image/jpeg;base64,AAAA".to_string(),
            alt: name.to_string(),
        }
    }

    fn input(title: &str, category: GalleryCategory) -> GalleryInput {
        GalleryInput {
            title: Some(title.to_string()),
            category: Some(category),
            images: Some(vec![image("aarti.jpg")]),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn test_create_requires_images_and_defaults() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "pujari", UserRole::Admin).await;
        let svc = GalleryService::new(db);

        let mut no_images = input("Aarti", GalleryCategory::Daily);
        no_images.images = Some(Vec::new());
        assert!(matches!(
            svc.create(no_images, admin.id).await,
            Err(AppError::ValidationError(_))
        ));

        let item = svc
            .create(input("Aarti", GalleryCategory::Daily), admin.id)
            .await
            .unwrap();
        assert!(item.is_public);
        assert!(!item.is_pinned);
        assert_eq!(item.location, DEFAULT_GALLERY_LOCATION);
        assert_eq!(item.uploaded_by, admin.id);
        assert_eq!(item.uploader.unwrap().username, "pujari");
    }

    #[actix_web::test]
    async fn test_seventh_pin_is_refused() {
        let db = setup_test_db().await;
        let svc = GalleryService::new(db);

        let mut ids = Vec::new();
        for i in 0..7 {
            let item = svc
                .create(input(&format!("Photo {i}"), GalleryCategory::Mandir), 1)
                .await
                .unwrap();
            ids.push(item.id);
        }
        for id in &ids[..6] {
            assert!(svc.toggle_pin(*id).await.unwrap().is_pinned);
        }
        assert!(matches!(
            svc.toggle_pin(ids[6]).await,
            Err(AppError::PinLimitExceeded(6))
        ));

        // Unpinning is always allowed and frees a slot.
        assert!(!svc.toggle_pin(ids[0]).await.unwrap().is_pinned);
        assert!(svc.toggle_pin(ids[6]).await.unwrap().is_pinned);
        assert_eq!(svc.list_pinned().await.unwrap().len(), 6);
    }

    #[actix_web::test]
    async fn test_update_keeps_pin_and_images_without_upload() {
        let db = setup_test_db().await;
        let svc = GalleryService::new(db);
        let item = svc
            .create(input("Rangoli", GalleryCategory::Festivals), 1)
            .await
            .unwrap();
        svc.toggle_pin(item.id).await.unwrap();

        let updated = svc
            .update(
                item.id,
                GalleryInput {
                    title: Some("Diwali Rangoli".to_string()),
                    description: Some(Some("Front courtyard".to_string())),
                    images: Some(Vec::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Diwali Rangoli");
        assert_eq!(updated.description.as_deref(), Some("Front courtyard"));
        assert!(updated.is_pinned);
        assert_eq!(updated.images.len(), 1);

        let replaced = svc
            .update(
                item.id,
                GalleryInput {
                    images: Some(vec![image("a.jpg"), image("b.jpg")]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(replaced.images.len(), 2);
        assert_eq!(replaced.images[1].alt, "b.jpg");
    }

    #[actix_web::test]
    async fn test_public_listing_hides_private_items() {
        let db = setup_test_db().await;
        let event = create_test_event(&db, "Navratri", "navratri", EventStatus::Active).await;
        let svc = GalleryService::new(db);

        let mut linked = input("Garba night", GalleryCategory::Festivals);
        linked.event_id = Some(Some(event.id));
        svc.create(linked, 1).await.unwrap();
        svc.create(input("Morning puja", GalleryCategory::Daily), 1)
            .await
            .unwrap();
        let mut hidden = input("Store room", GalleryCategory::Mandir);
        hidden.is_public = Some(false);
        svc.create(hidden, 1).await.unwrap();

        let all = svc.list_public(&GalleryQuery::default()).await.unwrap();
        assert_eq!(all.pagination.total_count, 2);

        let festivals = svc
            .list_public(&GalleryQuery {
                category: Some("festivals".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(festivals.items.len(), 1);
        let embedded = festivals.items[0].event.as_ref().unwrap();
        assert_eq!(embedded.title, "Navratri");
        assert_eq!(embedded.slug.as_deref(), Some("navratri"));

        let admin = svc
            .list_admin(&GalleryQuery {
                search: Some("STORE".to_string()),
                category: Some("all".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(admin.items.len(), 1);
        assert!(!admin.items[0].is_public);

        assert!(matches!(
            svc.list_public(&GalleryQuery {
                category: Some("unknown".to_string()),
                ..Default::default()
            })
            .await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[actix_web::test]
    async fn test_delete_and_missing_items() {
        let svc = GalleryService::new(setup_test_db().await);
        let item = svc
            .create(input("Lamp", GalleryCategory::Mandir), 1)
            .await
            .unwrap();
        svc.delete(item.id).await.unwrap();
        assert!(matches!(svc.delete(item.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.toggle_pin(item.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            svc.update(item.id, GalleryInput::default()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
