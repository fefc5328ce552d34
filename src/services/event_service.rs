use crate::entities::{
    EventCategory, EventStatus, PaymentStatus, donation_entity as donations,
    event_entity as events,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminEventQuery, DEFAULT_EVENT_LOCATION, EventDetailResponse, EventInput, EventResponse,
    MIN_TARGET_AMOUNT, PaginatedResponse, Pagination, PaginationParams, PublicEventsResponse,
    RecentDonation, images_to_json,
};
use crate::services::lookups::{lower_contains, user_refs};
use crate::utils::{slug_candidate, slugify};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};

const DEFAULT_ADMIN_PAGE_SIZE: u64 = 20;
const RECENT_DONATIONS: u64 = 10;
const MAX_TITLE: usize = 200;
const MAX_DESCRIPTION: usize = 2000;
// A concurrent write can take the slug between the lookup and the insert.
const SLUG_ATTEMPTS: usize = 3;

/// First free slug for `title`, skipping the event being updated.
async fn unique_slug<C: ConnectionTrait>(
    db: &C,
    title: &str,
    exclude_id: Option<i64>,
) -> AppResult<String> {
    let base = slugify(title);
    let mut attempt = 1;
    loop {
        let candidate = slug_candidate(&base, attempt);
        let mut query = events::Entity::find().filter(events::Column::Slug.eq(candidate.as_str()));
        if let Some(id) = exclude_id {
            query = query.filter(events::Column::Id.ne(id));
        }
        if query.count(db).await? == 0 {
            return Ok(candidate);
        }
        attempt += 1;
    }
}

/// `events.slug` is the table's only unique column.
fn is_slug_conflict(err: &AppError) -> bool {
    match err {
        AppError::DatabaseError(db) => {
            matches!(db.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        }
        _ => false,
    }
}

fn slug_taken() -> AppError {
    AppError::ValidationError(
        "Another event with this title was saved at the same time, please retry".to_string(),
    )
}

async fn clear_main_flag<C: ConnectionTrait>(db: &C, except: Option<i64>) -> AppResult<()> {
    let mut update = events::Entity::update_many()
        .col_expr(events::Column::IsMainEvent, Expr::value(false))
        .col_expr(events::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(events::Column::IsMainEvent.eq(true));
    if let Some(id) = except {
        update = update.filter(events::Column::Id.ne(id));
    }
    update.exec(db).await?;
    Ok(())
}

fn validate_input(input: &EventInput) -> AppResult<()> {
    if let Some(title) = &input.title {
        if title.is_empty() {
            return Err(AppError::ValidationError("Event title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE {
            return Err(AppError::ValidationError(
                "Event title must be at most 200 characters".to_string(),
            ));
        }
    }
    if let Some(description) = &input.description {
        if description.is_empty() {
            return Err(AppError::ValidationError(
                "Event description is required".to_string(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION {
            return Err(AppError::ValidationError(
                "Event description must be at most 2000 characters".to_string(),
            ));
        }
    }
    if let Some(target) = input.target_amount
        && target < MIN_TARGET_AMOUNT
    {
        return Err(AppError::ValidationError(
            "Target amount must be at least ₹1000".to_string(),
        ));
    }
    if let Some(priority) = input.priority
        && !(1..=10).contains(&priority)
    {
        return Err(AppError::ValidationError(
            "Priority must be between 1 and 10".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct EventService {
    pool: DatabaseConnection,
}

impl EventService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Active events that have not ended, main event first.
    pub async fn list_public(&self) -> AppResult<PublicEventsResponse> {
        let now = Utc::now();
        let list = events::Entity::find()
            .filter(events::Column::Status.eq(EventStatus::Active))
            .filter(
                Condition::any()
                    .add(events::Column::EndDate.is_null())
                    .add(events::Column::EndDate.gte(now)),
            )
            .order_by_desc(events::Column::IsMainEvent)
            .order_by_desc(events::Column::Priority)
            .order_by_desc(events::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let mut list: Vec<EventResponse> = list.into_iter().map(Into::into).collect();
        let main_index = list.iter().position(|e| e.is_main_event).unwrap_or(0);
        let main_event = (!list.is_empty()).then(|| list.remove(main_index));

        Ok(PublicEventsResponse {
            main_event,
            other_events: list,
        })
    }

    pub async fn get_public_by_slug(&self, slug: &str) -> AppResult<EventDetailResponse> {
        let event = events::Entity::find()
            .filter(events::Column::Slug.eq(slug))
            .filter(events::Column::Status.eq(EventStatus::Active))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let recent = donations::Entity::find()
            .filter(donations::Column::EventId.eq(event.id))
            .filter(donations::Column::IsApproved.eq(true))
            .filter(donations::Column::PaymentStatus.eq(PaymentStatus::Success))
            .filter(donations::Column::IsAnonymous.eq(false))
            .order_by_desc(donations::Column::CreatedAt)
            .limit(RECENT_DONATIONS)
            .all(&self.pool)
            .await?;

        Ok(EventDetailResponse {
            event: event.into(),
            recent_donations: recent
                .into_iter()
                .map(|d| RecentDonation {
                    id: d.id,
                    donor_name: d.donor_name,
                    amount: d.amount,
                    created_at: d.created_at,
                })
                .collect(),
        })
    }

    pub async fn list_admin(
        &self,
        query: &AdminEventQuery,
    ) -> AppResult<PaginatedResponse<EventResponse>> {
        let params = PaginationParams::new(query.page, query.limit, DEFAULT_ADMIN_PAGE_SIZE);

        let mut select = events::Entity::find();
        if let Some(status) = query
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "all")
        {
            let status: EventStatus =
                serde_json::from_value(serde_json::Value::String(status.to_string()))
                    .map_err(|_| AppError::ValidationError(format!("Invalid status: {status}")))?;
            select = select.filter(events::Column::Status.eq(status));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(lower_contains(events::Column::Title, search))
                    .add(lower_contains(events::Column::Description, search)),
            );
        }

        let total = select.clone().count(&self.pool).await?;
        let page = select
            .order_by_desc(events::Column::CreatedAt)
            .order_by_desc(events::Column::Id)
            .limit(params.limit)
            .offset(params.offset())
            .all(&self.pool)
            .await?;

        let creators = user_refs(&self.pool, page.iter().map(|e| e.created_by)).await?;
        let items = page
            .into_iter()
            .map(|e| {
                let creator = e.created_by.and_then(|id| creators.get(&id).cloned());
                let mut item = EventResponse::from(e);
                item.creator = creator;
                item
            })
            .collect();

        Ok(PaginatedResponse::new(items, Pagination::new(&params, total)))
    }

    pub async fn create(&self, input: EventInput, created_by: i64) -> AppResult<EventResponse> {
        validate_input(&input)?;
        for attempt in 1..=SLUG_ATTEMPTS {
            match self.insert_event(input.clone(), created_by).await {
                Err(e) if is_slug_conflict(&e) => {
                    log::warn!("Event slug taken concurrently, attempt {attempt}/{SLUG_ATTEMPTS}");
                }
                result => return result,
            }
        }
        Err(slug_taken())
    }

    async fn insert_event(&self, input: EventInput, created_by: i64) -> AppResult<EventResponse> {
        let (Some(title), Some(description), Some(target_amount)) =
            (input.title.clone(), input.description.clone(), input.target_amount)
        else {
            return Err(AppError::ValidationError(
                "Title, description and target amount are required".to_string(),
            ));
        };
        let is_main_event = input.is_main_event.unwrap_or(false);

        let txn = self.pool.begin().await?;
        let slug = unique_slug(&txn, &title, None).await?;
        if is_main_event {
            clear_main_flag(&txn, None).await?;
        }

        let event = events::ActiveModel {
            title: Set(title),
            slug: Set(slug),
            description: Set(description),
            target_amount: Set(target_amount),
            raised_amount: Set(0),
            images: Set(images_to_json(&input.images.unwrap_or_default())),
            status: Set(input.status.unwrap_or(EventStatus::Active)),
            priority: Set(input.priority.unwrap_or(5)),
            is_main_event: Set(is_main_event),
            event_date: Set(input.event_date.flatten()),
            end_date: Set(input.end_date.flatten()),
            location: Set(input
                .location
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_LOCATION.to_string())),
            category: Set(input.category.unwrap_or(EventCategory::Festival)),
            donation_count: Set(0),
            created_by: Set(Some(created_by)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!("Event {} ({}) created by admin {created_by}", event.id, event.slug);
        Ok(event.into())
    }

    /// Partial update. The slug follows the title only when the title changes.
    pub async fn update(&self, id: i64, input: EventInput) -> AppResult<EventResponse> {
        validate_input(&input)?;

        let txn = self.pool.begin().await?;
        let existing = events::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let title_changed = input.title.as_ref().is_some_and(|t| *t != existing.title);
        let mut active = existing.into_active_model();

        if let Some(title) = input.title {
            if title_changed {
                active.slug = Set(unique_slug(&txn, &title, Some(id)).await?);
            }
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(target) = input.target_amount {
            active.target_amount = Set(target);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }
        if let Some(event_date) = input.event_date {
            active.event_date = Set(event_date);
        }
        if let Some(end_date) = input.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(location) = input.location.filter(|l| !l.is_empty()) {
            active.location = Set(location);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(images) = input.images {
            active.images = Set(images_to_json(&images));
        }
        if let Some(is_main) = input.is_main_event {
            if is_main {
                clear_main_flag(&txn, Some(id)).await?;
            }
            active.is_main_event = Set(is_main);
        }

        let event = match active.update(&txn).await {
            Ok(event) => event,
            Err(e) => {
                let err = AppError::from(e);
                return Err(if is_slug_conflict(&err) { slug_taken() } else { err });
            }
        };
        txn.commit().await?;

        log::info!("Event {id} updated");
        Ok(event.into())
    }

    /// Donations keep their `event_id` after the event is gone.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = events::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        log::info!("Event {id} deleted");
        Ok(())
    }

    /// Makes `id` the only main event.
    pub async fn set_main(&self, id: i64) -> AppResult<EventResponse> {
        let txn = self.pool.begin().await?;
        let event = events::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        clear_main_flag(&txn, Some(id)).await?;
        let mut active = event.into_active_model();
        active.is_main_event = Set(true);
        let event = active.update(&txn).await?;
        txn.commit().await?;

        log::info!("Event {id} set as main event");
        Ok(event.into())
    }

    pub async fn find(&self, id: i64) -> AppResult<events::Model> {
        events::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }
}
