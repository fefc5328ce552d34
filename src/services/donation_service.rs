use crate::entities::{
    DonationType, EventStatus, PaymentStatus, donation_entity as donations,
    event_entity as events,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminDonationQuery, ApprovalOutcome, CreateDonationRequest, DonationResponse,
    MAX_DONATION_AMOUNT, MIN_DONATION_AMOUNT, PaginatedResponse, Pagination, PaginationParams,
    PublicDonationQuery, PublicDonationResponse, RequestOrigin, UpdatePaymentRequest,
};
use crate::services::lookups::{event_refs, lower_contains, user_refs};
use crate::utils::{normalize_email, parse_datetime, validate_email, validate_indian_phone};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

const DEFAULT_PUBLIC_LIMIT: u64 = 10;
const DEFAULT_ADMIN_PAGE_SIZE: u64 = 50;
const MAX_DONOR_NAME: usize = 100;

/// Adds an approved, successful donation to its event's totals, at most once.
///
/// The `event_credited` flag is flipped with a guarded update first, so two
/// concurrent callers cannot both credit the same donation.
pub async fn credit_event_if_eligible<C>(db: &C, donation: &donations::Model) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    if !donation.is_creditable() {
        return Ok(false);
    }
    let Some(event_id) = donation.event_id else {
        return Ok(false);
    };

    let now = Utc::now();
    let flagged = donations::Entity::update_many()
        .col_expr(donations::Column::EventCredited, Expr::value(true))
        .col_expr(donations::Column::UpdatedAt, Expr::value(now))
        .filter(donations::Column::Id.eq(donation.id))
        .filter(donations::Column::EventCredited.eq(false))
        .exec(db)
        .await?;
    if flagged.rows_affected == 0 {
        return Ok(false);
    }

    events::Entity::update_many()
        .col_expr(
            events::Column::RaisedAmount,
            Expr::col(events::Column::RaisedAmount).add(donation.amount),
        )
        .col_expr(
            events::Column::DonationCount,
            Expr::col(events::Column::DonationCount).add(1),
        )
        .col_expr(events::Column::UpdatedAt, Expr::value(now))
        .filter(events::Column::Id.eq(event_id))
        .exec(db)
        .await?;

    log::info!(
        "Donation {} credited {} to event {}",
        donation.id,
        donation.amount,
        event_id
    );
    Ok(true)
}

async fn find_donation<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<donations::Model> {
    donations::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
}

fn parse_payment_status(raw: &str) -> AppResult<PaymentStatus> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| AppError::ValidationError(format!("Invalid payment status: {raw}")))
}

fn filter_value(raw: &Option<String>) -> Option<&str> {
    raw.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

#[derive(Clone)]
pub struct DonationService {
    pool: DatabaseConnection,
}

impl DonationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        request: CreateDonationRequest,
        origin: RequestOrigin,
    ) -> AppResult<DonationResponse> {
        let donor_name = request.donor_name.map(|s| s.trim().to_string());
        let email = request.email.map(|s| normalize_email(&s));
        let phone = request.phone.map(|s| s.trim().to_string());

        let (Some(donor_name), Some(email), Some(phone), Some(amount)) = (
            donor_name.filter(|s| !s.is_empty()),
            email.filter(|s| !s.is_empty()),
            phone.filter(|s| !s.is_empty()),
            request.amount,
        ) else {
            return Err(AppError::ValidationError(
                "All required fields must be provided".to_string(),
            ));
        };

        if donor_name.chars().count() > MAX_DONOR_NAME {
            return Err(AppError::ValidationError(
                "Donor name must be at most 100 characters".to_string(),
            ));
        }
        if !(MIN_DONATION_AMOUNT..=MAX_DONATION_AMOUNT).contains(&amount) {
            return Err(AppError::ValidationError(
                "Amount must be between ₹1 and ₹5,00,000".to_string(),
            ));
        }
        validate_indian_phone(&phone)?;
        validate_email(&email)?;

        if let Some(event_id) = request.event_id {
            let event = events::Entity::find_by_id(event_id).one(&self.pool).await?;
            if !event.is_some_and(|e| e.status == EventStatus::Active) {
                return Err(AppError::ValidationError(
                    "Invalid or inactive event".to_string(),
                ));
            }
        }

        let donation = donations::ActiveModel {
            donor_name: Set(donor_name),
            email: Set(email),
            phone: Set(phone),
            amount: Set(amount),
            donation_type: Set(request.donation_type.unwrap_or(DonationType::General)),
            event_id: Set(request.event_id),
            payment_status: Set(PaymentStatus::Pending),
            is_approved: Set(false),
            event_credited: Set(false),
            receipt_generated: Set(false),
            email_sent: Set(false),
            is_anonymous: Set(request.is_anonymous.unwrap_or(false)),
            ip_address: Set(origin.ip_address),
            user_agent: Set(origin.user_agent),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Donation {} created (receipt {}, amount {})",
            donation.id,
            donation.receipt_number,
            donation.amount
        );
        Ok(donation.into())
    }

    /// Donor wall: approved, paid and not anonymous.
    pub async fn list_public(
        &self,
        query: &PublicDonationQuery,
    ) -> AppResult<Vec<PublicDonationResponse>> {
        let limit = query
            .limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PUBLIC_LIMIT)
            .min(crate::models::MAX_PAGE_SIZE);

        let mut select = donations::Entity::find()
            .filter(donations::Column::IsApproved.eq(true))
            .filter(donations::Column::PaymentStatus.eq(PaymentStatus::Success))
            .filter(donations::Column::IsAnonymous.eq(false));
        if let Some(event_id) = query.event_id {
            select = select.filter(donations::Column::EventId.eq(event_id));
        }

        let found = select
            .order_by_desc(donations::Column::CreatedAt)
            .limit(limit)
            .all(&self.pool)
            .await?;

        let events = event_refs(&self.pool, found.iter().map(|d| d.event_id), false).await?;
        Ok(found
            .into_iter()
            .map(|d| {
                let event = d.event_id.and_then(|id| events.get(&id).cloned());
                let mut item = PublicDonationResponse::from(d);
                item.event = event;
                item
            })
            .collect())
    }

    fn admin_filter(query: &AdminDonationQuery) -> AppResult<Condition> {
        let mut condition = Condition::all();

        if let Some(status) = filter_value(&query.status) {
            condition =
                condition.add(donations::Column::PaymentStatus.eq(parse_payment_status(status)?));
        }
        if let Some(event_id) = filter_value(&query.event_id) {
            let event_id: i64 = event_id
                .parse()
                .map_err(|_| AppError::ValidationError(format!("Invalid eventId: {event_id}")))?;
            condition = condition.add(donations::Column::EventId.eq(event_id));
        }
        if let Some(approved) = query.approved.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            condition = condition.add(donations::Column::IsApproved.eq(approved == "true"));
        }
        if let Some(raw) = query.date_from.as_deref().filter(|v| !v.trim().is_empty()) {
            let from = parse_datetime(raw.trim())
                .ok_or_else(|| AppError::ValidationError(format!("Invalid dateFrom: {raw}")))?;
            condition = condition.add(donations::Column::CreatedAt.gte(from));
        }
        if let Some(raw) = query.date_to.as_deref().filter(|v| !v.trim().is_empty()) {
            let to = parse_datetime(raw.trim())
                .ok_or_else(|| AppError::ValidationError(format!("Invalid dateTo: {raw}")))?;
            condition = condition.add(donations::Column::CreatedAt.lte(to));
        }
        if let Some(search) = query.search.as_deref().filter(|v| !v.trim().is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(lower_contains(donations::Column::DonorName, search))
                    .add(lower_contains(donations::Column::Email, search))
                    .add(lower_contains(donations::Column::Phone, search)),
            );
        }
        Ok(condition)
    }

    /// Filtered, paginated admin listing. `totalAmount` covers the successful
    /// donations of the whole filtered set, not just the current page.
    pub async fn list_admin(
        &self,
        query: &AdminDonationQuery,
    ) -> AppResult<PaginatedResponse<DonationResponse>> {
        let params = PaginationParams::new(query.page, query.limit, DEFAULT_ADMIN_PAGE_SIZE);
        let condition = Self::admin_filter(query)?;

        let base = donations::Entity::find().filter(condition);
        let total = base.clone().count(&self.pool).await?;

        let amounts: Vec<i64> = base
            .clone()
            .filter(donations::Column::PaymentStatus.eq(PaymentStatus::Success))
            .select_only()
            .column(donations::Column::Amount)
            .into_tuple()
            .all(&self.pool)
            .await?;
        let total_amount: i64 = amounts.iter().sum();

        let page = base
            .order_by_desc(donations::Column::CreatedAt)
            .order_by_desc(donations::Column::Id)
            .limit(params.limit)
            .offset(params.offset())
            .all(&self.pool)
            .await?;

        let items = self.with_relations(page).await?;
        Ok(PaginatedResponse::new(
            items,
            Pagination::new(&params, total).with_total_amount(total_amount),
        ))
    }

    async fn with_relations(
        &self,
        list: Vec<donations::Model>,
    ) -> AppResult<Vec<DonationResponse>> {
        let events = event_refs(&self.pool, list.iter().map(|d| d.event_id), false).await?;
        let approvers = user_refs(&self.pool, list.iter().map(|d| d.approved_by)).await?;
        Ok(list
            .into_iter()
            .map(|d| {
                let event = d.event_id.and_then(|id| events.get(&id).cloned());
                let approver = d.approved_by.and_then(|id| approvers.get(&id).cloned());
                DonationResponse::from(d)
                    .with_event(event)
                    .with_approver(approver)
            })
            .collect())
    }

    async fn single_with_relations(
        &self,
        donation: donations::Model,
    ) -> AppResult<DonationResponse> {
        let mut list = self.with_relations(vec![donation]).await?;
        list.pop()
            .ok_or_else(|| AppError::InternalError("donation vanished while loading".to_string()))
    }

    /// Approves once; repeated approvals return the record unchanged.
    pub async fn approve(
        &self,
        id: i64,
        admin_id: i64,
        notes: Option<String>,
    ) -> AppResult<ApprovalOutcome> {
        let txn = self.pool.begin().await?;
        let donation = find_donation(&txn, id).await?;

        if donation.is_approved {
            txn.commit().await?;
            return Ok(ApprovalOutcome {
                donation: self.single_with_relations(donation).await?,
                newly_approved: false,
            });
        }

        let now = Utc::now();
        let approved = donations::Entity::update_many()
            .col_expr(donations::Column::IsApproved, Expr::value(true))
            .col_expr(donations::Column::ApprovedBy, Expr::value(admin_id))
            .col_expr(donations::Column::ApprovedAt, Expr::value(now))
            .col_expr(
                donations::Column::AdminNotes,
                Expr::value(notes.unwrap_or_default()),
            )
            .col_expr(donations::Column::UpdatedAt, Expr::value(now))
            .filter(donations::Column::Id.eq(id))
            .filter(donations::Column::IsApproved.eq(false))
            .exec(&txn)
            .await?;
        let newly_approved = approved.rows_affected > 0;

        let mut donation = find_donation(&txn, id).await?;
        if newly_approved && credit_event_if_eligible(&txn, &donation).await? {
            donation = find_donation(&txn, id).await?;
        }
        txn.commit().await?;

        if newly_approved {
            log::info!("Donation {id} approved by admin {admin_id}");
        }
        Ok(ApprovalOutcome {
            donation: self.single_with_relations(donation).await?,
            newly_approved,
        })
    }

    /// Marks the donation unapproved. Event totals are left as they are.
    pub async fn reject(
        &self,
        id: i64,
        admin_id: i64,
        notes: Option<String>,
    ) -> AppResult<DonationResponse> {
        let donation = find_donation(&self.pool, id).await?;

        let mut active = donation.into_active_model();
        active.is_approved = Set(false);
        active.approved_by = Set(Some(admin_id));
        active.approved_at = Set(Some(Utc::now()));
        active.admin_notes = Set(Some(notes.unwrap_or_default()));
        let donation = active.update(&self.pool).await?;

        log::info!("Donation {id} rejected by admin {admin_id}");
        self.single_with_relations(donation).await
    }

    /// Manual payment status override.
    pub async fn update_payment(
        &self,
        id: i64,
        request: UpdatePaymentRequest,
    ) -> AppResult<DonationResponse> {
        let txn = self.pool.begin().await?;
        let donation = find_donation(&txn, id).await?;
        let previous = donation.payment_status;

        let mut active = donation.into_active_model();
        active.payment_status = Set(request.payment_status);
        if let Some(method) = request.payment_method {
            active.payment_method = Set(Some(method));
        }
        if let Some(payment_id) = request.razorpay_payment_id {
            active.razorpay_payment_id = Set(Some(payment_id));
        }
        active.transaction_date = Set(Some(request.transaction_date.unwrap_or_else(Utc::now)));
        let mut donation = active.update(&txn).await?;

        if credit_event_if_eligible(&txn, &donation).await? {
            donation = find_donation(&txn, id).await?;
        }
        txn.commit().await?;

        log::info!(
            "Donation {id} payment status changed {previous} -> {}",
            donation.payment_status
        );
        self.single_with_relations(donation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::test_utils::{
        create_test_donation, create_test_event, create_test_user, setup_test_db,
    };

    fn request(amount: i64, phone: &str, event_id: Option<i64>) -> CreateDonationRequest {
        CreateDonationRequest {
            donor_name: Some("Sita Devi".to_string()),
            email: Some("Sita@Example.org".to_string()),
            phone: Some(phone.to_string()),
            amount: Some(amount),
            donation_type: None,
            event_id,
            is_anonymous: None,
        }
    }

    async fn event_totals(db: &DatabaseConnection, id: i64) -> (i64, i64) {
        let e = events::Entity::find_by_id(id).one(db).await.unwrap().unwrap();
        (e.raised_amount, e.donation_count)
    }

    #[actix_web::test]
    async fn test_create_records_pending_donation() {
        let db = setup_test_db().await;
        let svc = DonationService::new(db.clone());

        let origin = RequestOrigin {
            ip_address: Some("10.1.1.1".to_string()),
            user_agent: Some("test-agent".to_string()),
        };
        let created = svc
            .create(request(501, "9876543210", None), origin)
            .await
            .unwrap();
        assert_eq!(created.email, "sita@example.org");
        assert_eq!(created.donation_type, DonationType::General);
        assert_eq!(created.payment_details.payment_status, PaymentStatus::Pending);
        assert!(created.receipt_details.receipt_number.starts_with("STJ"));

        let stored = find_donation(&db, created.id).await.unwrap();
        assert_eq!(stored.ip_address.as_deref(), Some("10.1.1.1"));
        assert_eq!(stored.user_agent.as_deref(), Some("test-agent"));
    }

    #[actix_web::test]
    async fn test_amount_bounds() {
        let svc = DonationService::new(setup_test_db().await);
        for bad in [0, -5, 500_001] {
            let err = svc
                .create(request(bad, "9876543210", None), RequestOrigin::default())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)), "amount {bad}");
        }
        for good in [1, 500_000] {
            assert!(
                svc.create(request(good, "9876543210", None), RequestOrigin::default())
                    .await
                    .is_ok()
            );
        }
    }

    #[actix_web::test]
    async fn test_phone_and_required_fields() {
        let svc = DonationService::new(setup_test_db().await);
        let bad_phone = svc
            .create(request(100, "5876543210", None), RequestOrigin::default())
            .await;
        assert!(matches!(bad_phone, Err(AppError::ValidationError(_))));

        let mut missing = request(100, "9876543210", None);
        missing.donor_name = Some("   ".to_string());
        let err = svc.create(missing, RequestOrigin::default()).await;
        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_event_must_be_active() {
        let db = setup_test_db().await;
        let paused = create_test_event(&db, "Holi", "holi", EventStatus::Paused).await;
        let active = create_test_event(&db, "Diwali", "diwali", EventStatus::Active).await;
        let svc = DonationService::new(db);

        let err = svc
            .create(request(100, "9876543210", Some(paused.id)), RequestOrigin::default())
            .await;
        assert!(matches!(err, Err(AppError::ValidationError(_))));
        let missing = svc
            .create(request(100, "9876543210", Some(9999)), RequestOrigin::default())
            .await;
        assert!(matches!(missing, Err(AppError::ValidationError(_))));

        let ok = svc
            .create(request(100, "9876543210", Some(active.id)), RequestOrigin::default())
            .await
            .unwrap();
        assert_eq!(ok.event_id, Some(active.id));
    }

    #[actix_web::test]
    async fn test_receipt_numbers_are_unique() {
        let db = setup_test_db().await;
        let a = create_test_donation(&db, 10, None, PaymentStatus::Pending).await;
        let b = create_test_donation(&db, 10, None, PaymentStatus::Pending).await;
        assert_ne!(a.receipt_number, b.receipt_number);
    }

    #[actix_web::test]
    async fn test_approve_credits_event_exactly_once() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "pujari", UserRole::Admin).await;
        let event = create_test_event(&db, "Diwali", "diwali", EventStatus::Active).await;
        let donation =
            create_test_donation(&db, 2100, Some(event.id), PaymentStatus::Success).await;
        let svc = DonationService::new(db.clone());

        let first = svc
            .approve(donation.id, admin.id, Some("verified".to_string()))
            .await
            .unwrap();
        assert!(first.newly_approved);
        assert!(first.donation.admin_actions.is_approved);
        assert_eq!(first.donation.admin_actions.notes.as_deref(), Some("verified"));
        assert_eq!(
            first.donation.admin_actions.approver.as_ref().map(|u| u.username.as_str()),
            Some("pujari")
        );
        assert_eq!(event_totals(&db, event.id).await, (2100, 1));

        let second = svc.approve(donation.id, admin.id, None).await.unwrap();
        assert!(!second.newly_approved);
        assert_eq!(event_totals(&db, event.id).await, (2100, 1));
    }

    #[actix_web::test]
    async fn test_approve_pending_payment_credits_later() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "pujari", UserRole::Admin).await;
        let event = create_test_event(&db, "Diwali", "diwali", EventStatus::Active).await;
        let donation = create_test_donation(&db, 500, Some(event.id), PaymentStatus::Pending).await;
        let svc = DonationService::new(db.clone());

        svc.approve(donation.id, admin.id, None).await.unwrap();
        assert_eq!(event_totals(&db, event.id).await, (0, 0));

        let update = UpdatePaymentRequest {
            payment_status: PaymentStatus::Success,
            payment_method: Some("upi".to_string()),
            razorpay_payment_id: Some("pay_manual".to_string()),
            transaction_date: None,
        };
        let updated = svc.update_payment(donation.id, update).await.unwrap();
        assert_eq!(updated.payment_details.payment_status, PaymentStatus::Success);
        assert!(updated.payment_details.transaction_date.is_some());
        assert_eq!(event_totals(&db, event.id).await, (500, 1));

        // Same override again must not double count.
        let again = UpdatePaymentRequest {
            payment_status: PaymentStatus::Success,
            payment_method: None,
            razorpay_payment_id: None,
            transaction_date: None,
        };
        svc.update_payment(donation.id, again).await.unwrap();
        assert_eq!(event_totals(&db, event.id).await, (500, 1));
    }

    #[actix_web::test]
    async fn test_reject_and_not_found() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "pujari", UserRole::Admin).await;
        let donation = create_test_donation(&db, 100, None, PaymentStatus::Success).await;
        let svc = DonationService::new(db);

        let rejected = svc
            .reject(donation.id, admin.id, Some("duplicate".to_string()))
            .await
            .unwrap();
        assert!(!rejected.admin_actions.is_approved);
        assert_eq!(rejected.admin_actions.approved_by, Some(admin.id));

        assert!(matches!(
            svc.approve(9999, admin.id, None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.reject(9999, admin.id, None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn test_public_listing_filters() {
        let db = setup_test_db().await;
        let admin = create_test_user(&db, "pujari", UserRole::Admin).await;
        let event = create_test_event(&db, "Diwali", "diwali", EventStatus::Active).await;
        let svc = DonationService::new(db.clone());

        let visible = create_test_donation(&db, 100, Some(event.id), PaymentStatus::Success).await;
        svc.approve(visible.id, admin.id, None).await.unwrap();

        let unpaid = create_test_donation(&db, 200, None, PaymentStatus::Pending).await;
        svc.approve(unpaid.id, admin.id, None).await.unwrap();

        create_test_donation(&db, 300, None, PaymentStatus::Success).await; // unapproved

        let anonymous = create_test_donation(&db, 400, None, PaymentStatus::Success).await;
        let mut active = anonymous.clone().into_active_model();
        active.is_anonymous = Set(true);
        active.update(&db).await.unwrap();
        svc.approve(anonymous.id, admin.id, None).await.unwrap();

        let all = svc
            .list_public(&PublicDonationQuery {
                event_id: None,
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, visible.id);
        assert_eq!(all[0].event.as_ref().map(|e| e.title.as_str()), Some("Diwali"));

        let other_event = svc
            .list_public(&PublicDonationQuery {
                event_id: Some(event.id + 1),
                limit: Some(5),
            })
            .await
            .unwrap();
        assert!(other_event.is_empty());
    }

    #[actix_web::test]
    async fn test_admin_listing_filters_and_totals() {
        let db = setup_test_db().await;
        create_test_donation(&db, 100, None, PaymentStatus::Success).await;
        create_test_donation(&db, 250, None, PaymentStatus::Success).await;
        create_test_donation(&db, 999, None, PaymentStatus::Failed).await;
        let svc = DonationService::new(db);

        let all = svc.list_admin(&AdminDonationQuery::default()).await.unwrap();
        assert_eq!(all.pagination.total_count, 3);
        assert_eq!(all.pagination.total_amount, Some(350));
        assert_eq!(all.pagination.current_page, 1);

        let failed = svc
            .list_admin(&AdminDonationQuery {
                status: Some("failed".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(failed.pagination.total_count, 1);
        assert_eq!(failed.pagination.total_amount, Some(0));

        let everything = svc
            .list_admin(&AdminDonationQuery {
                status: Some("all".to_string()),
                event_id: Some("all".to_string()),
                search: Some("RAVI".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(everything.pagination.total_count, 3);

        let nobody = svc
            .list_admin(&AdminDonationQuery {
                search: Some("zzz".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(nobody.pagination.total_count, 0);

        let paged = svc
            .list_admin(&AdminDonationQuery {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.pagination.total_pages, 2);

        let bad = svc
            .list_admin(&AdminDonationQuery {
                status: Some("lost".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(bad, Err(AppError::ValidationError(_))));
    }
}
