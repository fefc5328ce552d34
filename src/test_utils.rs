//! Shared fixtures for service and handler tests.

use crate::entities::{
    DonationType, EventCategory, EventStatus, PaymentStatus, UserRole, donation_entity as donations,
    event_entity as events, user_entity as users,
};
use crate::utils::hash_password;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

pub const TEST_PASSWORD: &str = "Password123";

/// Fresh in-memory SQLite database with the full schema applied.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    // One connection, otherwise every pooled connection sees its own empty database.
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory sqlite");
    Migrator::up(&db, None).await.expect("failed to migrate test db");
    db
}

pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    role: UserRole,
) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@temple.test")),
        password_hash: Set(hash_password(TEST_PASSWORD, 4).unwrap()),
        role: Set(role),
        is_active: Set(true),
        login_attempts: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_test_event(
    db: &DatabaseConnection,
    title: &str,
    slug: &str,
    status: EventStatus,
) -> events::Model {
    events::ActiveModel {
        title: Set(title.to_string()),
        slug: Set(slug.to_string()),
        description: Set(format!("{title} celebrations")),
        target_amount: Set(100_000),
        raised_amount: Set(0),
        images: Set(serde_json::json!([])),
        status: Set(status),
        priority: Set(5),
        is_main_event: Set(false),
        location: Set("Main Temple Complex".to_string()),
        category: Set(EventCategory::Festival),
        donation_count: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_test_donation(
    db: &DatabaseConnection,
    amount: i64,
    event_id: Option<i64>,
    status: PaymentStatus,
) -> donations::Model {
    donations::ActiveModel {
        donor_name: Set("Ravi Kumar".to_string()),
        email: Set("ravi@example.org".to_string()),
        phone: Set("9876543210".to_string()),
        amount: Set(amount),
        donation_type: Set(if event_id.is_some() {
            DonationType::Event
        } else {
            DonationType::General
        }),
        event_id: Set(event_id),
        payment_status: Set(status),
        is_approved: Set(false),
        event_credited: Set(false),
        receipt_generated: Set(false),
        email_sent: Set(false),
        is_anonymous: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
