use crate::utils::generate_receipt_number;
use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum DonationType {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "event")]
    Event,
    #[sea_orm(string_value = "seva")]
    Seva,
    #[sea_orm(string_value = "infrastructure")]
    Infrastructure,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub donor_name: String,
    pub email: String,
    pub phone: String,
    pub amount: i64, // rupees
    pub donation_type: DonationType,
    pub event_id: Option<i64>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub transaction_date: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub is_approved: bool,
    pub approved_by: Option<i64>,
    pub approved_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    /// Already added to the event's raised amount and donation count.
    pub event_credited: bool,
    #[sea_orm(unique)]
    pub receipt_number: String,
    pub receipt_generated: bool,
    pub receipt_generated_at: Option<DateTime<Utc>>,
    pub email_sent: bool,
    pub is_anonymous: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Approved, paid and linked to an event, but not yet counted in its totals.
    pub fn is_creditable(&self) -> bool {
        self.is_approved
            && self.payment_status == PaymentStatus::Success
            && self.event_id.is_some()
            && !self.event_credited
    }
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
            if self.receipt_number.is_not_set() {
                self.receipt_number = Set(generate_receipt_number(now));
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
