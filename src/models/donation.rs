use crate::entities::{DonationType, PaymentStatus, donation_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventRef, UserRef};

pub const MIN_DONATION_AMOUNT: i64 = 1;
pub const MAX_DONATION_AMOUNT: i64 = 500_000;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    pub donor_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Whole rupees.
    pub amount: Option<i64>,
    pub donation_type: Option<DonationType>,
    pub event_id: Option<i64>,
    pub is_anonymous: Option<bool>,
}

/// Requester details recorded alongside a new donation.
#[derive(Debug, Clone, Default)]
pub struct RequestOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicDonationQuery {
    pub event_id: Option<i64>,
    pub limit: Option<u64>,
}

/// Admin listing filters. `status` and `eventId` accept `all`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDonationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub event_id: Option<String>,
    pub approved: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub transaction_date: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminActions {
    pub is_approved: bool,
    pub approved_by: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver: Option<UserRef>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDetails {
    pub receipt_number: String,
    pub generated: bool,
    pub generated_at: Option<DateTime<Utc>>,
    pub email_sent: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub id: i64,
    pub donor_name: String,
    pub email: String,
    pub phone: String,
    pub amount: i64,
    pub donation_type: DonationType,
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventRef>,
    pub payment_details: PaymentDetails,
    pub admin_actions: AdminActions,
    pub receipt_details: ReceiptDetails,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationResponse {
    pub fn with_event(mut self, event: Option<EventRef>) -> Self {
        self.event = event;
        self
    }

    pub fn with_approver(mut self, approver: Option<UserRef>) -> Self {
        self.admin_actions.approver = approver;
        self
    }
}

impl From<donation_entity::Model> for DonationResponse {
    fn from(m: donation_entity::Model) -> Self {
        Self {
            id: m.id,
            donor_name: m.donor_name,
            email: m.email,
            phone: m.phone,
            amount: m.amount,
            donation_type: m.donation_type,
            event_id: m.event_id,
            event: None,
            payment_details: PaymentDetails {
                razorpay_order_id: m.razorpay_order_id,
                razorpay_payment_id: m.razorpay_payment_id,
                payment_method: m.payment_method,
                payment_status: m.payment_status,
                transaction_date: m.transaction_date,
                failure_reason: m.failure_reason,
            },
            admin_actions: AdminActions {
                is_approved: m.is_approved,
                approved_by: m.approved_by,
                approver: None,
                approved_at: m.approved_at,
                notes: m.admin_notes,
            },
            receipt_details: ReceiptDetails {
                receipt_number: m.receipt_number,
                generated: m.receipt_generated,
                generated_at: m.receipt_generated_at,
                email_sent: m.email_sent,
            },
            is_anonymous: m.is_anonymous,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Donor wall entry; no contact details.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicDonationResponse {
    pub id: i64,
    pub donor_name: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventRef>,
}

impl From<donation_entity::Model> for PublicDonationResponse {
    fn from(m: donation_entity::Model) -> Self {
        Self {
            id: m.id,
            donor_name: m.donor_name,
            amount: m.amount,
            created_at: m.created_at,
            event_id: m.event_id,
            event: None,
        }
    }
}

/// Result of an approval: the record plus whether this call changed it.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub donation: DonationResponse,
    pub newly_approved: bool,
}
