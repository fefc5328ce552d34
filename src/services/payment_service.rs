use crate::entities::{PaymentStatus, donation_entity as donations};
use crate::error::{AppError, AppResult};
use crate::external::{CreateOrderParams, OrderNotes, RazorpayService};
use crate::models::{CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest, WebhookEvent};
use crate::services::donation_service::credit_event_if_eligible;
use chrono::Utc;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};

const PAYMENT_METHOD: &str = "razorpay";

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
    razorpay: RazorpayService,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection, razorpay: RazorpayService) -> Self {
        Self { pool, razorpay }
    }

    async fn find_donation(&self, id: i64) -> AppResult<donations::Model> {
        donations::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
    }

    /// Opens a gateway order for a donation and moves it to `processing`.
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> AppResult<CreateOrderResponse> {
        let donation_id = request
            .donation_id
            .ok_or_else(|| AppError::ValidationError("Donation ID is required".to_string()))?;
        let donation = self.find_donation(donation_id).await?;
        if donation.payment_status == PaymentStatus::Success {
            return Err(AppError::ValidationError(
                "Donation has already been paid".to_string(),
            ));
        }

        let params = CreateOrderParams {
            amount: donation.amount * 100,
            currency: self.razorpay.currency().to_string(),
            receipt: format!("donation_{}", donation.id),
            notes: OrderNotes {
                donation_id: donation.id.to_string(),
                donor_name: donation.donor_name.clone(),
                donation_type: donation.donation_type.to_value(),
            },
        };
        let order = self.razorpay.create_order(&params).await?;

        let mut active = donation.into_active_model();
        active.razorpay_order_id = Set(Some(order.id.clone()));
        active.payment_status = Set(PaymentStatus::Processing);
        active.update(&self.pool).await?;

        Ok(CreateOrderResponse {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key: self.razorpay.key_id().to_string(),
        })
    }

    /// Confirms a checkout callback. Nothing is written unless the signature matches.
    pub async fn verify(&self, request: VerifyPaymentRequest) -> AppResult<()> {
        let (Some(order_id), Some(payment_id), Some(signature), Some(donation_id)) = (
            request.razorpay_order_id,
            request.razorpay_payment_id,
            request.razorpay_signature,
            request.donation_id,
        ) else {
            return Err(AppError::ValidationError(
                "Missing payment verification fields".to_string(),
            ));
        };

        if !self
            .razorpay
            .verify_payment_signature(&order_id, &payment_id, &signature)
        {
            log::warn!("Payment signature mismatch for donation {donation_id}, order {order_id}");
            return Err(AppError::InvalidSignature);
        }

        let txn = self.pool.begin().await?;
        let donation = donations::Entity::find_by_id(donation_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))?;
        if let Some(stored) = &donation.razorpay_order_id
            && *stored != order_id
        {
            log::warn!(
                "Order {order_id} does not belong to donation {donation_id} (expected {stored})"
            );
            return Err(AppError::ValidationError(
                "Order does not match donation".to_string(),
            ));
        }

        let mut active = donation.into_active_model();
        active.razorpay_order_id = Set(Some(order_id));
        active.razorpay_payment_id = Set(Some(payment_id));
        active.razorpay_signature = Set(Some(signature));
        active.payment_method = Set(Some(PAYMENT_METHOD.to_string()));
        active.payment_status = Set(PaymentStatus::Success);
        active.transaction_date = Set(Some(Utc::now()));
        active.failure_reason = Set(None);
        let donation = active.update(&txn).await?;
        credit_event_if_eligible(&txn, &donation).await?;
        txn.commit().await?;

        log::info!("Payment verified for donation {donation_id}");
        Ok(())
    }

    /// Applies a signed gateway notification.
    ///
    /// Returns whether a donation was changed. A bad signature is logged and
    /// ignored so the caller can still acknowledge the delivery.
    pub async fn handle_webhook(&self, body: &[u8], signature: Option<&str>) -> AppResult<bool> {
        let Some(signature) = signature else {
            log::warn!("Webhook without signature ignored");
            return Ok(false);
        };
        if !self.razorpay.verify_webhook_signature(body, signature) {
            log::warn!("Webhook signature mismatch ignored");
            return Ok(false);
        }

        let event: WebhookEvent = serde_json::from_slice(body)?;
        let status = match event.event.as_str() {
            "payment.captured" => PaymentStatus::Success,
            "payment.failed" => PaymentStatus::Failed,
            other => {
                log::info!("Webhook event {other} not handled");
                return Ok(false);
            }
        };
        let Some(payment) = event.payload.payment.map(|p| p.entity) else {
            log::warn!("Webhook {} without payment entity", event.event);
            return Ok(false);
        };

        let txn = self.pool.begin().await?;
        let mut donation = donations::Entity::find()
            .filter(donations::Column::RazorpayPaymentId.eq(payment.id.as_str()))
            .one(&txn)
            .await?;
        if donation.is_none()
            && let Some(order_id) = &payment.order_id
        {
            donation = donations::Entity::find()
                .filter(donations::Column::RazorpayOrderId.eq(order_id.as_str()))
                .one(&txn)
                .await?;
        }
        let Some(donation) = donation else {
            log::warn!("Webhook {} for unknown payment {}", event.event, payment.id);
            return Ok(false);
        };
        if let Some(stored) = donation.razorpay_payment_id.as_deref()
            && stored != payment.id
        {
            log::warn!(
                "Webhook {} for payment {} ignored: donation {} is bound to payment {stored}",
                event.event,
                payment.id,
                donation.id
            );
            return Ok(false);
        }
        if status == PaymentStatus::Failed && donation.payment_status == PaymentStatus::Success {
            log::warn!(
                "Webhook {} ignored: donation {} is already paid",
                event.event,
                donation.id
            );
            return Ok(false);
        }

        let donation_id = donation.id;
        let mut active = donation.into_active_model();
        active.payment_status = Set(status);
        active.razorpay_payment_id = Set(Some(payment.id.clone()));
        if status == PaymentStatus::Success {
            active.transaction_date = Set(Some(Utc::now()));
            if let Some(method) = payment.method {
                active.payment_method = Set(Some(method));
            }
        } else {
            active.failure_reason = Set(Some(
                payment
                    .error_description
                    .unwrap_or_else(|| "Payment failed".to_string()),
            ));
        }
        let donation = active.update(&txn).await?;
        credit_event_if_eligible(&txn, &donation).await?;
        txn.commit().await?;

        log::info!(
            "Webhook {} applied to donation {donation_id}: {status}",
            event.event
        );
        Ok(true)
    }
}
