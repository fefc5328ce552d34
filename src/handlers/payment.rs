use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

#[utoipa::path(
    post,
    path = "/payments/create-order",
    tag = "payments",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Gateway order opened", body = CreateOrderResponse),
        (status = 400, description = "Missing id or donation already paid"),
        (status = 404, description = "Donation not found"),
        (status = 502, description = "Gateway rejected the order")
    )
)]
pub async fn create_order(
    payment_service: web::Data<PaymentService>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    match payment_service.create_order(request.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payments/verify",
    tag = "payments",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified"),
        (status = 400, description = "Invalid payment signature"),
        (status = 404, description = "Donation not found")
    )
)]
pub async fn verify_payment(
    payment_service: web::Data<PaymentService>,
    request: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse> {
    match payment_service.verify(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Payment verified successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Gateway notifications. Always acknowledged with 200 so the gateway does
/// not retry; problems only show up in the log.
#[utoipa::path(
    post,
    path = "/payments/webhook",
    tag = "payments",
    request_body(content = String, content_type = "application/json", description = "Raw gateway event"),
    params(
        ("x-razorpay-signature" = String, Header, description = "Hex HMAC-SHA256 of the body")
    ),
    responses(
        (status = 200, description = "Delivery acknowledged")
    )
)]
pub async fn payment_webhook(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = payment_service.handle_webhook(&body, signature).await {
        log::error!("Failed to process payment webhook: {e}");
    }
    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/create-order", web::post().to(create_order))
            .route("/verify", web::post().to(verify_payment))
            .route("/webhook", web::post().to(payment_webhook)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RazorpayConfig;
    use crate::entities::{PaymentStatus, donation_entity as donations};
    use crate::external::{RazorpayService, sign_hmac_sha256};
    use crate::test_utils::{create_test_donation, setup_test_db};
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::EntityTrait;

    fn payment_service(db: sea_orm::DatabaseConnection) -> PaymentService {
        PaymentService::new(
            db,
            RazorpayService::new(RazorpayConfig {
                key_id: "rzp_test_key".to_string(),
                key_secret: "s".to_string(),
                webhook_secret: "whsec".to_string(),
                currency: "INR".to_string(),
                api_base: "http://127.0.0.1:1".to_string(),
            }),
        )
    }

    #[actix_web::test]
    async fn test_forged_webhook_is_acknowledged_without_changes() {
        let db = setup_test_db().await;
        let donation = create_test_donation(&db, 300, None, PaymentStatus::Processing).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(payment_service(db.clone())))
                .service(web::scope("/api").configure(payment_config)),
        )
        .await;

        let body = json!({
            "event": "payment.captured",
            "payload": { "payment": { "entity": { "id": "pay_f", "order_id": "order_f" }}}
        })
        .to_string();
        let forged = sign_hmac_sha256("guess", body.as_bytes()).unwrap();
        let req = test::TestRequest::post()
            .uri("/api/payments/webhook")
            .insert_header((SIGNATURE_HEADER, forged))
            .insert_header(("content-type", "application/json"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "ok");

        let after = donations::Entity::find_by_id(donation.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.payment_status, PaymentStatus::Processing);
    }

    #[actix_web::test]
    async fn test_verify_mismatch_is_bad_request() {
        let db = setup_test_db().await;
        let donation = create_test_donation(&db, 300, None, PaymentStatus::Processing).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(payment_service(db)))
                .service(web::scope("/api").configure(payment_config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/payments/verify")
            .set_json(json!({
                "razorpay_order_id": "order_1",
                "razorpay_payment_id": "pay_1",
                "razorpay_signature": "00",
                "donationId": donation.id
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_SIGNATURE");
    }
}
