use crate::middlewares::current_admin;
use crate::models::*;
use crate::services::DonationService;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn request_origin(req: &HttpRequest) -> RequestOrigin {
    RequestOrigin {
        ip_address: req.connection_info().realip_remote_addr().map(str::to_string),
        user_agent: req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

fn notes(body: Option<web::Json<AdminNotesRequest>>) -> Option<String> {
    body.and_then(|b| b.into_inner().notes)
}

#[utoipa::path(
    post,
    path = "/donations/create",
    tag = "donations",
    request_body = CreateDonationRequest,
    responses(
        (status = 201, description = "Donation recorded as pending", body = DonationResponse),
        (status = 400, description = "Invalid donor details, amount or event"),
        (status = 429, description = "Too many donation attempts")
    )
)]
pub async fn create_donation(
    donation_service: web::Data<DonationService>,
    req: HttpRequest,
    request: web::Json<CreateDonationRequest>,
) -> Result<HttpResponse> {
    match donation_service
        .create(request.into_inner(), request_origin(&req))
        .await
    {
        Ok(donation) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": donation,
            "message": "Donation created successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/donations/public",
    tag = "donations",
    params(
        ("eventId" = Option<i64>, Query, description = "Only donations to this event"),
        ("limit" = Option<u64>, Query, description = "Maximum items, default 10")
    ),
    responses(
        (status = 200, description = "Approved, paid, non-anonymous donations", body = [PublicDonationResponse])
    )
)]
pub async fn public_donations(
    donation_service: web::Data<DonationService>,
    query: web::Query<PublicDonationQuery>,
) -> Result<HttpResponse> {
    match donation_service.list_public(&query).await {
        Ok(donations) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": donations
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/donations/admin",
    tag = "donations",
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, default 50"),
        ("status" = Option<String>, Query, description = "Payment status or `all`"),
        ("eventId" = Option<String>, Query, description = "Event id or `all`"),
        ("approved" = Option<String>, Query, description = "`true` or `false`"),
        ("dateFrom" = Option<String>, Query, description = "Created on or after"),
        ("dateTo" = Option<String>, Query, description = "Created on or before"),
        ("search" = Option<String>, Query, description = "Name, e-mail or phone")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Paginated donations with totals"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn admin_donations(
    donation_service: web::Data<DonationService>,
    query: web::Query<AdminDonationQuery>,
) -> Result<HttpResponse> {
    match donation_service.list_admin(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/donations/admin/{id}/approve",
    tag = "donations",
    params(("id" = i64, Path, description = "Donation id")),
    request_body = AdminNotesRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Donation approved", body = DonationResponse),
        (status = 404, description = "Donation not found")
    )
)]
pub async fn approve_donation(
    donation_service: web::Data<DonationService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: Option<web::Json<AdminNotesRequest>>,
) -> Result<HttpResponse> {
    let admin = match current_admin(&req) {
        Ok(admin) => admin,
        Err(e) => return Ok(e.error_response()),
    };

    match donation_service
        .approve(path.into_inner(), admin.id, notes(body))
        .await
    {
        Ok(outcome) => {
            let message = if outcome.newly_approved {
                "Donation approved successfully"
            } else {
                "Donation was already approved"
            };
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": outcome.donation,
                "message": message
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/donations/admin/{id}/reject",
    tag = "donations",
    params(("id" = i64, Path, description = "Donation id")),
    request_body = AdminNotesRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Donation rejected", body = DonationResponse),
        (status = 404, description = "Donation not found")
    )
)]
pub async fn reject_donation(
    donation_service: web::Data<DonationService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: Option<web::Json<AdminNotesRequest>>,
) -> Result<HttpResponse> {
    let admin = match current_admin(&req) {
        Ok(admin) => admin,
        Err(e) => return Ok(e.error_response()),
    };

    match donation_service
        .reject(path.into_inner(), admin.id, notes(body))
        .await
    {
        Ok(donation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": donation,
            "message": "Donation rejected"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/donations/admin/{id}/payment",
    tag = "donations",
    params(("id" = i64, Path, description = "Donation id")),
    request_body = UpdatePaymentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Payment status updated", body = DonationResponse),
        (status = 404, description = "Donation not found")
    )
)]
pub async fn update_payment_status(
    donation_service: web::Data<DonationService>,
    path: web::Path<i64>,
    request: web::Json<UpdatePaymentRequest>,
) -> Result<HttpResponse> {
    match donation_service
        .update_payment(path.into_inner(), request.into_inner())
        .await
    {
        Ok(donation) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": donation,
            "message": "Payment status updated successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn donation_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/donations")
            .route("/create", web::post().to(create_donation))
            .route("/public", web::get().to(public_donations))
            .route("/admin", web::get().to(admin_donations))
            .route("/admin/{id}/approve", web::patch().to(approve_donation))
            .route("/admin/{id}/reject", web::patch().to(reject_donation))
            .route("/admin/{id}/payment", web::patch().to(update_payment_status)),
    );
}
