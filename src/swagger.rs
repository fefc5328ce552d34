use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    DonationType, EventCategory, EventStatus, GalleryCategory, PaymentStatus, UserRole,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::login,
        handlers::auth::verify,
        handlers::auth::setup,
        handlers::donation::create_donation,
        handlers::donation::public_donations,
        handlers::donation::admin_donations,
        handlers::donation::approve_donation,
        handlers::donation::reject_donation,
        handlers::donation::update_payment_status,
        handlers::event::public_events,
        handlers::event::public_event_detail,
        handlers::event::admin_events,
        handlers::event::create_event,
        handlers::event::update_event,
        handlers::event::delete_event,
        handlers::event::set_main_event,
        handlers::gallery::public_gallery,
        handlers::gallery::pinned_gallery,
        handlers::gallery::admin_gallery,
        handlers::gallery::create_gallery_item,
        handlers::gallery::update_gallery_item,
        handlers::gallery::delete_gallery_item,
        handlers::gallery::toggle_pin,
        handlers::payment::create_order,
        handlers::payment::verify_payment,
        handlers::payment::payment_webhook,
        handlers::analytics::overview,
        handlers::analytics::event_analytics,
    ),
    components(
        schemas(
            UserRole,
            EventStatus,
            EventCategory,
            DonationType,
            PaymentStatus,
            GalleryCategory,
            ImageRef,
            EventRef,
            UserRef,
            AdminNotesRequest,
            Pagination,
            LoginRequest,
            SetupRequest,
            UserResponse,
            AuthResponse,
            VerifyResponse,
            CreateDonationRequest,
            UpdatePaymentRequest,
            PaymentDetails,
            AdminActions,
            ReceiptDetails,
            DonationResponse,
            PublicDonationResponse,
            EventResponse,
            PublicEventsResponse,
            RecentDonation,
            EventDetailResponse,
            GalleryResponse,
            PinToggleResponse,
            CreateOrderRequest,
            CreateOrderResponse,
            VerifyPaymentRequest,
            DonationStats,
            OverviewStats,
            DailyTrend,
            TopEvent,
            RecentDonationSummary,
            OverviewResponse,
            EventAnalyticsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "auth", description = "Administrator login and setup"),
        (name = "donations", description = "Donation intake and review"),
        (name = "events", description = "Fundraising events"),
        (name = "gallery", description = "Photo gallery"),
        (name = "payments", description = "Razorpay orders, verification and webhook"),
        (name = "analytics", description = "Donation dashboard figures"),
    ),
    info(
        title = "Seva Backend API",
        version = "1.0.0",
        description = "Temple donations, events and gallery REST API"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
