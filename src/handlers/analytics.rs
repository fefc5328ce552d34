use crate::models::*;
use crate::services::AnalyticsService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/analytics/overview",
    tag = "analytics",
    params(
        ("period" = Option<String>, Query, description = "`7d`, `30d` (default), `90d`, `1y`; other values mean all time")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Dashboard figures for the period", body = OverviewResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn overview(
    analytics_service: web::Data<AnalyticsService>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse> {
    match analytics_service.overview(query.period.as_deref()).await {
        Ok(overview) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": overview
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/analytics/events/{event_id}",
    tag = "analytics",
    params(("event_id" = i64, Path, description = "Event id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Totals and daily progress for one event", body = EventAnalyticsResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn event_analytics(
    analytics_service: web::Data<AnalyticsService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match analytics_service.event(path.into_inner()).await {
        Ok(analytics) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": analytics
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn analytics_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/analytics")
            .route("/overview", web::get().to(overview))
            .route("/events/{event_id}", web::get().to(event_analytics)),
    );
}
