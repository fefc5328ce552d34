use crate::config::UploadConfig;
use crate::error::AppResult;
use crate::middlewares::{UploadedForm, current_admin, read_upload_form};
use crate::models::*;
use crate::services::EventService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// Newly uploaded files replace the image list; otherwise an inline `images`
/// array may be sent.
fn event_input(form: UploadedForm) -> AppResult<EventInput> {
    let fields = &form.fields;
    let images = if form.images.is_empty() {
        fields.images("images")?
    } else {
        Some(form.images)
    };
    Ok(EventInput {
        title: fields.text("title"),
        description: fields.text("description"),
        target_amount: fields.integer("targetAmount")?,
        status: fields.enumeration("status")?,
        priority: fields
            .integer("priority")?
            .map(|p| i32::try_from(p).unwrap_or(i32::MAX)),
        is_main_event: fields.boolean("isMainEvent")?,
        event_date: fields.datetime("eventDate")?,
        end_date: fields.datetime("endDate")?,
        location: fields.non_empty_text("location"),
        category: fields.enumeration("category")?,
        images,
    })
}

#[utoipa::path(
    get,
    path = "/events/public",
    tag = "events",
    responses(
        (status = 200, description = "Main event and other running events", body = PublicEventsResponse)
    )
)]
pub async fn public_events(event_service: web::Data<EventService>) -> Result<HttpResponse> {
    match event_service.list_public().await {
        Ok(events) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": events
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/public/{slug}",
    tag = "events",
    params(("slug" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Event with recent donations", body = EventDetailResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn public_event_detail(
    event_service: web::Data<EventService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match event_service.get_public_by_slug(&path).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/events/admin",
    tag = "events",
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, default 20"),
        ("status" = Option<String>, Query, description = "Event status or `all`"),
        ("search" = Option<String>, Query, description = "Title or description")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Paginated events"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn admin_events(
    event_service: web::Data<EventService>,
    query: web::Query<AdminEventQuery>,
) -> Result<HttpResponse> {
    match event_service.list_admin(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/admin",
    tag = "events",
    request_body(content = String, content_type = "multipart/form-data", description = "Event fields plus `images` files"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Invalid fields or upload")
    )
)]
pub async fn create_event(
    event_service: web::Data<EventService>,
    upload_config: web::Data<UploadConfig>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let admin = match current_admin(&req) {
        Ok(admin) => admin,
        Err(e) => return Ok(e.error_response()),
    };
    let input = match read_upload_form(&req, payload, &upload_config)
        .await
        .and_then(event_input)
    {
        Ok(input) => input,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service.create(input, admin.id).await {
        Ok(event) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": event,
            "message": "Event created successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/events/admin/{id}",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    request_body(content = String, content_type = "multipart/form-data", description = "Changed fields plus optional `images` files"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn update_event(
    event_service: web::Data<EventService>,
    upload_config: web::Data<UploadConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let input = match read_upload_form(&req, payload, &upload_config)
        .await
        .and_then(event_input)
    {
        Ok(input) => input,
        Err(e) => return Ok(e.error_response()),
    };

    match event_service.update(path.into_inner(), input).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event,
            "message": "Event updated successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/events/admin/{id}",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn delete_event(
    event_service: web::Data<EventService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Event deleted successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/events/admin/{id}/main",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event is now the main event", body = EventResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn set_main_event(
    event_service: web::Data<EventService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match event_service.set_main(path.into_inner()).await {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": event,
            "message": "Main event updated successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn event_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("/public", web::get().to(public_events))
            .route("/public/{slug}", web::get().to(public_event_detail))
            .route("/admin", web::get().to(admin_events))
            .route("/admin", web::post().to(create_event))
            .route("/admin/{id}", web::put().to(update_event))
            .route("/admin/{id}", web::delete().to(delete_event))
            .route("/admin/{id}/main", web::patch().to(set_main_event)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EventCategory, EventStatus};
    use crate::middlewares::FormFields;

    #[test]
    fn test_event_input_from_multipart_strings() {
        let map = match json!({
            "title": "  Maha Shivratri ",
            "description": "Night-long abhishekam",
            "targetAmount": "250000",
            "priority": "8",
            "isMainEvent": "true",
            "status": "draft",
            "category": "Seva",
            "endDate": "",
            "location": ""
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let input = event_input(UploadedForm {
            fields: FormFields::from_map(map),
            images: vec![ImageRef {
                url: "data:image/png;base64,AAAA".to_string(),
                alt: "shivling.png".to_string(),
            }],
        })
        .unwrap();

        assert_eq!(input.title.as_deref(), Some("Maha Shivratri"));
        assert_eq!(input.target_amount, Some(250_000));
        assert_eq!(input.priority, Some(8));
        assert_eq!(input.is_main_event, Some(true));
        assert_eq!(input.status, Some(EventStatus::Draft));
        assert_eq!(input.category, Some(EventCategory::Seva));
        assert_eq!(input.end_date, Some(None));
        assert_eq!(input.event_date, None);
        assert_eq!(input.location, None);
        assert_eq!(input.images.unwrap().len(), 1);
    }

    #[test]
    fn test_event_input_without_uploads_leaves_images_alone() {
        let input = event_input(UploadedForm::default()).unwrap();
        assert!(input.images.is_none());
        assert!(input.title.is_none());
    }
}
