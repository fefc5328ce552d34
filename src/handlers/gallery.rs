use crate::config::UploadConfig;
use crate::error::AppResult;
use crate::middlewares::{UploadedForm, current_admin, read_upload_form};
use crate::models::*;
use crate::services::GalleryService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

fn gallery_input(form: UploadedForm) -> AppResult<GalleryInput> {
    let fields = &form.fields;
    let description = fields.contains("description").then(|| fields.non_empty_text("description"));
    let event_id = if fields.contains("eventId") {
        Some(fields.integer("eventId")?)
    } else {
        None
    };
    Ok(GalleryInput {
        title: fields.text("title"),
        description,
        category: fields.enumeration("category")?,
        is_public: fields.boolean("isPublic")?,
        event_id,
        date: fields.datetime("date")?.flatten(),
        location: fields.non_empty_text("location"),
        images: Some(form.images),
    })
}

async fn read_gallery_form(
    req: &HttpRequest,
    payload: web::Payload,
    upload_config: &UploadConfig,
) -> AppResult<GalleryInput> {
    read_upload_form(req, payload, upload_config)
        .await
        .and_then(gallery_input)
}

#[utoipa::path(
    get,
    path = "/gallery/public",
    tag = "gallery",
    params(
        ("category" = Option<String>, Query, description = "Category or `all`"),
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, default 12")
    ),
    responses(
        (status = 200, description = "Paginated public gallery")
    )
)]
pub async fn public_gallery(
    gallery_service: web::Data<GalleryService>,
    query: web::Query<GalleryQuery>,
) -> Result<HttpResponse> {
    match gallery_service.list_public(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/gallery/public/pinned",
    tag = "gallery",
    responses(
        (status = 200, description = "Pinned public items, at most 6", body = [GalleryResponse])
    )
)]
pub async fn pinned_gallery(gallery_service: web::Data<GalleryService>) -> Result<HttpResponse> {
    match gallery_service.list_pinned().await {
        Ok(items) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": items
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/gallery/admin",
    tag = "gallery",
    params(
        ("category" = Option<String>, Query, description = "Category or `all`"),
        ("search" = Option<String>, Query, description = "Title, description or location"),
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("limit" = Option<u64>, Query, description = "Page size, default 20")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Paginated gallery"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn admin_gallery(
    gallery_service: web::Data<GalleryService>,
    query: web::Query<GalleryQuery>,
) -> Result<HttpResponse> {
    match gallery_service.list_admin(&query).await {
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
    path = "/gallery/admin",
    tag = "gallery",
    request_body(content = String, content_type = "multipart/form-data", description = "Item fields plus at least one `images` file"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Gallery item created", body = GalleryResponse),
        (status = 400, description = "No images or invalid fields")
    )
)]
pub async fn create_gallery_item(
    gallery_service: web::Data<GalleryService>,
    upload_config: web::Data<UploadConfig>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let admin = match current_admin(&req) {
        Ok(admin) => admin,
        Err(e) => return Ok(e.error_response()),
    };
    let input = match read_gallery_form(&req, payload, &upload_config).await {
        Ok(input) => input,
        Err(e) => return Ok(e.error_response()),
    };

    match gallery_service.create(input, admin.id).await {
        Ok(item) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": item,
            "message": "Gallery item created successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/gallery/admin/{id}",
    tag = "gallery",
    params(("id" = i64, Path, description = "Gallery item id")),
    request_body(content = String, content_type = "multipart/form-data", description = "Changed fields plus optional replacement `images`"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Gallery item updated", body = GalleryResponse),
        (status = 404, description = "Gallery item not found")
    )
)]
pub async fn update_gallery_item(
    gallery_service: web::Data<GalleryService>,
    upload_config: web::Data<UploadConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let input = match read_gallery_form(&req, payload, &upload_config).await {
        Ok(input) => input,
        Err(e) => return Ok(e.error_response()),
    };

    match gallery_service.update(path.into_inner(), input).await {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": item,
            "message": "Gallery item updated successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/gallery/admin/{id}",
    tag = "gallery",
    params(("id" = i64, Path, description = "Gallery item id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Gallery item deleted"),
        (status = 404, description = "Gallery item not found")
    )
)]
pub async fn delete_gallery_item(
    gallery_service: web::Data<GalleryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match gallery_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Gallery item deleted successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/gallery/admin/{id}/pin",
    tag = "gallery",
    params(("id" = i64, Path, description = "Gallery item id")),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pin state toggled", body = PinToggleResponse),
        (status = 400, description = "Six items are already pinned"),
        (status = 404, description = "Gallery item not found")
    )
)]
pub async fn toggle_pin(
    gallery_service: web::Data<GalleryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match gallery_service.toggle_pin(path.into_inner()).await {
        Ok(result) => {
            let message = if result.is_pinned {
                "Image pinned successfully"
            } else {
                "Image unpinned successfully"
            };
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": result,
                "message": message
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn gallery_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gallery")
            .route("/public", web::get().to(public_gallery))
            .route("/public/pinned", web::get().to(pinned_gallery))
            .route("/admin", web::get().to(admin_gallery))
            .route("/admin", web::post().to(create_gallery_item))
            .route("/admin/{id}", web::put().to(update_gallery_item))
            .route("/admin/{id}", web::delete().to(delete_gallery_item))
            .route("/admin/{id}/pin", web::patch().to(toggle_pin)),
    );
}
