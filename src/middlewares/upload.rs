use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use crate::models::ImageRef;
use crate::utils::parse_datetime;
use actix_multipart::Multipart;
use actix_web::{HttpRequest, http::header, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub const IMAGE_FIELD: &str = "images";
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

const MAX_JSON_BODY: usize = 1024 * 1024;

/// Text fields of a write request, from either a multipart form or a JSON object.
///
/// Multipart values always arrive as strings, so every accessor also accepts the
/// string form of its type.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    values: Map<String, Value>,
}

impl FormFields {
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Like `text`, but blank strings count as absent.
    pub fn non_empty_text(&self, key: &str) -> Option<String> {
        self.text(key).filter(|s| !s.is_empty())
    }

    pub fn integer(&self, key: &str) -> AppResult<Option<i64>> {
        let invalid = || AppError::ValidationError(format!("{key} must be a whole number"));
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v) => Ok(Some(v)),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| Some(f as i64))
                    .ok_or_else(invalid),
            },
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    pub fn boolean(&self, key: &str) -> AppResult<Option<bool>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "true" | "1" | "on" | "yes" => Ok(Some(true)),
                "false" | "0" | "off" | "no" => Ok(Some(false)),
                _ => Err(AppError::ValidationError(format!("{key} must be true or false"))),
            },
            Some(_) => Err(AppError::ValidationError(format!(
                "{key} must be true or false"
            ))),
        }
    }

    /// Outer `None`: field absent. `Some(None)`: field sent empty or null, which clears it.
    pub fn datetime(&self, key: &str) -> AppResult<Option<Option<DateTime<Utc>>>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::Null) => Ok(Some(None)),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(Some(None)),
            Some(Value::String(s)) => parse_datetime(s.trim())
                .map(|dt| Some(Some(dt)))
                .ok_or_else(|| AppError::ValidationError(format!("{key} must be a valid date"))),
            Some(_) => Err(AppError::ValidationError(format!(
                "{key} must be a valid date"
            ))),
        }
    }

    /// Deserializes a string-valued enum such as a status or category.
    pub fn enumeration<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.non_empty_text(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_value(Value::String(raw.clone()))
                .map(Some)
                .map_err(|_| AppError::ValidationError(format!("Invalid {key}: {raw}"))),
        }
    }

    /// Image references passed inline, as a JSON array or its string encoding.
    pub fn images(&self, key: &str) -> AppResult<Option<Vec<ImageRef>>> {
        let invalid = || AppError::ValidationError(format!("{key} must be a list of images"));
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => serde_json::from_str(s).map(Some).map_err(|_| invalid()),
            Some(v @ Value::Array(_)) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadedForm {
    pub fields: FormFields,
    /// Files from the `images` field, in upload order.
    pub images: Vec<ImageRef>,
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Reads a create/update body: multipart with optional image files, or plain JSON.
pub async fn read_upload_form(
    req: &HttpRequest,
    payload: web::Payload,
    limits: &UploadConfig,
) -> AppResult<UploadedForm> {
    if is_multipart(req) {
        read_multipart(req, payload, limits).await
    } else {
        read_json(payload).await
    }
}

async fn read_json(mut payload: web::Payload) -> AppResult<UploadedForm> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::ValidationError(format!("Invalid body: {e}")))?;
        if body.len() + chunk.len() > MAX_JSON_BODY {
            return Err(AppError::ValidationError("Request body too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UploadedForm::default());
    }

    match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => Ok(UploadedForm {
            fields: FormFields::from_map(map),
            images: Vec::new(),
        }),
        Ok(_) => Err(AppError::ValidationError(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(AppError::ValidationError(format!("Invalid JSON body: {e}"))),
    }
}

async fn read_multipart(
    req: &HttpRequest,
    payload: web::Payload,
    limits: &UploadConfig,
) -> AppResult<UploadedForm> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut values = Map::new();
    let mut images = Vec::new();

    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart body: {e}")))?
    {
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or_default().to_string(),
                cd.get_filename().map(str::to_string),
            ),
            None => (String::new(), None),
        };

        if name == IMAGE_FIELD && filename.is_some() {
            if images.len() >= limits.max_files {
                return Err(AppError::TooManyFiles(limits.max_files));
            }
            let mime = field
                .content_type()
                .map(|m| m.essence_str().to_ascii_lowercase())
                .unwrap_or_default();
            if !ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) {
                return Err(AppError::InvalidFileType(
                    "Invalid file type. Only JPEG, PNG and WebP are allowed.".to_string(),
                ));
            }

            let mut data = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| AppError::ValidationError(format!("Upload interrupted: {e}")))?
            {
                if data.len() + chunk.len() > limits.max_file_size {
                    return Err(AppError::FileTooLarge(format!(
                        "File too large. Maximum size is {} MB.",
                        limits.max_file_size / (1024 * 1024)
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            images.push(to_image_ref(&mime, &data, filename.unwrap_or_default()));
            continue;
        }

        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::ValidationError(format!("Invalid multipart body: {e}")))?
        {
            if data.len() + chunk.len() > MAX_JSON_BODY {
                return Err(AppError::ValidationError(format!("Field {name} is too large")));
            }
            data.extend_from_slice(&chunk);
        }
        if !name.is_empty() {
            let text = String::from_utf8_lossy(&data).into_owned();
            values.insert(name, Value::String(text));
        }
    }

    log::debug!("multipart form read: {} fields, {} images", values.len(), images.len());
    Ok(UploadedForm {
        fields: FormFields::from_map(values),
        images,
    })
}

fn to_image_ref(mime: &str, data: &[u8], alt: String) -> ImageRef {
    ImageRef {
        url: format!("data:{mime};base64,{}", STANDARD.encode(data)),
        alt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::FromRequest;
    use actix_web::test::TestRequest;
    use serde_json::json;

    fn fields(value: Value) -> FormFields {
        match value {
            Value::Object(map) => FormFields::from_map(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_string_values_are_coerced() {
        let f = fields(json!({
            "targetAmount": "50000",
            "priority": 7,
            "isMainEvent": "true",
            "isPublic": false,
            "eventDate": "2024-11-01",
            "endDate": "",
            "status": "paused",
        }));
        assert_eq!(f.integer("targetAmount").unwrap(), Some(50_000));
        assert_eq!(f.integer("priority").unwrap(), Some(7));
        assert_eq!(f.boolean("isMainEvent").unwrap(), Some(true));
        assert_eq!(f.boolean("isPublic").unwrap(), Some(false));
        assert!(matches!(f.datetime("eventDate").unwrap(), Some(Some(_))));
        assert_eq!(f.datetime("endDate").unwrap(), Some(None));
        assert_eq!(f.datetime("missing").unwrap(), None);
        assert_eq!(
            f.enumeration::<crate::entities::EventStatus>("status").unwrap(),
            Some(crate::entities::EventStatus::Paused)
        );
    }

    #[test]
    fn test_bad_values_are_validation_errors() {
        let f = fields(json!({ "amount": "ten", "flag": "maybe", "status": "archived" }));
        assert!(matches!(f.integer("amount"), Err(AppError::ValidationError(_))));
        assert!(matches!(f.boolean("flag"), Err(AppError::ValidationError(_))));
        assert!(
            f.enumeration::<crate::entities::EventStatus>("status")
                .is_err()
        );
    }

    #[test]
    fn test_image_ref_is_data_uri() {
        let img = to_image_ref("image/png", b"abc", "lamp.png".to_string());
        assert_eq!(img.url, "data:image/png;base64,YWJj");
        assert_eq!(img.alt, "lamp.png");
    }

    const BOUNDARY: &str = "sevaformboundary";

    struct Part<'a> {
        name: &'a str,
        file: Option<(&'a str, &'a str)>,
        data: &'a [u8],
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part.file {
                Some((filename, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                ),
            }
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn upload(parts: &[Part<'_>], limits: &UploadConfig) -> AppResult<UploadedForm> {
        let (req, mut pl) = TestRequest::post()
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
            .to_http_parts();
        let payload = web::Payload::from_request(&req, &mut pl).await.unwrap();
        read_upload_form(&req, payload, limits).await
    }

    async fn envelope(err: AppError) -> (actix_web::http::StatusCode, Value) {
        use actix_web::ResponseError;
        let resp = err.error_response();
        let status = resp.status();
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn small_limits() -> UploadConfig {
        UploadConfig {
            max_files: 2,
            max_file_size: 16,
        }
    }

    fn image<'a>(filename: &'a str, data: &'a [u8]) -> Part<'a> {
        Part {
            name: IMAGE_FIELD,
            file: Some((filename, "image/png")),
            data,
        }
    }

    #[actix_web::test]
    async fn test_multipart_form_with_images() {
        let form = upload(
            &[
                Part {
                    name: "title",
                    file: None,
                    data: b" Deepotsav ",
                },
                image("diya.png", b"abc"),
            ],
            &small_limits(),
        )
        .await
        .unwrap();
        assert_eq!(form.fields.text("title").as_deref(), Some("Deepotsav"));
        assert_eq!(form.images.len(), 1);
        assert_eq!(form.images[0].url, "data:image/png;base64,YWJj");
        assert_eq!(form.images[0].alt, "diya.png");
    }

    #[actix_web::test]
    async fn test_one_file_over_the_count_limit() {
        let err = upload(
            &[image("a.png", b"a"), image("b.png", b"b"), image("c.png", b"c")],
            &small_limits(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::TooManyFiles(2)));

        let (status, body) = envelope(err).await;
        assert_eq!(status, actix_web::http::StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "TOO_MANY_FILES");
    }

    #[actix_web::test]
    async fn test_non_image_file_is_rejected() {
        let err = upload(
            &[Part {
                name: IMAGE_FIELD,
                file: Some(("notes.txt", "text/plain")),
                data: b"hello",
            }],
            &small_limits(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));

        let (status, body) = envelope(err).await;
        assert_eq!(status, actix_web::http::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILE_TYPE");
        assert_eq!(
            body["message"],
            "Invalid file type. Only JPEG, PNG and WebP are allowed."
        );
    }

    #[actix_web::test]
    async fn test_file_over_the_size_limit() {
        let err = upload(&[image("big.png", &[7u8; 17])], &small_limits())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FileTooLarge(_)));

        let (status, body) = envelope(err).await;
        assert_eq!(status, actix_web::http::StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "FILE_TOO_LARGE");

        // Exactly at the limit is fine.
        let form = upload(&[image("ok.png", &[7u8; 16])], &small_limits())
            .await
            .unwrap();
        assert_eq!(form.images.len(), 1);
    }

    #[test]
    fn test_multipart_detection() {
        let req = TestRequest::default()
            .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=xyz"))
            .to_http_request();
        assert!(is_multipart(&req));
        let req = TestRequest::default()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .to_http_request();
        assert!(!is_multipart(&req));
    }
}
