pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod upload;

pub use auth::{AuthMiddleware, current_admin};
pub use cors::create_cors;
pub use rate_limit::RateLimiter;
pub use upload::{FormFields, UploadedForm, read_upload_form};
