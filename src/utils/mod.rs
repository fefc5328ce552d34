pub mod datetime;
pub mod jwt;
pub mod password;
pub mod phone;
pub mod receipt;
pub mod slug;

pub use datetime::parse_datetime;
pub use jwt::*;
pub use password::*;
pub use phone::*;
pub use receipt::generate_receipt_number;
pub use slug::{slug_candidate, slugify};
