pub mod analytics;
pub mod common;
pub mod donation;
pub mod event;
pub mod gallery;
pub mod pagination;
pub mod payment;
pub mod user;

pub use analytics::*;
pub use common::*;
pub use donation::*;
pub use event::*;
pub use gallery::*;
pub use pagination::*;
pub use payment::*;
pub use user::*;
