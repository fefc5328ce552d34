pub mod donations;
pub mod events;
pub mod gallery_items;
pub mod users;

pub use donations as donation_entity;
pub use events as event_entity;
pub use gallery_items as gallery_entity;
pub use users as user_entity;

pub use donations::{DonationType, PaymentStatus};
pub use events::{EventCategory, EventStatus};
pub use gallery_items::GalleryCategory;
pub use users::UserRole;
