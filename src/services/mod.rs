pub mod analytics_service;
pub mod auth_service;
pub mod donation_service;
pub mod event_service;
pub mod gallery_service;
pub mod lookups;
pub mod payment_service;

pub use analytics_service::AnalyticsService;
pub use auth_service::AuthService;
pub use donation_service::DonationService;
pub use event_service::EventService;
pub use gallery_service::GalleryService;
pub use payment_service::PaymentService;
