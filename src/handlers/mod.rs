pub mod analytics;
pub mod auth;
pub mod donation;
pub mod event;
pub mod gallery;
pub mod health;
pub mod payment;

pub use analytics::analytics_config;
pub use auth::auth_config;
pub use donation::donation_config;
pub use event::event_config;
pub use gallery::gallery_config;
pub use health::health_config;
pub use payment::payment_config;
