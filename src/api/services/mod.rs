pub mod escola;
pub mod health;

pub use escola::{AppServices, v1_routes};
pub use health::{AppStartTime, HealthService, health_routes};
