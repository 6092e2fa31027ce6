pub mod auth;
pub mod request_id;

pub use auth::{ApiAuth, AuthUser};
pub use request_id::{RequestId, RequestIdMiddleware};
