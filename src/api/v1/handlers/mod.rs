pub mod authorize;
pub mod health;
pub mod session;
pub mod users;
pub mod webhooks;
