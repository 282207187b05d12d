pub mod authorizer_event;
pub mod clerk_webhook;
pub mod users;
