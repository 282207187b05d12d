//! Request authorizer for the learning platform API.
//!
//! Verifies identity-provider session tokens (bearer header or session cookie), turns
//! them into a principal and a resource-scoped allow policy, and hands the principal to
//! downstream handlers through request extensions.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
