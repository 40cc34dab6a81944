//! Business logic services, sitting between the HTTP routes and the
//! repositories.

pub mod auth;
pub mod orders;
pub mod reports;
pub mod tokens;
