//! Authentication extractors and the silent token-refresh layer.

pub mod auth;
pub mod token_refresh;

pub use auth::{RequireAdmin, RequireAuth};
pub use token_refresh::token_refresh;
