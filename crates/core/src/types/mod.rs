//! Core types for Tamarind.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod email;
pub mod id;
pub mod phone;
pub mod status;

pub use credential::RefreshCredential;
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use status::{OrderStatus, OrderStatusError};
