//! Domain models shared between repositories, services, and routes.

pub mod menu;
pub mod order;
pub mod report;
pub mod user;

pub use menu::{Category, MenuItem};
pub use order::{Order, OrderItem};
pub use report::{RevenueReport, SalesReport, SalesReportItem};
pub use user::{AuthUser, User};
