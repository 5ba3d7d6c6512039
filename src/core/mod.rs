//! Core module - domain logic
//!
//! CPF checksum validation, credential digests, field validators and the
//! dashboard aggregations. Everything here is framework-free.

pub mod cpf;
pub mod dashboard;
pub mod password;
pub mod validators;

pub use dashboard::{dashboard_metrics, ClassOccupancy, DashboardMetrics};
pub use password::PasswordHash;
