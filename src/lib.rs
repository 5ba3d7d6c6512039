//! GymFlow Library
//!
//! Gym management service: role-based staff accounts, member records with
//! CPF validation, plans, class scheduling with capacity-checked
//! enrollment, payment tracking and the manager dashboard aggregations,
//! all exposed over a REST JSON API.

pub mod api;
pub mod core;
pub mod models;
pub mod store;
pub mod utils;

pub use crate::api::{create_router, start_cleanup_task};
pub use crate::core::cpf;
pub use crate::core::dashboard::{dashboard_metrics, DashboardMetrics};
pub use crate::core::password::PasswordHash;
pub use crate::models::config::AppConfig;
pub use crate::models::errors::{AppError, AppResult, ErrorCode};
pub use crate::store::{SessionStore, Store};
pub use crate::utils::metrics::{MetricsCollector, MetricsSnapshot};
