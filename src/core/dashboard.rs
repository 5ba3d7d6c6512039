//! Dashboard aggregation queries
//!
//! The manager dashboard numbers: member counts, revenue windows, class
//! occupancy and delinquency. Pure calculations over the store with an
//! explicit `now` so tests can pin the clock.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::models::types::ClassStatus;
use crate::store::Store;

/// Occupancy of one active class
#[derive(Debug, Clone, Serialize)]
pub struct ClassOccupancy {
    pub class_id: u64,
    pub capacity: u32,
    pub enrolled: usize,
    /// Active enrollments over capacity, as a percentage
    pub occupancy_percent: f64,
}

/// Everything the manager dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub active_members: usize,
    pub monthly_revenue: f64,
    pub new_members_30d: usize,
    /// Settled revenue per month of the current year, index 0 = January
    pub monthly_revenue_series: Vec<f64>,
    pub class_occupancy: Vec<ClassOccupancy>,
    /// Overdue over billed payments, as a percentage
    pub delinquency_rate: f64,
}

/// Compute the full dashboard snapshot
pub fn dashboard_metrics(store: &Store, now: DateTime<Utc>) -> DashboardMetrics {
    DashboardMetrics {
        active_members: store.active_member_count(),
        monthly_revenue: monthly_revenue(store, now),
        new_members_30d: store.members_enrolled_since(now - Duration::days(30)),
        monthly_revenue_series: store.revenue_by_month(now.year()).to_vec(),
        class_occupancy: class_occupancy(store),
        delinquency_rate: delinquency_rate(store),
    }
}

/// Settled revenue inside the calendar month containing `now`
pub fn monthly_revenue(store: &Store, now: DateTime<Utc>) -> f64 {
    let month_start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let next_month_start = if now.month() == 12 {
        Utc.with_ymd_and_hms(now.year() + 1, 1, 1, 0, 0, 0)
    } else {
        Utc.with_ymd_and_hms(now.year(), now.month() + 1, 1, 0, 0, 0)
    }
    .single()
    .unwrap_or(now);

    store.revenue_between(month_start, next_month_start)
}

/// Active enrollments over capacity for every active class.
/// A zero-capacity class reports 0.0 rather than dividing by zero.
pub fn class_occupancy(store: &Store) -> Vec<ClassOccupancy> {
    store
        .classes
        .filter(|c| c.status == ClassStatus::Active)
        .into_iter()
        .map(|class| {
            let enrolled = store.active_enrollment_count(class.id);
            let occupancy_percent = if class.capacity == 0 {
                0.0
            } else {
                enrolled as f64 / class.capacity as f64 * 100.0
            };
            ClassOccupancy {
                class_id: class.id,
                capacity: class.capacity,
                enrolled,
                occupancy_percent,
            }
        })
        .collect()
}

/// Overdue payments over billed (non-cancelled) payments, as a percentage.
/// No billed payments means no delinquency.
pub fn delinquency_rate(store: &Store) -> f64 {
    let billed = store.billed_payment_count();
    if billed == 0 {
        return 0.0;
    }
    store.overdue_payment_count() as f64 / billed as f64 * 100.0
}
