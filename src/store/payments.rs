//! Payment repository and billing aggregates

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use super::Store;
use crate::core::validators::is_valid_reference_month;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::*;

#[derive(Debug, Deserialize)]
pub struct NewPayment {
    pub member_id: u64,
    /// `YYYY-MM`
    pub reference_month: String,
    /// Defaults to the member's plan price when omitted
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentPatch {
    pub reference_month: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

impl Store {
    pub fn create_payment(&self, new: NewPayment) -> AppResult<Payment> {
        if !is_valid_reference_month(&new.reference_month) {
            return Err(AppError::invalid_month(&new.reference_month));
        }
        let member = self
            .members
            .get(new.member_id)
            .ok_or_else(|| AppError::not_found("Member", new.member_id))?;

        let amount = match new.amount {
            Some(a) if a < 0.0 => {
                return Err(AppError::out_of_range("Payment amount must be non-negative"))
            }
            Some(a) => a,
            None => member
                .plan_id
                .and_then(|pid| self.plans.get(pid))
                .map(|p| p.price)
                .ok_or_else(|| {
                    AppError::bad_request("Member has no plan; an explicit amount is required")
                })?,
        };

        let now = Utc::now();
        Ok(self.payments.insert_with(|id| Payment {
            id,
            member_id: new.member_id,
            reference_month: new.reference_month.clone(),
            amount,
            status: PaymentStatus::Pending,
            paid_at: None,
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    pub fn update_payment(&self, id: u64, patch: PaymentPatch) -> AppResult<Payment> {
        if let Some(month) = &patch.reference_month {
            if !is_valid_reference_month(month) {
                return Err(AppError::invalid_month(month));
            }
        }
        if matches!(patch.amount, Some(a) if a < 0.0) {
            return Err(AppError::out_of_range("Payment amount must be non-negative"));
        }

        self.payments
            .update(id, |p| {
                if let Some(month) = &patch.reference_month {
                    p.reference_month = month.clone();
                }
                if let Some(amount) = patch.amount {
                    p.amount = amount;
                }
                if let Some(status) = patch.status {
                    p.status = status;
                    if status != PaymentStatus::Paid {
                        p.paid_at = None;
                    }
                }
                if patch.notes.is_some() {
                    p.notes = patch.notes.clone();
                }
                p.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("Payment", id))
    }

    /// Mark a payment as paid, stamping `paid_at`
    pub fn settle_payment(&self, id: u64, now: DateTime<Utc>) -> AppResult<Payment> {
        self.payments
            .update(id, |p| {
                p.status = PaymentStatus::Paid;
                p.paid_at = Some(now);
                p.updated_at = now;
            })
            .ok_or_else(|| AppError::not_found("Payment", id))
    }

    pub fn delete_payment(&self, id: u64) -> AppResult<()> {
        self.payments
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Payment", id))
    }

    pub fn search_payments(
        &self,
        member_id: Option<u64>,
        status: Option<PaymentStatus>,
        reference_month: Option<&str>,
    ) -> Vec<Payment> {
        self.payments.filter(|p| {
            member_id.map_or(true, |m| p.member_id == m)
                && status.map_or(true, |s| p.status == s)
                && reference_month.map_or(true, |r| p.reference_month == r)
        })
    }

    /// Sum of settled payments with `paid_at` inside `[start, end)`
    pub fn revenue_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
        self.payments
            .filter(|p| {
                p.status == PaymentStatus::Paid
                    && p.paid_at.map_or(false, |t| t >= start && t < end)
            })
            .iter()
            .map(|p| p.amount)
            .sum()
    }

    /// Settled revenue per calendar month of `year`, index 0 = January
    pub fn revenue_by_month(&self, year: i32) -> [f64; 12] {
        let mut months = [0.0f64; 12];
        for p in self.payments.filter(|p| p.status == PaymentStatus::Paid) {
            if let Some(paid_at) = p.paid_at {
                if paid_at.year() == year {
                    months[paid_at.month0() as usize] += p.amount;
                }
            }
        }
        months
    }

    pub fn overdue_payment_count(&self) -> usize {
        self.payments.count(|p| p.status == PaymentStatus::Overdue)
    }

    /// Everything that was actually billed (cancelled charges excluded)
    pub fn billed_payment_count(&self) -> usize {
        self.payments.count(|p| p.status != PaymentStatus::Cancelled)
    }
}
