//! Plan repository

use chrono::Utc;
use serde::Deserialize;

use super::Store;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::Plan;

#[derive(Debug, Deserialize)]
pub struct NewPlan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub duration_months: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration_months: Option<u32>,
    pub active: Option<bool>,
}

impl Store {
    pub fn create_plan(&self, new: NewPlan) -> AppResult<Plan> {
        if new.price < 0.0 {
            return Err(AppError::out_of_range("Plan price must be non-negative"));
        }
        if new.duration_months == 0 {
            return Err(AppError::out_of_range("Plan duration must be at least one month"));
        }

        let now = Utc::now();
        Ok(self.plans.insert_with(|id| Plan {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            duration_months: new.duration_months,
            active: true,
            created_at: now,
            updated_at: now,
        }))
    }

    pub fn update_plan(&self, id: u64, patch: PlanPatch) -> AppResult<Plan> {
        if matches!(patch.price, Some(p) if p < 0.0) {
            return Err(AppError::out_of_range("Plan price must be non-negative"));
        }
        if matches!(patch.duration_months, Some(0)) {
            return Err(AppError::out_of_range("Plan duration must be at least one month"));
        }

        self.plans
            .update(id, |p| {
                if let Some(name) = &patch.name {
                    p.name = name.clone();
                }
                if patch.description.is_some() {
                    p.description = patch.description.clone();
                }
                if let Some(price) = patch.price {
                    p.price = price;
                }
                if let Some(months) = patch.duration_months {
                    p.duration_months = months;
                }
                if let Some(active) = patch.active {
                    p.active = active;
                }
                p.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("Plan", id))
    }

    /// A plan with members on it cannot be deleted, only deactivated.
    pub fn delete_plan(&self, id: u64) -> AppResult<()> {
        self.plans.get(id).ok_or_else(|| AppError::not_found("Plan", id))?;
        let member_count = self.members.count(|m| m.plan_id == Some(id));
        if member_count > 0 {
            return Err(AppError::row_in_use(format!(
                "Plan {} still has {} member(s)",
                id, member_count
            )));
        }
        self.plans.remove(id);
        Ok(())
    }

    pub fn active_plans(&self) -> Vec<Plan> {
        self.plans.filter(|p| p.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::members::NewMember;
    use chrono::NaiveDate;

    #[test]
    fn test_create_and_list_active() {
        let store = Store::new();
        let plan = store
            .create_plan(NewPlan {
                name: "Monthly".to_string(),
                description: None,
                price: 100.0,
                duration_months: 1,
            })
            .unwrap();
        store.update_plan(plan.id, PlanPatch { active: Some(false), ..Default::default() }).unwrap();
        assert!(store.active_plans().is_empty());
    }

    #[test]
    fn test_negative_price_rejected() {
        let store = Store::new();
        let err = store
            .create_plan(NewPlan {
                name: "Bad".to_string(),
                description: None,
                price: -1.0,
                duration_months: 1,
            })
            .unwrap_err();
        assert_eq!(err.code_str(), "VAL_OUT_OF_RANGE");
    }

    #[test]
    fn test_delete_plan_in_use() {
        let store = Store::new();
        let plan = store
            .create_plan(NewPlan {
                name: "Monthly".to_string(),
                description: None,
                price: 100.0,
                duration_months: 1,
            })
            .unwrap();
        store
            .create_member(NewMember {
                name: "Ana".to_string(),
                email: "a@b.com".to_string(),
                cpf: "123.456.789-09".to_string(),
                phone: None,
                birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
                address: None,
                photo_url: None,
                height_m: None,
                weight_kg: None,
                goal: None,
                notes: None,
                plan_id: Some(plan.id),
            })
            .unwrap();

        assert_eq!(store.delete_plan(plan.id).unwrap_err().code_str(), "STORE_ROW_IN_USE");
    }
}
