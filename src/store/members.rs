//! Member repository
//!
//! CPF and email uniqueness live here; syntax/checksum validation is the
//! caller's job (see api::handlers::members).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::Store;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::*;

#[derive(Debug, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub height_m: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub goal: Option<TrainingGoal>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub plan_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub height_m: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<TrainingGoal>,
    pub notes: Option<String>,
    pub plan_id: Option<u64>,
    pub status: Option<MemberStatus>,
}

impl Store {
    fn member_email_taken(&self, email: &str, exclude: Option<u64>) -> bool {
        self.members
            .find(|m| m.email.eq_ignore_ascii_case(email) && Some(m.id) != exclude)
            .is_some()
    }

    fn member_cpf_taken(&self, cpf: &str, exclude: Option<u64>) -> bool {
        self.members
            .find(|m| m.cpf == cpf && Some(m.id) != exclude)
            .is_some()
    }

    /// Insert a member. `new.cpf` must already be in canonical form.
    pub fn create_member(&self, new: NewMember) -> AppResult<Member> {
        if self.member_email_taken(&new.email, None) {
            return Err(AppError::duplicate_email(&new.email));
        }
        if self.member_cpf_taken(&new.cpf, None) {
            return Err(AppError::duplicate_cpf(&new.cpf));
        }
        if let Some(plan_id) = new.plan_id {
            self.plans
                .get(plan_id)
                .ok_or_else(|| AppError::not_found("Plan", plan_id))?;
        }

        let now = Utc::now();
        Ok(self.members.insert_with(|id| Member {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            cpf: new.cpf.clone(),
            phone: new.phone.clone(),
            birth_date: new.birth_date,
            address: new.address.clone(),
            photo_url: new.photo_url.clone(),
            height_m: new.height_m,
            weight_kg: new.weight_kg,
            goal: new.goal,
            notes: new.notes.clone(),
            plan_id: new.plan_id,
            status: MemberStatus::Active,
            enrolled_at: now,
            updated_at: now,
        }))
    }

    pub fn update_member(&self, id: u64, patch: MemberPatch) -> AppResult<Member> {
        self.members.get(id).ok_or_else(|| AppError::not_found("Member", id))?;

        if let Some(email) = &patch.email {
            if self.member_email_taken(email, Some(id)) {
                return Err(AppError::duplicate_email(email));
            }
        }
        if let Some(cpf) = &patch.cpf {
            if self.member_cpf_taken(cpf, Some(id)) {
                return Err(AppError::duplicate_cpf(cpf));
            }
        }
        if let Some(plan_id) = patch.plan_id {
            self.plans
                .get(plan_id)
                .ok_or_else(|| AppError::not_found("Plan", plan_id))?;
        }

        self.members
            .update(id, |m| {
                if let Some(name) = &patch.name {
                    m.name = name.clone();
                }
                if let Some(email) = &patch.email {
                    m.email = email.clone();
                }
                if let Some(cpf) = &patch.cpf {
                    m.cpf = cpf.clone();
                }
                if patch.phone.is_some() {
                    m.phone = patch.phone.clone();
                }
                if let Some(birth_date) = patch.birth_date {
                    m.birth_date = birth_date;
                }
                if patch.address.is_some() {
                    m.address = patch.address.clone();
                }
                if patch.photo_url.is_some() {
                    m.photo_url = patch.photo_url.clone();
                }
                if patch.height_m.is_some() {
                    m.height_m = patch.height_m;
                }
                if patch.weight_kg.is_some() {
                    m.weight_kg = patch.weight_kg;
                }
                if patch.goal.is_some() {
                    m.goal = patch.goal;
                }
                if patch.notes.is_some() {
                    m.notes = patch.notes.clone();
                }
                if patch.plan_id.is_some() {
                    m.plan_id = patch.plan_id;
                }
                if let Some(status) = patch.status {
                    m.status = status;
                }
                m.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("Member", id))
    }

    /// Delete a member and cascade to enrollments, payments, workouts and
    /// attendance rows that reference it.
    pub fn delete_member(&self, id: u64) -> AppResult<()> {
        self.members.remove(id).ok_or_else(|| AppError::not_found("Member", id))?;

        for e in self.enrollments.filter(|e| e.member_id == id) {
            self.enrollments.remove(e.id);
        }
        for p in self.payments.filter(|p| p.member_id == id) {
            self.payments.remove(p.id);
        }
        for w in self.workouts.filter(|w| w.member_id == id) {
            self.workouts.remove(w.id);
        }
        for a in self.attendance.filter(|a| a.member_id == id) {
            self.attendance.remove(a.id);
        }
        Ok(())
    }

    pub fn active_member_count(&self) -> usize {
        self.members.count(|m| m.status == MemberStatus::Active)
    }

    pub fn members_enrolled_since(&self, cutoff: DateTime<Utc>) -> usize {
        self.members.count(|m| m.enrolled_at >= cutoff)
    }

    /// Status plus case-insensitive name-substring filter
    pub fn search_members(&self, status: Option<MemberStatus>, name: Option<&str>) -> Vec<Member> {
        let needle = name.map(|n| n.to_lowercase());
        self.members.filter(|m| {
            status.map_or(true, |s| m.status == s)
                && needle
                    .as_deref()
                    .map_or(true, |n| m.name.to_lowercase().contains(n))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_member(email: &str, cpf: &str) -> NewMember {
        NewMember {
            name: "Ana Souza".to_string(),
            email: email.to_string(),
            cpf: cpf.to_string(),
            phone: Some("(11) 98765-4321".to_string()),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            address: None,
            photo_url: None,
            height_m: Some(1.70),
            weight_kg: Some(65.0),
            goal: Some(TrainingGoal::Conditioning),
            notes: None,
            plan_id: None,
        }
    }

    #[test]
    fn test_duplicate_cpf_rejected() {
        let store = Store::new();
        store.create_member(sample_member("a@b.com", "123.456.789-09")).unwrap();
        let err = store
            .create_member(sample_member("c@d.com", "123.456.789-09"))
            .unwrap_err();
        assert_eq!(err.code_str(), "STORE_DUPLICATE_CPF");
    }

    #[test]
    fn test_unknown_plan_rejected() {
        let store = Store::new();
        let mut new = sample_member("a@b.com", "123.456.789-09");
        new.plan_id = Some(42);
        assert_eq!(
            store.create_member(new).unwrap_err().code_str(),
            "STORE_NOT_FOUND"
        );
    }

    #[test]
    fn test_delete_cascades() {
        let store = Store::new();
        let member = store.create_member(sample_member("a@b.com", "123.456.789-09")).unwrap();
        store.payments.insert_with(|id| Payment {
            id,
            member_id: member.id,
            reference_month: "2026-01".to_string(),
            amount: 100.0,
            status: PaymentStatus::Pending,
            paid_at: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });

        store.delete_member(member.id).unwrap();
        assert!(store.payments.is_empty());
    }

    #[test]
    fn test_search_by_name_fragment() {
        let store = Store::new();
        store.create_member(sample_member("a@b.com", "123.456.789-09")).unwrap();
        assert_eq!(store.search_members(None, Some("souza")).len(), 1);
        assert_eq!(store.search_members(None, Some("xyz")).len(), 0);
        assert_eq!(store.search_members(Some(MemberStatus::Inactive), None).len(), 0);
    }
}
