//! In-process persistence layer
//!
//! Thread-safe tables backed by DashMap with atomic id sequences, plus
//! repository-style query methods per entity (no object-graph navigation:
//! foreign keys are plain ids resolved through explicit queries).

pub mod classes;
pub mod members;
pub mod payments;
pub mod plans;
pub mod sessions;
pub mod users;
pub mod workouts;

pub use sessions::{Session, SessionStore};

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::info;

use crate::core::password::PasswordHash;
use crate::models::types::*;

/// One table of rows keyed by id
pub struct Table<T> {
    rows: DashMap<u64, T>,
    seq: AtomicU64,
}

impl<T: Clone> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Insert a row built from a fresh id, returning the stored row
    pub fn insert_with(&self, build: impl FnOnce(u64) -> T) -> T {
        let id = self.next_id();
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: u64) -> Option<T> {
        self.rows.get(&id).map(|r| r.clone())
    }

    /// Apply a mutation in place, returning the updated row
    pub fn update(&self, id: u64, apply: impl FnOnce(&mut T)) -> Option<T> {
        self.rows.get_mut(&id).map(|mut r| {
            apply(&mut r);
            r.clone()
        })
    }

    pub fn remove(&self, id: u64) -> Option<T> {
        self.rows.remove(&id).map(|(_, row)| row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in id order
    pub fn list(&self) -> Vec<T> {
        let mut pairs: Vec<(u64, T)> = self
            .rows
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        pairs.sort_by_key(|(id, _)| *id);
        pairs.into_iter().map(|(_, row)| row).collect()
    }

    /// Matching rows in id order
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        let mut pairs: Vec<(u64, T)> = self
            .rows
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        pairs.sort_by_key(|(id, _)| *id);
        pairs.into_iter().map(|(_, row)| row).collect()
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows
            .iter()
            .find(|r| pred(r.value()))
            .map(|r| r.value().clone())
    }

    pub fn count(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.rows.iter().filter(|r| pred(r.value())).count()
    }
}

impl<T: Clone> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The whole database
pub struct Store {
    pub users: Table<UserAccount>,
    pub instructors: Table<InstructorProfile>,
    pub members: Table<Member>,
    pub plans: Table<Plan>,
    pub classes: Table<ClassGroup>,
    pub enrollments: Table<Enrollment>,
    pub payments: Table<Payment>,
    pub workouts: Table<Workout>,
    pub attendance: Table<Attendance>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: Table::new(),
            instructors: Table::new(),
            members: Table::new(),
            plans: Table::new(),
            classes: Table::new(),
            enrollments: Table::new(),
            payments: Table::new(),
            workouts: Table::new(),
            attendance: Table::new(),
        }
    }

    /// First-boot seed: the admin manager account and the four standard
    /// plans. No-op when the store already has users.
    pub fn seed_defaults(&self, admin_email: &str, admin_password: &str) {
        if !self.users.is_empty() {
            return;
        }

        let now = chrono::Utc::now();
        self.users.insert_with(|id| UserAccount {
            id,
            name: "Administrator".to_string(),
            email: admin_email.to_string(),
            password: PasswordHash::new(admin_password),
            role: Role::Manager,
            status: AccountStatus::Active,
            photo_url: None,
            created_at: now,
            updated_at: now,
        });

        let defaults = [
            ("Monthly", 100.0, 1u32),
            ("Quarterly", 270.0, 3),
            ("Semiannual", 510.0, 6),
            ("Annual", 960.0, 12),
        ];
        for (name, price, months) in defaults {
            self.plans.insert_with(|id| Plan {
                id,
                name: name.to_string(),
                description: None,
                price,
                duration_months: months,
                active: true,
                created_at: now,
                updated_at: now,
            });
        }

        info!("🌱 Seeded admin account {} and {} default plans", admin_email, defaults.len());
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ids_are_sequential() {
        let table: Table<u64> = Table::new();
        let a = table.insert_with(|id| id);
        let b = table.insert_with(|id| id);
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn test_table_list_is_id_ordered() {
        let table: Table<u64> = Table::new();
        for _ in 0..20 {
            table.insert_with(|id| id * 10);
        }
        let listed = table.list();
        let mut sorted = listed.clone();
        sorted.sort();
        assert_eq!(listed, sorted);
    }

    #[test]
    fn test_update_and_remove() {
        let table: Table<String> = Table::new();
        table.insert_with(|_| "before".to_string());
        let updated = table.update(1, |row| *row = "after".to_string());
        assert_eq!(updated.as_deref(), Some("after"));
        assert!(table.remove(1).is_some());
        assert!(table.get(1).is_none());
    }

    #[test]
    fn test_seed_defaults_is_idempotent() {
        let store = Store::new();
        store.seed_defaults("admin@gymflow.com", "admin123");
        store.seed_defaults("admin@gymflow.com", "admin123");
        assert_eq!(store.users.len(), 1);
        assert_eq!(store.plans.len(), 4);

        let admin = store.users.get(1).unwrap();
        assert_eq!(admin.role, Role::Manager);
        assert!(admin.password.verify("admin123"));
    }
}
