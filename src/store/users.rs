//! User account repository

use chrono::Utc;
use serde::Deserialize;

use super::Store;
use crate::core::password::{temp_password, PasswordHash};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::*;

/// Input for account creation. `specialty`/`available_hours` only apply
/// when the role is instructor.
#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub status: Option<AccountStatus>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub available_hours: Option<String>,
}

/// Partial account update; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    pub photo_url: Option<String>,
    pub specialty: Option<String>,
    pub available_hours: Option<String>,
}

impl Store {
    pub fn find_user_by_email(&self, email: &str) -> Option<UserAccount> {
        self.users.find(|u| u.email.eq_ignore_ascii_case(email))
    }

    fn user_email_taken(&self, email: &str, exclude: Option<u64>) -> bool {
        self.users
            .find(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != exclude)
            .is_some()
    }

    pub fn create_user(&self, new: NewUser) -> AppResult<UserAccount> {
        if self.user_email_taken(&new.email, None) {
            return Err(AppError::duplicate_email(&new.email));
        }

        let now = Utc::now();
        let user = self.users.insert_with(|id| UserAccount {
            id,
            name: new.name.clone(),
            email: new.email.clone(),
            password: PasswordHash::new(&new.password),
            role: new.role,
            status: new.status.unwrap_or(AccountStatus::Active),
            photo_url: new.photo_url.clone(),
            created_at: now,
            updated_at: now,
        });

        if user.role == Role::Instructor {
            self.instructors.insert_with(|id| InstructorProfile {
                id,
                user_id: user.id,
                specialty: new.specialty.clone(),
                available_hours: new.available_hours.clone(),
                status: AccountStatus::Active,
                created_at: now,
                updated_at: now,
            });
        }

        Ok(user)
    }

    pub fn update_user(&self, id: u64, patch: UserPatch) -> AppResult<UserAccount> {
        let existing = self.users.get(id).ok_or_else(|| AppError::not_found("User", id))?;

        if let Some(email) = &patch.email {
            if self.user_email_taken(email, Some(id)) {
                return Err(AppError::duplicate_email(email));
            }
        }

        let user = self
            .users
            .update(id, |u| {
                if let Some(name) = &patch.name {
                    u.name = name.clone();
                }
                if let Some(email) = &patch.email {
                    u.email = email.clone();
                }
                if let Some(password) = &patch.password {
                    u.password = PasswordHash::new(password);
                }
                if let Some(role) = patch.role {
                    u.role = role;
                }
                if let Some(status) = patch.status {
                    u.status = status;
                }
                if patch.photo_url.is_some() {
                    u.photo_url = patch.photo_url.clone();
                }
                u.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("User", id))?;

        // Keep the instructor profile in step with the role
        if user.role == Role::Instructor {
            let now = Utc::now();
            match self.instructor_profile_for(user.id) {
                Some(profile) => {
                    self.instructors.update(profile.id, |p| {
                        if patch.specialty.is_some() {
                            p.specialty = patch.specialty.clone();
                        }
                        if patch.available_hours.is_some() {
                            p.available_hours = patch.available_hours.clone();
                        }
                        p.updated_at = now;
                    });
                }
                None => {
                    self.instructors.insert_with(|pid| InstructorProfile {
                        id: pid,
                        user_id: user.id,
                        specialty: patch.specialty.clone(),
                        available_hours: patch.available_hours.clone(),
                        status: AccountStatus::Active,
                        created_at: now,
                        updated_at: now,
                    });
                }
            }
        } else if existing.role == Role::Instructor {
            if let Some(profile) = self.instructor_profile_for(user.id) {
                self.instructors.remove(profile.id);
            }
        }

        Ok(user)
    }

    pub fn delete_user(&self, id: u64) -> AppResult<()> {
        let user = self.users.remove(id).ok_or_else(|| AppError::not_found("User", id))?;
        if let Some(profile) = self.instructor_profile_for(user.id) {
            self.instructors.remove(profile.id);
        }
        Ok(())
    }

    /// Replace the password with a generated one and return it in plaintext
    /// (shown once to the manager, never stored).
    pub fn reset_user_password(&self, id: u64) -> AppResult<String> {
        let generated = temp_password();
        self.users
            .update(id, |u| {
                u.password = PasswordHash::new(&generated);
                u.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("User", id))?;
        Ok(generated)
    }

    pub fn deactivate_user(&self, id: u64) -> AppResult<UserAccount> {
        self.users
            .update(id, |u| {
                u.status = AccountStatus::Inactive;
                u.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("User", id))
    }

    pub fn instructor_profile_for(&self, user_id: u64) -> Option<InstructorProfile> {
        self.instructors.find(|p| p.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "senha123".to_string(),
            role,
            status: None,
            photo_url: None,
            specialty: Some("Pilates".to_string()),
            available_hours: None,
        }
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = Store::new();
        store.create_user(new_user("a@b.com", Role::Receptionist)).unwrap();
        let err = store.create_user(new_user("A@B.com", Role::Receptionist)).unwrap_err();
        assert_eq!(err.code_str(), "STORE_DUPLICATE_EMAIL");
    }

    #[test]
    fn test_instructor_gets_profile() {
        let store = Store::new();
        let user = store.create_user(new_user("i@b.com", Role::Instructor)).unwrap();
        let profile = store.instructor_profile_for(user.id).unwrap();
        assert_eq!(profile.specialty.as_deref(), Some("Pilates"));

        // Demoting the role drops the profile
        store
            .update_user(user.id, UserPatch { role: Some(Role::Receptionist), ..Default::default() })
            .unwrap();
        assert!(store.instructor_profile_for(user.id).is_none());
    }

    #[test]
    fn test_reset_password_rotates_credential() {
        let store = Store::new();
        let user = store.create_user(new_user("r@b.com", Role::Manager)).unwrap();
        let generated = store.reset_user_password(user.id).unwrap();

        let reloaded = store.users.get(user.id).unwrap();
        assert!(reloaded.password.verify(&generated));
        assert!(!reloaded.password.verify("senha123"));
    }

    #[test]
    fn test_delete_missing_user() {
        let store = Store::new();
        assert_eq!(store.delete_user(99).unwrap_err().code_str(), "STORE_NOT_FOUND");
    }
}
