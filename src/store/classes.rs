//! Class, enrollment and attendance repository

use chrono::{NaiveTime, Utc};
use serde::Deserialize;

use super::Store;
use crate::core::validators::is_valid_time_hhmm;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::*;

/// Class times arrive as strict `HH:MM` strings
fn parse_time(raw: &str) -> AppResult<NaiveTime> {
    if !is_valid_time_hhmm(raw) {
        return Err(AppError::invalid_time(raw));
    }
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| AppError::invalid_time(raw))
}

#[derive(Debug, Deserialize)]
pub struct NewClass {
    pub instructor_id: u64,
    pub modality: ClassModality,
    pub level: SkillLevel,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: u8,
    /// `HH:MM`
    pub starts_at: String,
    /// `HH:MM`
    pub ends_at: String,
    pub capacity: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassPatch {
    pub instructor_id: Option<u64>,
    pub modality: Option<ClassModality>,
    pub level: Option<SkillLevel>,
    pub weekday: Option<u8>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub capacity: Option<u32>,
    pub status: Option<ClassStatus>,
}

impl Store {
    pub fn create_class(&self, new: NewClass) -> AppResult<ClassGroup> {
        if new.weekday > 6 {
            return Err(AppError::out_of_range("weekday must be 0..=6"));
        }
        let starts_at = parse_time(&new.starts_at)?;
        let ends_at = parse_time(&new.ends_at)?;
        if ends_at <= starts_at {
            return Err(AppError::out_of_range("Class must end after it starts"));
        }
        self.instructors
            .get(new.instructor_id)
            .ok_or_else(|| AppError::not_found("Instructor", new.instructor_id))?;

        let now = Utc::now();
        Ok(self.classes.insert_with(|id| ClassGroup {
            id,
            instructor_id: new.instructor_id,
            modality: new.modality,
            level: new.level,
            weekday: new.weekday,
            starts_at,
            ends_at,
            capacity: new.capacity,
            status: ClassStatus::Active,
            created_at: now,
            updated_at: now,
        }))
    }

    pub fn update_class(&self, id: u64, patch: ClassPatch) -> AppResult<ClassGroup> {
        if matches!(patch.weekday, Some(d) if d > 6) {
            return Err(AppError::out_of_range("weekday must be 0..=6"));
        }
        let starts_at = patch.starts_at.as_deref().map(parse_time).transpose()?;
        let ends_at = patch.ends_at.as_deref().map(parse_time).transpose()?;
        if let (Some(start), Some(end)) = (starts_at, ends_at) {
            if end <= start {
                return Err(AppError::out_of_range("Class must end after it starts"));
            }
        }
        if let Some(instructor_id) = patch.instructor_id {
            self.instructors
                .get(instructor_id)
                .ok_or_else(|| AppError::not_found("Instructor", instructor_id))?;
        }

        self.classes
            .update(id, |c| {
                if let Some(instructor_id) = patch.instructor_id {
                    c.instructor_id = instructor_id;
                }
                if let Some(modality) = patch.modality {
                    c.modality = modality;
                }
                if let Some(level) = patch.level {
                    c.level = level;
                }
                if let Some(weekday) = patch.weekday {
                    c.weekday = weekday;
                }
                if let Some(starts_at) = starts_at {
                    c.starts_at = starts_at;
                }
                if let Some(ends_at) = ends_at {
                    c.ends_at = ends_at;
                }
                if let Some(capacity) = patch.capacity {
                    c.capacity = capacity;
                }
                if let Some(status) = patch.status {
                    c.status = status;
                }
                c.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("Class", id))
    }

    pub fn delete_class(&self, id: u64) -> AppResult<()> {
        self.classes.remove(id).ok_or_else(|| AppError::not_found("Class", id))?;
        for e in self.enrollments.filter(|e| e.class_id == id) {
            self.enrollments.remove(e.id);
        }
        for a in self.attendance.filter(|a| a.class_id == id) {
            self.attendance.remove(a.id);
        }
        Ok(())
    }

    pub fn active_enrollment_count(&self, class_id: u64) -> usize {
        self.enrollments
            .count(|e| e.class_id == class_id && e.status == EnrollmentStatus::Active)
    }

    /// Enroll a member, holding the capacity invariant: a class never has
    /// more active enrollments than seats.
    pub fn enroll_member(&self, class_id: u64, member_id: u64) -> AppResult<Enrollment> {
        let class = self
            .classes
            .get(class_id)
            .ok_or_else(|| AppError::not_found("Class", class_id))?;
        self.members
            .get(member_id)
            .ok_or_else(|| AppError::not_found("Member", member_id))?;

        let already = self.enrollments.find(|e| {
            e.class_id == class_id && e.member_id == member_id && e.status == EnrollmentStatus::Active
        });
        if already.is_some() {
            return Err(AppError::row_in_use(format!(
                "Member {} is already enrolled in class {}",
                member_id, class_id
            )));
        }

        if self.active_enrollment_count(class_id) >= class.capacity as usize {
            return Err(AppError::class_full(class_id));
        }

        let now = Utc::now();
        Ok(self.enrollments.insert_with(|id| Enrollment {
            id,
            member_id,
            class_id,
            status: EnrollmentStatus::Active,
            enrolled_at: now,
            updated_at: now,
        }))
    }

    pub fn cancel_enrollment(&self, enrollment_id: u64) -> AppResult<Enrollment> {
        self.enrollments
            .update(enrollment_id, |e| {
                e.status = EnrollmentStatus::Inactive;
                e.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("Enrollment", enrollment_id))
    }

    /// Record a check-in/check-out. The member must be actively enrolled.
    pub fn record_attendance(
        &self,
        class_id: u64,
        member_id: u64,
        kind: AttendanceKind,
    ) -> AppResult<Attendance> {
        self.classes
            .get(class_id)
            .ok_or_else(|| AppError::not_found("Class", class_id))?;
        let enrolled = self.enrollments.find(|e| {
            e.class_id == class_id && e.member_id == member_id && e.status == EnrollmentStatus::Active
        });
        if enrolled.is_none() {
            return Err(AppError::bad_request(format!(
                "Member {} is not enrolled in class {}",
                member_id, class_id
            )));
        }

        Ok(self.attendance.insert_with(|id| Attendance {
            id,
            member_id,
            class_id,
            recorded_at: Utc::now(),
            kind,
        }))
    }

    pub fn active_classes(&self) -> Vec<ClassGroup> {
        self.classes.filter(|c| c.status == ClassStatus::Active)
    }
}
