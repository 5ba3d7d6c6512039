//! Workout sheet repository

use chrono::Utc;
use serde::Deserialize;

use super::Store;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::*;

#[derive(Debug, Deserialize)]
pub struct NewWorkout {
    pub member_id: u64,
    pub instructor_id: u64,
    pub kind: WorkoutKind,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkoutPatch {
    pub kind: Option<WorkoutKind>,
    pub notes: Option<String>,
    pub status: Option<WorkoutStatus>,
    pub exercises: Option<Vec<Exercise>>,
}

impl Store {
    pub fn create_workout(&self, new: NewWorkout) -> AppResult<Workout> {
        self.members
            .get(new.member_id)
            .ok_or_else(|| AppError::not_found("Member", new.member_id))?;
        self.instructors
            .get(new.instructor_id)
            .ok_or_else(|| AppError::not_found("Instructor", new.instructor_id))?;

        let mut exercises = new.exercises.clone();
        exercises.sort_by_key(|e| e.order);

        let now = Utc::now();
        Ok(self.workouts.insert_with(|id| Workout {
            id,
            member_id: new.member_id,
            instructor_id: new.instructor_id,
            kind: new.kind,
            notes: new.notes.clone(),
            status: WorkoutStatus::Active,
            exercises: exercises.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    pub fn update_workout(&self, id: u64, patch: WorkoutPatch) -> AppResult<Workout> {
        self.workouts
            .update(id, |w| {
                if let Some(kind) = patch.kind {
                    w.kind = kind;
                }
                if patch.notes.is_some() {
                    w.notes = patch.notes.clone();
                }
                if let Some(status) = patch.status {
                    w.status = status;
                }
                if let Some(exercises) = &patch.exercises {
                    let mut sorted = exercises.clone();
                    sorted.sort_by_key(|e| e.order);
                    w.exercises = sorted;
                }
                w.updated_at = Utc::now();
            })
            .ok_or_else(|| AppError::not_found("Workout", id))
    }

    pub fn delete_workout(&self, id: u64) -> AppResult<()> {
        self.workouts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Workout", id))
    }

    pub fn search_workouts(
        &self,
        member_id: Option<u64>,
        instructor_id: Option<u64>,
    ) -> Vec<Workout> {
        self.workouts.filter(|w| {
            member_id.map_or(true, |m| w.member_id == m)
                && instructor_id.map_or(true, |i| w.instructor_id == i)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::members::NewMember;
    use crate::store::users::NewUser;
    use chrono::NaiveDate;

    fn setup() -> (Store, u64, u64) {
        let store = Store::new();
        let user = store
            .create_user(NewUser {
                name: "Coach".to_string(),
                email: "coach@gym.com".to_string(),
                password: "senha123".to_string(),
                role: Role::Instructor,
                status: None,
                photo_url: None,
                specialty: None,
                available_hours: None,
            })
            .unwrap();
        let instructor = store.instructor_profile_for(user.id).unwrap();
        let member = store
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
                plan_id: None,
            })
            .unwrap();
        (store, member.id, instructor.id)
    }

    fn bench_press(order: u32) -> Exercise {
        Exercise {
            name: "Bench press".to_string(),
            sets: 3,
            reps: 12,
            load_kg: Some(20.0),
            order,
            muscle_group: Some("chest".to_string()),
        }
    }

    #[test]
    fn test_exercises_sorted_by_order() {
        let (store, member_id, instructor_id) = setup();
        let workout = store
            .create_workout(NewWorkout {
                member_id,
                instructor_id,
                kind: WorkoutKind::Strength,
                notes: None,
                exercises: vec![bench_press(2), bench_press(1)],
            })
            .unwrap();
        assert_eq!(workout.exercises[0].order, 1);
        assert_eq!(workout.exercises[1].order, 2);
    }

    #[test]
    fn test_unknown_member_rejected() {
        let (store, _, instructor_id) = setup();
        let err = store
            .create_workout(NewWorkout {
                member_id: 999,
                instructor_id,
                kind: WorkoutKind::Cardio,
                notes: None,
                exercises: vec![],
            })
            .unwrap_err();
        assert_eq!(err.code_str(), "STORE_NOT_FOUND");
    }

    #[test]
    fn test_search_by_member() {
        let (store, member_id, instructor_id) = setup();
        store
            .create_workout(NewWorkout {
                member_id,
                instructor_id,
                kind: WorkoutKind::Functional,
                notes: None,
                exercises: vec![],
            })
            .unwrap();
        assert_eq!(store.search_workouts(Some(member_id), None).len(), 1);
        assert_eq!(store.search_workouts(Some(member_id + 1), None).len(), 0);
        assert_eq!(store.search_workouts(None, Some(instructor_id)).len(), 1);
    }
}
