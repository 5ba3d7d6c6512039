//! Domain entities and enums
//!
//! One target schema, explicit foreign keys. Rows are owned by the store,
//! never by an in-memory object graph.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::password::PasswordHash;

/// Staff roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Instructor,
    Receptionist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Instructor => "instructor",
            Role::Receptionist => "receptionist",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingGoal {
    Hypertrophy,
    WeightLoss,
    Conditioning,
    Rehabilitation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    Strength,
    Cardio,
    Functional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassModality {
    Strength,
    Gymnastics,
    Dance,
    MartialArts,
    Swimming,
    Pilates,
    Yoga,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceKind {
    CheckIn,
    CheckOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    Active,
    Inactive,
}

// ============================================
// Entities
// ============================================

/// Staff account. The password digest is write-only: it never serializes
/// and exposes no accessor beyond `verify`.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: PasswordHash,
    pub role: Role,
    pub status: AccountStatus,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Instructor detail row, one per account with the instructor role
#[derive(Debug, Clone, Serialize)]
pub struct InstructorProfile {
    pub id: u64,
    pub user_id: u64,
    pub specialty: Option<String>,
    pub available_hours: Option<String>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Gym member record. `cpf` is stored in canonical `ddd.ddd.ddd-dd` form
/// and is unique across members.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: Option<String>,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub height_m: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<TrainingGoal>,
    pub notes: Option<String>,
    pub plan_id: Option<u64>,
    pub status: MemberStatus,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_months: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scheduled class slot. `weekday` is 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Serialize)]
pub struct ClassGroup {
    pub id: u64,
    pub instructor_id: u64,
    pub modality: ClassModality,
    pub level: SkillLevel,
    pub weekday: u8,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub capacity: u32,
    pub status: ClassStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub id: u64,
    pub member_id: u64,
    pub class_id: u64,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Monthly charge against a member. `reference_month` is `YYYY-MM`.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: u64,
    pub member_id: u64,
    pub reference_month: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Exercise row embedded in a workout sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub load_kg: Option<f64>,
    pub order: u32,
    #[serde(default)]
    pub muscle_group: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Workout {
    pub id: u64,
    pub member_id: u64,
    pub instructor_id: u64,
    pub kind: WorkoutKind,
    pub notes: Option<String>,
    pub status: WorkoutStatus,
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attendance {
    pub id: u64,
    pub member_id: u64,
    pub class_id: u64,
    pub recorded_at: DateTime<Utc>,
    pub kind: AttendanceKind,
}
