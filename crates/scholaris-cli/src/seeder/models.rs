//! Seed rows and the knobs that size a seeding run.

use chrono::NaiveDate;
use scholaris_models::{Session, UserId, UserRole};

/// Every seeded account uses this domain so `clear` can find them again.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";

/// Password shared by all seeded accounts.
pub const SEED_PASSWORD: &str = "password123";

pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

pub struct FacultySeed {
    pub user_id: UserId,
    pub employee_number: String,
    pub department: String,
    pub joining_date: NaiveDate,
}

pub struct StudentSeed {
    pub user_id: UserId,
    pub student_number: String,
    pub grade_level: String,
    pub section: String,
    pub date_of_birth: NaiveDate,
    pub parent_user_id: Option<UserId>,
}

pub struct SubjectSeed {
    pub code: String,
    pub name: String,
    pub department: String,
    pub credits: i32,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub faculty: usize,
    pub students: usize,
    /// Fraction of students, in percent, that get a parent account
    pub parents_percent: usize,
    pub subjects: usize,
    pub courses_per_subject: usize,
    pub max_students_per_course: i32,
    pub academic_year: String,
    pub session: Session,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            faculty: 10,
            students: 200,
            parents_percent: 50,
            subjects: 8,
            courses_per_subject: 2,
            max_students_per_course: 30,
            academic_year: "2024-2025".to_string(),
            session: Session::First,
        }
    }
}

impl SeedConfig {
    pub fn parents(&self) -> usize {
        self.students * self.parents_percent.min(100) / 100
    }

    pub fn total_courses(&self) -> usize {
        self.subjects * self.courses_per_subject
    }

    pub fn total_users(&self) -> usize {
        self.faculty + self.students + self.parents()
    }
}
