//! Admission applications and their status lifecycle.
//!
//! ```text
//! submitted ─┬─> under_review ─┬─> approved ──> admitted
//!            │        ▲        └─> rejected
//!            └─> waitlisted ───┘
//! ```
//!
//! `approved`, `rejected` and `admitted` are decided: approve and reject refuse
//! them, and the only move out of `approved` is to `admitted`.

use chrono::{DateTime, NaiveDate, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::{deserialize_optional_parsed, deserialize_optional_string};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AdmissionId, UserId};

/// Attempts made to find a free application number before giving up.
pub const APPLICATION_NUMBER_ATTEMPTS: usize = 5;

text_enum!(
    AdmissionStatus {
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Rejected => "rejected",
        Waitlisted => "waitlisted",
        Admitted => "admitted",
    }
);

impl AdmissionStatus {
    /// Statuses from which the application can still be approved or rejected.
    pub const UNDECIDED: &'static [AdmissionStatus] = &[
        AdmissionStatus::Submitted,
        AdmissionStatus::UnderReview,
        AdmissionStatus::Waitlisted,
    ];

    pub fn is_undecided(&self) -> bool {
        Self::UNDECIDED.contains(self)
    }

    /// Statuses an application may move from to reach `target`.
    pub fn allowed_sources(target: AdmissionStatus) -> &'static [AdmissionStatus] {
        match target {
            Self::UnderReview | Self::Waitlisted | Self::Approved | Self::Rejected => {
                Self::UNDECIDED
            }
            Self::Admitted => &[AdmissionStatus::Approved],
            Self::Submitted => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRejected {
    pub from: AdmissionStatus,
    pub to: AdmissionStatus,
}

impl fmt::Display for TransitionRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "Application is already {}", self.to)
        } else {
            write!(
                f,
                "Cannot change application status from {} to {}",
                self.from, self.to
            )
        }
    }
}

impl std::error::Error for TransitionRejected {}

pub fn check_transition(
    from: AdmissionStatus,
    to: AdmissionStatus,
) -> Result<(), TransitionRejected> {
    if AdmissionStatus::allowed_sources(to).contains(&from) {
        Ok(())
    } else {
        Err(TransitionRejected { from, to })
    }
}

/// `ADM-<year>-<6 digits>`.
pub fn format_application_number(year: i32, serial: u32) -> String {
    format!("ADM-{}-{:06}", year, serial % 1_000_000)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StudentInfo {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(length(max = 100))]
    pub nationality: Option<String>,
    #[validate(length(max = 200))]
    pub previous_school: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AcademicInfo {
    #[validate(length(min = 1, max = 20))]
    pub applying_for_grade: String,
    #[validate(custom(function = "crate::academic::validate_academic_year"))]
    pub academic_year: String,
    #[validate(length(max = 20))]
    pub previous_grade: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub previous_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ContactInfo {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub phone: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ParentInfo {
    #[validate(length(min = 1, max = 200))]
    pub guardian_name: String,
    #[validate(length(min = 1, max = 50))]
    pub relation: String,
    #[validate(custom(function = "crate::academic::validate_phone"))]
    pub phone: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct FeeInfo {
    pub application_fee_paid: bool,
    #[validate(length(max = 100))]
    pub payment_reference: Option<String>,
    pub scholarship_requested: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Admission {
    pub id: AdmissionId,
    pub application_number: String,
    #[sqlx(json)]
    pub student_info: StudentInfo,
    #[sqlx(json)]
    pub academic_info: AcademicInfo,
    #[sqlx(json)]
    pub contact_info: ContactInfo,
    #[sqlx(json)]
    pub parent_info: ParentInfo,
    #[sqlx(json)]
    pub fee_info: FeeInfo,
    pub status: AdmissionStatus,
    pub remarks: Option<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitAdmissionDto {
    #[validate(nested)]
    pub student_info: StudentInfo,
    #[validate(nested)]
    pub academic_info: AcademicInfo,
    #[validate(nested)]
    pub contact_info: ContactInfo,
    #[validate(nested)]
    pub parent_info: ParentInfo,
    #[serde(default)]
    #[validate(nested)]
    pub fee_info: FeeInfo,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ApproveAdmissionDto {
    #[validate(length(max = 1000))]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectAdmissionDto {
    #[validate(length(min = 1, max = 1000, message = "reason is required"))]
    pub reason: String,
    #[validate(length(max = 1000))]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAdmissionStatusDto {
    pub status: AdmissionStatus,
    #[validate(length(max = 1000))]
    pub remarks: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdmissionFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<AdmissionStatus>,
    /// Matches application number, applicant name or contact email
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

/// Public view of an application, safe to show to anyone holding the number.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AdmissionStatusLookup {
    pub application_number: String,
    pub status: AdmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SubmitAdmissionResponse {
    pub id: AdmissionId,
    pub application_number: String,
    pub status: AdmissionStatus,
}
