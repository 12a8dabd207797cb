//! Fee structures and payments.
//!
//! Amounts are integers in the currency's minor unit (paise, cents).

use chrono::{DateTime, NaiveDate, Utc};
use scholaris_core::PaginationParams;
use scholaris_core::serde::{
    deserialize_optional_parsed, deserialize_optional_string, deserialize_optional_uuid,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::ids::{FeePaymentId, FeeStructureId, StudentId, UserId};

text_enum!(
    FeeType {
        Tuition => "tuition",
        Admission => "admission",
        Examination => "examination",
        Transport => "transport",
        Library => "library",
        Laboratory => "laboratory",
        Other => "other",
    }
);

text_enum!(
    PaymentMethod {
        Cash => "cash",
        Card => "card",
        BankTransfer => "bank_transfer",
        Cheque => "cheque",
        Online => "online",
    }
);

text_enum!(
    FeePaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
        Refunded => "refunded",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FeeStructure {
    pub id: FeeStructureId,
    pub name: String,
    pub fee_type: FeeType,
    pub grade_level: String,
    pub academic_year: String,
    pub amount: i64,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFeeStructureDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub fee_type: FeeType,
    #[validate(length(min = 1, max = 20))]
    pub grade_level: String,
    #[validate(custom(function = "crate::academic::validate_academic_year"))]
    pub academic_year: String,
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
    pub due_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFeeStructureDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub fee_type: Option<FeeType>,
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: Option<i64>,
    pub due_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeeStructureFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub grade_level: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub fee_type: Option<FeeType>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FeePayment {
    pub id: FeePaymentId,
    pub student_id: StudentId,
    pub fee_structure_id: FeeStructureId,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: FeePaymentStatus,
    pub transaction_ref: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub recorded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// An offline payment entered by the office.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentDto {
    pub student_id: StudentId,
    pub fee_structure_id: FeeStructureId,
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
    pub method: PaymentMethod,
    #[validate(length(max = 100))]
    pub transaction_ref: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeePaymentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub fee_structure_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_parsed")]
    pub status: Option<FeePaymentStatus>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

/// One fee structure as it applies to a student.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FeeSummaryLine {
    pub fee_structure_id: FeeStructureId,
    pub name: String,
    pub fee_type: FeeType,
    pub amount: i64,
    pub paid: i64,
    #[sqlx(skip)]
    #[serde(default)]
    pub balance: i64,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentFeeSummary {
    pub student_id: StudentId,
    pub academic_year: Option<String>,
    pub total_due: i64,
    pub total_paid: i64,
    pub balance: i64,
    pub lines: Vec<FeeSummaryLine>,
}

impl StudentFeeSummary {
    /// Overpaying one line does not reduce the balance of another.
    pub fn from_lines(
        student_id: StudentId,
        academic_year: Option<String>,
        lines: Vec<FeeSummaryLine>,
    ) -> Self {
        let lines: Vec<FeeSummaryLine> = lines
            .into_iter()
            .map(|mut line| {
                line.balance = (line.amount - line.paid).max(0);
                line
            })
            .collect();

        Self {
            student_id,
            academic_year,
            total_due: lines.iter().map(|l| l.amount).sum(),
            total_paid: lines.iter().map(|l| l.paid).sum(),
            balance: lines.iter().map(|l| l.balance).sum(),
            lines,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeeSummaryQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub academic_year: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(amount: i64, paid: i64) -> FeeSummaryLine {
        FeeSummaryLine {
            fee_structure_id: FeeStructureId::new(),
            name: "Term fee".to_string(),
            fee_type: FeeType::Tuition,
            amount,
            paid,
            balance: 0,
            due_date: None,
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = StudentFeeSummary::from_lines(
            StudentId::new(),
            Some("2024-2025".to_string()),
            vec![line(50_000, 20_000), line(5_000, 5_000)],
        );
        assert_eq!(summary.total_due, 55_000);
        assert_eq!(summary.total_paid, 25_000);
        assert_eq!(summary.balance, 30_000);
        assert_eq!(summary.lines[1].balance, 0);
    }

    #[test]
    fn test_overpayment_does_not_go_negative() {
        let summary =
            StudentFeeSummary::from_lines(StudentId::new(), None, vec![line(1_000, 1_500), line(2_000, 0)]);
        assert_eq!(summary.lines[0].balance, 0);
        assert_eq!(summary.balance, 2_000);
    }

    #[test]
    fn test_empty_summary() {
        let summary = StudentFeeSummary::from_lines(StudentId::new(), None, vec![]);
        assert_eq!(summary.total_due, 0);
        assert_eq!(summary.balance, 0);
    }

    #[test]
    fn test_amount_must_be_positive() {
        let dto = RecordPaymentDto {
            student_id: StudentId::new(),
            fee_structure_id: FeeStructureId::new(),
            amount: 0,
            method: PaymentMethod::Cash,
            transaction_ref: None,
            paid_at: None,
        };
        assert!(dto.validate().is_err());
    }
}
