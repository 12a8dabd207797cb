use anyhow::anyhow;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{FacultyId, GradeId};
use tracing::{info, instrument};
use validator::ValidationErrors;

use crate::modules::grades::model::{
    CreateGradeDto, Grade, GradeFilterParams, UpdateGradeDto, check_marks, grade_percentage,
    letter_grade,
};

const GRADE_COLUMNS: &str = r#"
    g.id, g.student_id, g.course_id, g.faculty_id, g.assessment_type, g.marks_obtained,
    g.max_marks, g.percentage, g.letter_grade, g.academic_year, g.session, g.remarks,
    g.created_at, g.updated_at
"#;

const GRADE_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR g.course_id = $1)
      AND ($2::uuid IS NULL OR g.student_id = $2)
      AND ($3::text IS NULL OR g.assessment_type = $3)
      AND ($4::text IS NULL OR g.academic_year = $4)
      AND ($5::text IS NULL OR g.session = $5)
      AND ($6::uuid IS NULL OR c.faculty_id = $6)
"#;

fn marks_error(marks_obtained: f64, max_marks: f64) -> Result<(), AppError> {
    check_marks(marks_obtained, max_marks).map_err(|err| {
        let mut errors = ValidationErrors::new();
        errors.add("marks_obtained", err);
        AppError::validation(&errors)
    })
}

pub struct GradeService;

impl GradeService {
    /// `faculty_id` is the teacher stamped on the record.
    #[instrument(skip(db, dto), fields(student_id = %dto.student_id, course_id = %dto.course_id))]
    pub async fn create_grade(
        db: &PgPool,
        faculty_id: Option<FacultyId>,
        dto: CreateGradeDto,
    ) -> Result<Grade, AppError> {
        let enrolled = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM course_enrollments WHERE course_id = $1 AND student_id = $2)",
        )
        .bind(dto.course_id)
        .bind(dto.student_id)
        .fetch_one(db)
        .await?;
        if !enrolled {
            return Err(AppError::bad_request(anyhow!(
                "Student is not enrolled in this course"
            )));
        }

        let percentage = grade_percentage(dto.marks_obtained, dto.max_marks);

        let sql = format!(
            r#"INSERT INTO grades AS g (student_id, course_id, faculty_id, assessment_type,
                                       marks_obtained, max_marks, percentage, letter_grade,
                                       academic_year, session, remarks)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING {GRADE_COLUMNS}"#
        );

        let grade = sqlx::query_as::<_, Grade>(&sql)
            .bind(dto.student_id)
            .bind(dto.course_id)
            .bind(faculty_id)
            .bind(dto.assessment_type)
            .bind(dto.marks_obtained)
            .bind(dto.max_marks)
            .bind(percentage)
            .bind(letter_grade(percentage))
            .bind(&dto.academic_year)
            .bind(dto.session)
            .bind(&dto.remarks)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.constraint() == Some("grades_student_course_assessment_key")
                {
                    return AppError::conflict(anyhow!(
                        "A {} grade already exists for this student in this course and session",
                        dto.assessment_type
                    ));
                }
                AppError::from(e)
            })?;

        info!(grade_id = %grade.id, letter = %grade.letter_grade, "Grade recorded");
        Ok(grade)
    }

    #[instrument(skip(db))]
    pub async fn get_grade(db: &PgPool, id: GradeId) -> Result<Grade, AppError> {
        sqlx::query_as::<_, Grade>(&format!("SELECT {GRADE_COLUMNS} FROM grades g WHERE g.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))
    }

    /// Percentage and letter are recomputed from the merged marks.
    #[instrument(skip(db, current, dto), fields(grade_id = %current.id))]
    pub async fn update_grade(
        db: &PgPool,
        current: Grade,
        dto: UpdateGradeDto,
    ) -> Result<Grade, AppError> {
        let marks_obtained = dto.marks_obtained.unwrap_or(current.marks_obtained);
        let max_marks = dto.max_marks.unwrap_or(current.max_marks);
        marks_error(marks_obtained, max_marks)?;

        let percentage = grade_percentage(marks_obtained, max_marks);

        let sql = format!(
            r#"UPDATE grades AS g SET
                   marks_obtained = $2,
                   max_marks = $3,
                   percentage = $4,
                   letter_grade = $5,
                   remarks = COALESCE($6, remarks),
                   updated_at = NOW()
               WHERE g.id = $1
               RETURNING {GRADE_COLUMNS}"#
        );

        sqlx::query_as::<_, Grade>(&sql)
            .bind(current.id)
            .bind(marks_obtained)
            .bind(max_marks)
            .bind(percentage)
            .bind(letter_grade(percentage))
            .bind(&dto.remarks)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Grade not found")))
    }

    /// `teacher` restricts results to courses that faculty member teaches.
    #[instrument(skip(db))]
    pub async fn get_grades(
        db: &PgPool,
        teacher: Option<FacultyId>,
        filters: GradeFilterParams,
    ) -> Result<Paginated<Grade>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM grades g JOIN courses c ON c.id = g.course_id {GRADE_FILTER}"
        ))
        .bind(filters.course_id)
        .bind(filters.student_id)
        .bind(filters.assessment_type)
        .bind(&filters.academic_year)
        .bind(filters.session)
        .bind(teacher)
        .fetch_one(db)
        .await?;

        let sql = format!(
            r#"SELECT {GRADE_COLUMNS}
               FROM grades g
               JOIN courses c ON c.id = g.course_id
               {GRADE_FILTER}
               ORDER BY g.academic_year DESC, g.session, c.code, g.assessment_type
               LIMIT $7 OFFSET $8"#
        );
        let grades = sqlx::query_as::<_, Grade>(&sql)
            .bind(filters.course_id)
            .bind(filters.student_id)
            .bind(filters.assessment_type)
            .bind(&filters.academic_year)
            .bind(filters.session)
            .bind(teacher)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(grades, total, &filters.pagination))
    }
}
