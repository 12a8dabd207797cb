use anyhow::anyhow;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{CourseId, FacultyId, StudentId};
use scholaris_observability::track_enrollment;
use tracing::{info, instrument};

use crate::modules::courses::model::{
    Course, CourseFilterParams, CreateCourseDto, EnrolledStudent, Enrollment, EnrollmentRejection,
    UpdateCourseDto, check_enrollment,
};
use crate::modules::users::service::like_pattern;

const COURSE_SELECT: &str = r#"
    SELECT c.id, c.code, c.name, c.description, c.subject_id, c.faculty_id,
           c.academic_year, c.session, c.max_students,
           (SELECT COUNT(*) FROM course_enrollments e WHERE e.course_id = c.id) AS enrolled_count,
           c.created_at, c.updated_at
    FROM courses c
"#;

const COURSE_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR c.subject_id = $1)
      AND ($2::uuid IS NULL OR c.faculty_id = $2)
      AND ($3::text IS NULL OR c.academic_year = $3)
      AND ($4::text IS NULL OR c.session = $4)
      AND ($5::text IS NULL OR c.code ILIKE $5 OR c.name ILIKE $5)
"#;

fn map_course_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some("courses_code_key") {
            return AppError::conflict(anyhow!("A course with this code already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!(
                "The referenced subject or faculty member does not exist"
            ));
        }
    }
    AppError::from(e)
}

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, dto), fields(code = %dto.code))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        let id = sqlx::query_scalar::<_, CourseId>(
            r#"INSERT INTO courses (code, name, description, subject_id, faculty_id,
                                    academic_year, session, max_students)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING id"#,
        )
        .bind(dto.code.trim().to_uppercase())
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(dto.subject_id)
        .bind(dto.faculty_id)
        .bind(&dto.academic_year)
        .bind(dto.session)
        .bind(dto.max_students)
        .fetch_one(db)
        .await
        .map_err(map_course_write_error)?;

        Self::get_course(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_courses(
        db: &PgPool,
        filters: CourseFilterParams,
    ) -> Result<Paginated<Course>, AppError> {
        let search = like_pattern(&filters.search);

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM courses c {COURSE_FILTER}"))
                .bind(filters.subject_id)
                .bind(filters.faculty_id)
                .bind(&filters.academic_year)
                .bind(filters.session)
                .bind(&search)
                .fetch_one(db)
                .await?;

        let sql = format!("{COURSE_SELECT} {COURSE_FILTER} ORDER BY c.code LIMIT $6 OFFSET $7");
        let courses = sqlx::query_as::<_, Course>(&sql)
            .bind(filters.subject_id)
            .bind(filters.faculty_id)
            .bind(&filters.academic_year)
            .bind(filters.session)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(courses, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_course(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!("{COURSE_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))
    }

    /// Courses the student is enrolled in, newest academic year first.
    #[instrument(skip(db))]
    pub async fn get_student_courses(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<Course>, AppError> {
        let sql = format!(
            r#"{COURSE_SELECT}
               JOIN course_enrollments ce ON ce.course_id = c.id
               WHERE ce.student_id = $1
               ORDER BY c.academic_year DESC, c.session, c.code"#
        );

        let courses = sqlx::query_as::<_, Course>(&sql)
            .bind(student_id)
            .fetch_all(db)
            .await?;

        Ok(courses)
    }

    /// Lowering `max_students` below the current roster is refused. The course
    /// row is locked the same way `enroll_student` locks it, so the roster
    /// cannot grow between the check and the update.
    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        id: CourseId,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let mut tx = db.begin().await?;

        sqlx::query_scalar::<_, CourseId>("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))?;

        if let Some(max_students) = dto.max_students {
            let enrolled_count = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM course_enrollments WHERE course_id = $1",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if enrolled_count > i64::from(max_students) {
                return Err(AppError::bad_request(anyhow!(
                    "max_students cannot be lower than the {enrolled_count} students already enrolled"
                )));
            }
        }

        sqlx::query(
            r#"UPDATE courses SET
                   name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   faculty_id = COALESCE($4, faculty_id),
                   max_students = COALESCE($5, max_students),
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.faculty_id)
        .bind(dto.max_students)
        .execute(&mut *tx)
        .await
        .map_err(map_course_write_error)?;

        tx.commit().await?;

        Self::get_course(db, id).await
    }

    /// Enrollments, attendance and grades for the course go with it.
    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, id: CourseId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Course not found")));
        }

        Ok(())
    }

    /// Enrolls a student, holding a lock on the course row so two concurrent
    /// requests cannot both take the last seat.
    #[instrument(skip(db))]
    pub async fn enroll_student(
        db: &PgPool,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Result<Enrollment, AppError> {
        let mut tx = db.begin().await?;

        let max_students =
            sqlx::query_scalar::<_, i32>("SELECT max_students FROM courses WHERE id = $1 FOR UPDATE")
                .bind(course_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))?;

        let student_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
                .bind(student_id)
                .fetch_one(&mut *tx)
                .await?;
        if !student_exists {
            return Err(AppError::not_found(anyhow!("Student not found")));
        }

        let (already_enrolled, enrolled_count) = sqlx::query_as::<_, (bool, i64)>(
            r#"SELECT COALESCE(BOOL_OR(student_id = $2), FALSE), COUNT(*)
               FROM course_enrollments
               WHERE course_id = $1"#,
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Err(rejection) = check_enrollment(already_enrolled, enrolled_count, max_students) {
            track_enrollment(match rejection {
                EnrollmentRejection::AlreadyEnrolled => "duplicate",
                EnrollmentRejection::CourseFull => "full",
            });
            return Err(AppError::bad_request(anyhow::Error::new(rejection)));
        }

        let enrollment = sqlx::query_as::<_, Enrollment>(
            r#"INSERT INTO course_enrollments (course_id, student_id)
               VALUES ($1, $2)
               RETURNING course_id, student_id, enrolled_at"#,
        )
        .bind(course_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        track_enrollment("enrolled");
        info!(%course_id, %student_id, "Student enrolled");

        Ok(enrollment)
    }

    #[instrument(skip(db))]
    pub async fn unenroll_student(
        db: &PgPool,
        course_id: CourseId,
        student_id: StudentId,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM course_enrollments WHERE course_id = $1 AND student_id = $2")
                .bind(course_id)
                .bind(student_id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow!(
                "Student is not enrolled in this course"
            )));
        }

        track_enrollment("withdrawn");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_roster(
        db: &PgPool,
        course_id: CourseId,
    ) -> Result<Vec<EnrolledStudent>, AppError> {
        let roster = sqlx::query_as::<_, EnrolledStudent>(
            r#"SELECT s.id AS student_id, s.student_number, u.first_name, u.last_name, u.email,
                      ce.enrolled_at
               FROM course_enrollments ce
               JOIN students s ON s.id = ce.student_id
               JOIN users u ON u.id = s.user_id
               WHERE ce.course_id = $1
               ORDER BY u.last_name, u.first_name"#,
        )
        .bind(course_id)
        .fetch_all(db)
        .await?;

        Ok(roster)
    }

    /// Faculty see only their own courses; `faculty_id` of `None` lists every course.
    pub async fn get_courses_taught(
        db: &PgPool,
        faculty_id: Option<FacultyId>,
        mut filters: CourseFilterParams,
    ) -> Result<Paginated<Course>, AppError> {
        if let Some(id) = faculty_id {
            filters.faculty_id = Some(id.into_inner());
        }
        Self::get_courses(db, filters).await
    }
}
