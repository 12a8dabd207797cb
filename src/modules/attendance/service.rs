use std::collections::{BTreeSet, HashMap, HashSet};

use anyhow::anyhow;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{AttendanceId, CourseId, FacultyId, Session, StudentId, UserId};
use scholaris_observability::track_attendance_recorded;
use tracing::{info, instrument};

use crate::modules::attendance::model::{
    ATTENDANCE_UNIQUE_CONSTRAINT, Attendance, AttendanceFilterParams, AttendancePercentage,
    AttendanceSummary, RecordAttendanceDto, RecordAttendanceResult, SkipReason,
    attendance_percentage,
};
use crate::utils::auth_helpers::check_teaches;

const ATTENDANCE_COLUMNS: &str = r#"
    a.id, a.student_id, a.course_id, a.faculty_id, a.date, a.status, a.time_in, a.time_out,
    a.academic_year, a.session, a.remarks, a.recorded_by, a.created_at, a.updated_at
"#;

const ATTENDANCE_FILTER: &str = r#"
    WHERE ($1::uuid IS NULL OR a.course_id = $1)
      AND ($2::uuid IS NULL OR a.student_id = $2)
      AND ($3::date IS NULL OR a.date = $3)
      AND ($4::date IS NULL OR a.date >= $4)
      AND ($5::date IS NULL OR a.date <= $5)
      AND ($6::text IS NULL OR a.status = $6)
      AND ($7::text IS NULL OR a.academic_year = $7)
      AND ($8::text IS NULL OR a.session = $8)
      AND ($9::uuid IS NULL OR c.faculty_id = $9)
"#;

pub struct AttendanceService;

impl AttendanceService {
    /// Records a roll. Every course is checked before anything is written;
    /// each line is then inserted on its own so a duplicate only skips that line.
    #[instrument(skip(db, dto), fields(entries = dto.records.len()))]
    pub async fn record_attendance(
        db: &PgPool,
        recorded_by: UserId,
        caller: Option<FacultyId>,
        dto: RecordAttendanceDto,
    ) -> Result<RecordAttendanceResult, AppError> {
        let course_ids: Vec<CourseId> = dto
            .records
            .iter()
            .map(|entry| entry.course_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let courses: HashMap<CourseId, Option<FacultyId>> =
            sqlx::query_as::<_, (CourseId, Option<FacultyId>)>(
                "SELECT id, faculty_id FROM courses WHERE id = ANY($1)",
            )
            .bind(&course_ids)
            .fetch_all(db)
            .await?
            .into_iter()
            .collect();

        if let Some(missing) = course_ids.iter().find(|id| !courses.contains_key(id)) {
            return Err(AppError::not_found(anyhow!("Course not found: {missing}")));
        }
        for assigned in courses.values() {
            check_teaches(caller, *assigned)?;
        }

        let student_ids: Vec<StudentId> = dto.records.iter().map(|entry| entry.student_id).collect();
        let known_students: HashSet<StudentId> =
            sqlx::query_scalar::<_, StudentId>("SELECT id FROM students WHERE id = ANY($1)")
                .bind(&student_ids)
                .fetch_all(db)
                .await?
                .into_iter()
                .collect();

        let sql = format!(
            r#"INSERT INTO attendance AS a (student_id, course_id, faculty_id, date, status,
                                           time_in, time_out, academic_year, session,
                                           remarks, recorded_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               ON CONFLICT ON CONSTRAINT {ATTENDANCE_UNIQUE_CONSTRAINT} DO NOTHING
               RETURNING {ATTENDANCE_COLUMNS}"#
        );

        let mut result = RecordAttendanceResult::default();
        let mut tx = db.begin().await?;

        for entry in &dto.records {
            if !known_students.contains(&entry.student_id) {
                result.push_skipped(entry, SkipReason::UnknownStudent);
                continue;
            }

            let faculty_id = caller.or(courses.get(&entry.course_id).copied().flatten());

            let inserted = sqlx::query_as::<_, Attendance>(&sql)
                .bind(entry.student_id)
                .bind(entry.course_id)
                .bind(faculty_id)
                .bind(entry.date)
                .bind(entry.status)
                .bind(&entry.time_in)
                .bind(&entry.time_out)
                .bind(&dto.academic_year)
                .bind(dto.session)
                .bind(&entry.remarks)
                .bind(recorded_by)
                .fetch_optional(&mut *tx)
                .await?;

            match inserted {
                Some(record) => result.push_created(record),
                None => result.push_skipped(entry, SkipReason::Duplicate),
            }
        }

        tx.commit().await?;

        track_attendance_recorded(result.created, result.duplicates, result.failed);
        info!(
            created = result.created,
            duplicates = result.duplicates,
            failed = result.failed,
            "Attendance recorded"
        );

        Ok(result)
    }

    /// `teacher` restricts the listing to courses that faculty member teaches.
    #[instrument(skip(db))]
    pub async fn get_attendance(
        db: &PgPool,
        teacher: Option<FacultyId>,
        filters: AttendanceFilterParams,
    ) -> Result<Paginated<Attendance>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM attendance a JOIN courses c ON c.id = a.course_id {ATTENDANCE_FILTER}"
        ))
        .bind(filters.course_id)
        .bind(filters.student_id)
        .bind(filters.date)
        .bind(filters.from_date)
        .bind(filters.to_date)
        .bind(filters.status)
        .bind(&filters.academic_year)
        .bind(filters.session)
        .bind(teacher)
        .fetch_one(db)
        .await?;

        let sql = format!(
            r#"SELECT {ATTENDANCE_COLUMNS}
               FROM attendance a
               JOIN courses c ON c.id = a.course_id
               {ATTENDANCE_FILTER}
               ORDER BY a.date DESC, a.created_at DESC
               LIMIT $10 OFFSET $11"#
        );
        let records = sqlx::query_as::<_, Attendance>(&sql)
            .bind(filters.course_id)
            .bind(filters.student_id)
            .bind(filters.date)
            .bind(filters.from_date)
            .bind(filters.to_date)
            .bind(filters.status)
            .bind(&filters.academic_year)
            .bind(filters.session)
            .bind(teacher)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(records, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_course_of(db: &PgPool, id: AttendanceId) -> Result<CourseId, AppError> {
        sqlx::query_scalar::<_, CourseId>("SELECT course_id FROM attendance WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Attendance record not found")))
    }

    /// Remarks are the only part of a record that can change after the roll.
    #[instrument(skip(db, remarks))]
    pub async fn update_remarks(
        db: &PgPool,
        id: AttendanceId,
        remarks: Option<String>,
    ) -> Result<Attendance, AppError> {
        let sql = format!(
            r#"UPDATE attendance AS a SET remarks = $2, updated_at = NOW()
               WHERE a.id = $1
               RETURNING {ATTENDANCE_COLUMNS}"#
        );

        sqlx::query_as::<_, Attendance>(&sql)
            .bind(id)
            .bind(&remarks)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Attendance record not found")))
    }

    /// Share of a student's records in a course marked present or late.
    /// Zero when nothing has been recorded.
    #[instrument(skip(db))]
    pub async fn calculate_attendance_percentage(
        db: &PgPool,
        student_id: StudentId,
        course_id: CourseId,
        academic_year: Option<&str>,
        session: Option<Session>,
    ) -> Result<AttendancePercentage, AppError> {
        let (total, present_or_late) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT COUNT(*),
                      COUNT(*) FILTER (WHERE status IN ('present', 'late'))
               FROM attendance
               WHERE student_id = $1
                 AND course_id = $2
                 AND ($3::text IS NULL OR academic_year = $3)
                 AND ($4::text IS NULL OR session = $4)"#,
        )
        .bind(student_id)
        .bind(course_id)
        .bind(academic_year)
        .bind(session)
        .fetch_one(db)
        .await?;

        Ok(AttendancePercentage {
            student_id,
            course_id,
            total,
            present_or_late,
            percentage: attendance_percentage(present_or_late, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_summary(
        db: &PgPool,
        student_id: StudentId,
        academic_year: Option<&str>,
        session: Option<Session>,
    ) -> Result<Vec<AttendanceSummary>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceSummary>(
            r#"SELECT c.id AS course_id, c.code AS course_code, c.name AS course_name,
                      COUNT(*) AS total,
                      COUNT(*) FILTER (WHERE a.status = 'present') AS present,
                      COUNT(*) FILTER (WHERE a.status = 'absent') AS absent,
                      COUNT(*) FILTER (WHERE a.status = 'late') AS late,
                      COUNT(*) FILTER (WHERE a.status = 'excused') AS excused
               FROM attendance a
               JOIN courses c ON c.id = a.course_id
               WHERE a.student_id = $1
                 AND ($2::text IS NULL OR a.academic_year = $2)
                 AND ($3::text IS NULL OR a.session = $3)
               GROUP BY c.id, c.code, c.name
               ORDER BY c.code"#,
        )
        .bind(student_id)
        .bind(academic_year)
        .bind(session)
        .fetch_all(db)
        .await?;

        Ok(rows.into_iter().map(AttendanceSummary::with_percentage).collect())
    }
}
