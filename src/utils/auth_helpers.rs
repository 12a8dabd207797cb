//! Ownership checks that need the database.
//!
//! Role gates only say *what kind* of user is calling. These helpers answer
//! *which* records that user may touch: a student reads their own data, a
//! parent reads a child's, and a faculty member manages the courses they teach.

use anyhow::anyhow;
use scholaris_core::AppError;
use scholaris_db::PgPool;
use scholaris_models::{CourseId, FacultyId, StudentId, UserRole};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;

/// Resolves the student a request is about.
///
/// - student: their own profile; naming another student is forbidden
/// - parent: `requested` is required and must be one of their children
/// - admin: `requested` is required and must exist
#[instrument(skip(db, auth_user), fields(role = %auth_user.0.role))]
pub async fn resolve_student_id(
    db: &PgPool,
    auth_user: &AuthUser,
    requested: Option<Uuid>,
) -> Result<StudentId, AppError> {
    let user_id = auth_user.user_id()?;

    match auth_user.role()? {
        UserRole::Student => {
            let own = sqlx::query_scalar::<_, StudentId>(
                "SELECT id FROM students WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student profile not found")))?;

            match requested {
                Some(id) if id != own.into_inner() => Err(AppError::forbidden(anyhow!(
                    "Students can only access their own records"
                ))),
                _ => Ok(own),
            }
        }
        UserRole::Parent => {
            let id = requested.ok_or_else(|| {
                AppError::bad_request(anyhow!("student_id is required for parent accounts"))
            })?;

            sqlx::query_scalar::<_, StudentId>(
                "SELECT id FROM students WHERE id = $1 AND parent_user_id = $2",
            )
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| {
                AppError::forbidden(anyhow!("This student is not linked to your account"))
            })
        }
        UserRole::Admin => {
            let id = requested
                .ok_or_else(|| AppError::bad_request(anyhow!("student_id is required")))?;

            sqlx::query_scalar::<_, StudentId>("SELECT id FROM students WHERE id = $1")
                .bind(id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
        }
        UserRole::Faculty => Err(AppError::forbidden(anyhow!(
            "Faculty accounts cannot access student records here"
        ))),
    }
}

/// The caller's faculty profile id, or `None` for administrators, who are not
/// restricted to their own courses.
#[instrument(skip(db, auth_user))]
pub async fn current_faculty_id(
    db: &PgPool,
    auth_user: &AuthUser,
) -> Result<Option<FacultyId>, AppError> {
    match auth_user.role()? {
        UserRole::Admin => Ok(None),
        UserRole::Faculty => {
            let id = sqlx::query_scalar::<_, FacultyId>("SELECT id FROM faculty WHERE user_id = $1")
                .bind(auth_user.user_id()?)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| {
                    AppError::forbidden(anyhow!("No faculty profile is linked to this account"))
                })?;
            Ok(Some(id))
        }
        _ => Err(AppError::forbidden(anyhow!("Faculty privileges required"))),
    }
}

/// Fails with 404 for an unknown course and 403 when a faculty member does
/// not teach it. Returns the caller's faculty id for use in inserts.
#[instrument(skip(db, auth_user))]
pub async fn ensure_course_access(
    db: &PgPool,
    auth_user: &AuthUser,
    course_id: CourseId,
) -> Result<Option<FacultyId>, AppError> {
    let assigned = sqlx::query_scalar::<_, Option<FacultyId>>(
        "SELECT faculty_id FROM courses WHERE id = $1",
    )
    .bind(course_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow!("Course not found")))?;

    let faculty_id = current_faculty_id(db, auth_user).await?;
    check_teaches(faculty_id, assigned)?;

    Ok(faculty_id.or(assigned))
}

/// `caller` is `None` for administrators.
pub fn check_teaches(caller: Option<FacultyId>, assigned: Option<FacultyId>) -> Result<(), AppError> {
    match caller {
        Some(me) if assigned != Some(me) => Err(AppError::forbidden(anyhow!(
            "You can only manage courses you teach"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_admin_manages_any_course() {
        assert!(check_teaches(None, Some(FacultyId::new())).is_ok());
        assert!(check_teaches(None, None).is_ok());
    }

    #[test]
    fn test_faculty_manages_own_course() {
        let me = FacultyId::new();
        assert!(check_teaches(Some(me), Some(me)).is_ok());
    }

    #[test]
    fn test_faculty_cannot_manage_other_or_unassigned_course() {
        let me = FacultyId::new();
        let err = check_teaches(Some(me), Some(FacultyId::new())).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert!(check_teaches(Some(me), None).is_err());
    }
}
