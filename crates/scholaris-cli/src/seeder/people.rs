//! Fake users, faculty profiles, and student profiles.

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use scholaris_models::{UserId, UserRole};
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{FacultySeed, SEED_EMAIL_DOMAIN, StudentSeed, UserSeed};

const DEPARTMENTS: &[&str] = &[
    "Mathematics",
    "Science",
    "Languages",
    "Social Studies",
    "Arts",
    "Physical Education",
];

const SECTIONS: &[&str] = &["A", "B", "C"];

/// Generates `count` users of one role in parallel. Emails embed the role and
/// index so they stay unique across runs of the same size.
pub fn generate_users(role: UserRole, count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let email = format!(
                "{}.{}+{}{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                role,
                idx,
                SEED_EMAIL_DOMAIN
            );

            UserSeed {
                first_name,
                last_name,
                email,
                password_hash: password_hash.to_string(),
                role,
            }
        })
        .collect()
}

pub fn generate_faculty(user_ids: &[UserId]) -> Vec<FacultySeed> {
    user_ids
        .par_iter()
        .enumerate()
        .map(|(idx, &user_id)| FacultySeed {
            user_id,
            employee_number: format!("SEED-EMP-{:05}", idx + 1),
            department: DEPARTMENTS[idx % DEPARTMENTS.len()].to_string(),
            joining_date: NaiveDate::from_ymd_opt(2015 + (idx % 10) as i32, 6, 1)
                .unwrap_or_default(),
        })
        .collect()
}

/// Students are spread over grades 1-12 and sections A-C; the first
/// `parent_ids.len()` students get one parent each.
pub fn generate_students(user_ids: &[UserId], parent_ids: &[UserId]) -> Vec<StudentSeed> {
    user_ids
        .par_iter()
        .enumerate()
        .map(|(idx, &user_id)| {
            let grade = idx % 12 + 1;
            StudentSeed {
                user_id,
                student_number: format!("SEED-STU-{:06}", idx + 1),
                grade_level: grade.to_string(),
                section: SECTIONS[(idx / 12) % SECTIONS.len()].to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2018 - grade as i32, 1 + (idx % 12) as u32, 15)
                    .unwrap_or_default(),
                parent_user_id: parent_ids.get(idx).copied(),
            }
        })
        .collect()
}

/// Inserts users in multi-row batches inside one transaction and returns
/// their ids in input order.
pub async fn insert_users(db: &PgPool, users: &[UserSeed]) -> anyhow::Result<Vec<UserId>> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;

    // 5 params per user, well under the 65535 bind limit
    const BATCH_SIZE: usize = 1000;

    let mut ids = Vec::with_capacity(users.len());
    for chunk in users.chunks(BATCH_SIZE) {
        ids.extend(insert_users_chunk(&mut tx, chunk).await?);
    }

    tx.commit().await?;

    println!("   ✓ Inserted {} users in {:?}", ids.len(), start_time.elapsed());
    Ok(ids)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> anyhow::Result<Vec<UserId>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO users (first_name, last_name, email, password_hash, role) VALUES ",
    );
    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 5;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5
        ));
    }
    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar::<_, UserId>(&query);
    for user in users {
        q = q
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

pub async fn insert_faculty(db: &PgPool, rows: &[FacultySeed]) -> anyhow::Result<Vec<uuid::Uuid>> {
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(rows.len());

    for chunk in rows.chunks(1000) {
        let mut query = String::from(
            "INSERT INTO faculty (user_id, employee_number, department, joining_date) VALUES ",
        );
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 4;
            query.push_str(&format!("(${}, ${}, ${}, ${})", p + 1, p + 2, p + 3, p + 4));
        }
        query.push_str(" RETURNING id");

        let mut q = sqlx::query_scalar::<_, uuid::Uuid>(&query);
        for row in chunk {
            q = q
                .bind(row.user_id)
                .bind(&row.employee_number)
                .bind(&row.department)
                .bind(row.joining_date);
        }
        ids.extend(q.fetch_all(&mut *tx).await?);
    }

    tx.commit().await?;
    Ok(ids)
}

pub async fn insert_students(db: &PgPool, rows: &[StudentSeed]) -> anyhow::Result<Vec<uuid::Uuid>> {
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(rows.len());

    for chunk in rows.chunks(1000) {
        let mut query = String::from(
            "INSERT INTO students (user_id, student_number, grade_level, section, date_of_birth, parent_user_id) VALUES ",
        );
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 6;
            query.push_str(&format!(
                "(${}, ${}, ${}, ${}, ${}, ${})",
                p + 1,
                p + 2,
                p + 3,
                p + 4,
                p + 5,
                p + 6
            ));
        }
        query.push_str(" RETURNING id");

        let mut q = sqlx::query_scalar::<_, uuid::Uuid>(&query);
        for row in chunk {
            q = q
                .bind(row.user_id)
                .bind(&row.student_number)
                .bind(&row.grade_level)
                .bind(&row.section)
                .bind(row.date_of_birth)
                .bind(row.parent_user_id);
        }
        ids.extend(q.fetch_all(&mut *tx).await?);
    }

    tx.commit().await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_emails_are_unique() {
        let users = generate_users(UserRole::Student, 50, "hash");
        let emails: HashSet<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails.len(), 50);
        assert!(users.iter().all(|u| u.email.ends_with("@example.com")));
        assert!(users.iter().all(|u| u.role == UserRole::Student));
    }

    #[test]
    fn test_students_get_parents_in_order() {
        let students: Vec<UserId> = (0..5).map(|_| UserId::new()).collect();
        let parents: Vec<UserId> = (0..2).map(|_| UserId::new()).collect();
        let rows = generate_students(&students, &parents);

        assert_eq!(rows[0].parent_user_id, Some(parents[0]));
        assert_eq!(rows[1].parent_user_id, Some(parents[1]));
        assert!(rows[2..].iter().all(|r| r.parent_user_id.is_none()));
        assert_eq!(rows[0].student_number, "SEED-STU-000001");
    }

    #[test]
    fn test_faculty_departments_rotate() {
        let users: Vec<UserId> = (0..7).map(|_| UserId::new()).collect();
        let rows = generate_faculty(&users);
        assert_eq!(rows[0].department, rows[6].department);
        assert_eq!(rows[3].employee_number, "SEED-EMP-00004");
    }
}
