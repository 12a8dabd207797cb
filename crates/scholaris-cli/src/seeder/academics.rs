//! Subjects, courses, and enrollments.

use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

use super::models::{SeedConfig, SubjectSeed};

const SUBJECT_NAMES: &[(&str, &str)] = &[
    ("Mathematics", "Mathematics"),
    ("Physics", "Science"),
    ("Chemistry", "Science"),
    ("Biology", "Science"),
    ("English", "Languages"),
    ("History", "Social Studies"),
    ("Geography", "Social Studies"),
    ("Art", "Arts"),
    ("Music", "Arts"),
    ("Computer Science", "Science"),
];

pub fn generate_subjects(count: usize) -> Vec<SubjectSeed> {
    (0..count)
        .map(|idx| {
            let (name, department) = SUBJECT_NAMES[idx % SUBJECT_NAMES.len()];
            let round = idx / SUBJECT_NAMES.len();
            let name = if round == 0 {
                name.to_string()
            } else {
                format!("{name} {}", round + 1)
            };
            SubjectSeed {
                code: format!("SEED-SUB-{:03}", idx + 1),
                name,
                department: department.to_string(),
                credits: 2 + (idx % 4) as i32,
            }
        })
        .collect()
}

pub async fn insert_subjects(db: &PgPool, subjects: &[SubjectSeed]) -> anyhow::Result<Vec<Uuid>> {
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(subjects.len());

    for subject in subjects {
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO subjects (code, name, department, credits) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&subject.code)
        .bind(&subject.name)
        .bind(&subject.department)
        .bind(subject.credits)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;
    Ok(ids)
}

/// Creates `courses_per_subject` courses for each subject, handing them to
/// faculty round-robin. Returns `(course_id, max_students)` pairs.
pub async fn insert_courses(
    db: &PgPool,
    subject_ids: &[Uuid],
    faculty_ids: &[Uuid],
    config: &SeedConfig,
) -> anyhow::Result<Vec<(Uuid, i32)>> {
    let mut tx = db.begin().await?;
    let mut courses = Vec::with_capacity(config.total_courses());

    for (subject_idx, subject_id) in subject_ids.iter().enumerate() {
        for section in 0..config.courses_per_subject {
            let n = subject_idx * config.courses_per_subject + section;
            let faculty_id = if faculty_ids.is_empty() {
                None
            } else {
                Some(faculty_ids[n % faculty_ids.len()])
            };

            let id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO courses (code, name, subject_id, faculty_id, academic_year, session, max_students)
                SELECT $1, s.name || ' - Section ' || $2, s.id, $3, $4, $5, $6
                FROM subjects s WHERE s.id = $7
                RETURNING id
                "#,
            )
            .bind(format!("SEED-CRS-{:04}", n + 1))
            .bind(((b'A' + (section % 26) as u8) as char).to_string())
            .bind(faculty_id)
            .bind(&config.academic_year)
            .bind(config.session)
            .bind(config.max_students_per_course)
            .bind(subject_id)
            .fetch_one(&mut *tx)
            .await?;

            courses.push((id, config.max_students_per_course));
        }
    }

    tx.commit().await?;
    Ok(courses)
}

/// Deals students into courses without exceeding any course's capacity.
pub fn plan_enrollments(student_ids: &[Uuid], courses: &[(Uuid, i32)]) -> Vec<(Uuid, Uuid)> {
    if courses.is_empty() {
        return Vec::new();
    }

    courses
        .par_iter()
        .enumerate()
        .flat_map(|(course_idx, &(course_id, capacity))| {
            student_ids
                .iter()
                .skip(course_idx % student_ids.len().max(1))
                .step_by(courses.len())
                .take(capacity.max(0) as usize)
                .map(|&student_id| (course_id, student_id))
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn insert_enrollments(db: &PgPool, pairs: &[(Uuid, Uuid)]) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;
    let mut inserted = 0;

    for chunk in pairs.chunks(2000) {
        let (course_ids, student_ids): (Vec<Uuid>, Vec<Uuid>) = chunk.iter().copied().unzip();
        inserted += sqlx::query(
            r#"
            INSERT INTO course_enrollments (course_id, student_id)
            SELECT * FROM UNNEST($1::uuid[], $2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&course_ids)
        .bind(&student_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    println!("   ✓ Inserted {} enrollments in {:?}", inserted, start_time.elapsed());
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_subject_codes_unique_past_name_list() {
        let subjects = generate_subjects(25);
        let codes: HashSet<_> = subjects.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes.len(), 25);
        assert_eq!(subjects[10].name, "Mathematics 2");
        assert!(subjects.iter().all(|s| (0..=20).contains(&s.credits)));
    }

    #[test]
    fn test_enrollment_plan_respects_capacity() {
        let students: Vec<Uuid> = (0..100).map(|_| Uuid::new_v4()).collect();
        let courses: Vec<(Uuid, i32)> = (0..3).map(|_| (Uuid::new_v4(), 10)).collect();
        let plan = plan_enrollments(&students, &courses);

        let mut per_course: HashMap<Uuid, usize> = HashMap::new();
        for (course_id, _) in &plan {
            *per_course.entry(*course_id).or_default() += 1;
        }
        assert!(per_course.values().all(|&n| n <= 10));

        let unique: HashSet<_> = plan.iter().collect();
        assert_eq!(unique.len(), plan.len());
    }

    #[test]
    fn test_enrollment_plan_without_students() {
        let courses = vec![(Uuid::new_v4(), 5)];
        assert!(plan_enrollments(&[], &courses).is_empty());
        assert!(plan_enrollments(&[Uuid::new_v4()], &[]).is_empty());
    }
}
