//! Development data seeding.
//!
//! Row generation runs on the rayon pool; inserts go through multi-row
//! statements inside one transaction per table. All accounts share one bcrypt
//! hash computed at a low cost, since hashing per user would dominate the run.

pub mod academics;
pub mod models;
pub mod people;

use scholaris_models::UserRole;
use sqlx::PgPool;
use std::time::Instant;

pub use models::{SEED_EMAIL_DOMAIN, SEED_PASSWORD, SeedConfig};

const SEED_BCRYPT_COST: u32 = 4;

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<()> {
    let start_time = Instant::now();

    println!("🌱 Seeding database...");
    println!("   - Faculty: {}", config.faculty);
    println!("   - Students: {} ({} with parents)", config.students, config.parents());
    println!(
        "   - Courses: {} ({} subjects x {})",
        config.total_courses(),
        config.subjects,
        config.courses_per_subject
    );

    let password_hash = bcrypt::hash(SEED_PASSWORD, SEED_BCRYPT_COST)?;

    println!("👩‍🏫 Seeding faculty...");
    let faculty_users = people::generate_users(UserRole::Faculty, config.faculty, &password_hash);
    let faculty_user_ids = people::insert_users(db, &faculty_users).await?;
    let faculty_ids =
        people::insert_faculty(db, &people::generate_faculty(&faculty_user_ids)).await?;

    println!("👪 Seeding parents...");
    let parent_users = people::generate_users(UserRole::Parent, config.parents(), &password_hash);
    let parent_ids = people::insert_users(db, &parent_users).await?;

    println!("🎓 Seeding students...");
    let student_users = people::generate_users(UserRole::Student, config.students, &password_hash);
    let student_user_ids = people::insert_users(db, &student_users).await?;
    let student_ids = people::insert_students(
        db,
        &people::generate_students(&student_user_ids, &parent_ids),
    )
    .await?;

    println!("📚 Seeding subjects and courses...");
    let subject_ids =
        academics::insert_subjects(db, &academics::generate_subjects(config.subjects)).await?;
    let courses = academics::insert_courses(db, &subject_ids, &faculty_ids, &config).await?;
    academics::insert_enrollments(db, &academics::plan_enrollments(&student_ids, &courses))
        .await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!(
        "   Seeded accounts use the password '{}' and emails @{}",
        SEED_PASSWORD, SEED_EMAIL_DOMAIN
    );

    Ok(())
}

/// Removes seeded users (cascading to their profiles, enrollments and
/// records), then seeded courses and subjects. Admin accounts are kept.
pub async fn clear_seeded(db: &PgPool) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let mut tx = db.begin().await?;

    let courses = sqlx::query("DELETE FROM courses WHERE code LIKE 'SEED-CRS-%'")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let subjects = sqlx::query("DELETE FROM subjects WHERE code LIKE 'SEED-SUB-%'")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let users = sqlx::query("DELETE FROM users WHERE email LIKE $1 AND role <> $2")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .bind(UserRole::Admin)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    println!(
        "   ✓ Deleted {} users, {} courses, {} subjects in {:?}",
        users,
        courses,
        subjects,
        start_time.elapsed()
    );

    Ok(())
}
