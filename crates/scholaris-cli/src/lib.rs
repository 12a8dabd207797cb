//! # Scholaris CLI
//!
//! Administrative helpers used by the `scholaris-cli` binary: creating the
//! first admin account and seeding development data.

pub mod admin;
pub mod seeder;
