use crate::env::{flag_or, parsed_or};

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Returns `None` when `DATABASE_URL` is not set.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;

        Some(Self {
            url,
            max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10),
            run_migrations: flag_or("RUN_MIGRATIONS", true),
        })
    }
}
