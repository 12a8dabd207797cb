use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use scholaris_cli::admin::{NewAdmin, create_admin};
use scholaris_cli::seeder::{self, SeedConfig};
use scholaris_config::DatabaseConfig;
use scholaris_db::{PgPool, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "scholaris-cli")]
#[command(about = "Scholaris CLI - Administrative tools for Scholaris", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Seed the database with fake faculty, students, parents, and courses
    Seed {
        #[arg(long, default_value = "10")]
        faculty: usize,

        #[arg(long, default_value = "200")]
        students: usize,

        /// Percentage of students that get a parent account
        #[arg(long, default_value = "50")]
        parents_percent: usize,

        #[arg(long, default_value = "8")]
        subjects: usize,

        #[arg(long, default_value = "2")]
        courses_per_subject: usize,

        #[arg(long, default_value = "30")]
        max_students: i32,

        #[arg(long, default_value = "2024-2025")]
        academic_year: String,
    },
    /// Remove seeded data (admin accounts are kept)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let pool = match connect().await {
        Ok(pool) => pool,
        Err(e) => exit_with("Error connecting to database", e),
    };

    let result = match cli.command {
        Commands::CreateAdmin {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_admin(&pool, first_name, last_name, email, password).await,
        Commands::Migrate => run_migrations(&pool)
            .await
            .map(|_| println!("✅ Migrations applied"))
            .map_err(Into::into),
        Commands::Seed {
            faculty,
            students,
            parents_percent,
            subjects,
            courses_per_subject,
            max_students,
            academic_year,
        } => {
            let config = SeedConfig {
                faculty,
                students,
                parents_percent,
                subjects,
                courses_per_subject,
                max_students_per_course: max_students,
                academic_year,
                ..Default::default()
            };
            seeder::seed_all(&pool, config).await
        }
        Commands::ClearSeed => seeder::clear_seeded(&pool).await,
    };

    if let Err(e) = result {
        exit_with("Command failed", e);
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let config =
        DatabaseConfig::from_env().ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
    Ok(init_db_pool(&config).await?)
}

fn exit_with(context: &str, e: anyhow::Error) -> ! {
    eprintln!("\n❌ {}: {:#}", context, e);
    std::process::exit(1);
}

fn prompt(label: &str, value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::new().with_prompt(label).interact_text()?),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let first_name = prompt("First name", first_name)?;
    let last_name = prompt("Last name", last_name)?;
    let email = prompt("Email address", email)?;
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let user_id = create_admin(
        pool,
        NewAdmin {
            first_name: &first_name,
            last_name: &last_name,
            email: &email,
            password: &password,
        },
    )
    .await?;

    println!("\n✅ Admin created successfully!");
    println!("   ID: {}", user_id);
    println!("   Email: {}", email);
    println!("   Name: {} {}", first_name, last_name);

    Ok(())
}
