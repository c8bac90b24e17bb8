//! services/api/src/bin/provision.rs
//!
//! Account provisioning against the PostgreSQL store: creates admins and
//! assigns login passwords to imported instructor and student records.

use api_lib::{adapters::DbAdapter, config::ConfigError, error::ApiError, web::password::hash_password};
use clap::{Parser, Subcommand, ValueEnum};
use portal_core::{ports::DatabaseService, Role};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Portal account provisioning
#[derive(Parser)]
#[command(name = "provision")]
#[command(version)]
struct Args {
    /// PostgreSQL connection string; falls back to DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new admin account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Set the password of an existing instructor or student
    SetPassword {
        #[arg(long, value_enum)]
        role: AccountKind,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AccountKind {
    Instructor,
    Student,
}

impl From<AccountKind> for Role {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Instructor => Role::Instructor,
            AccountKind::Student => Role::Student,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("info"))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;
    let db = DbAdapter::new(pool);
    db.run_migrations().await?;

    match args.command {
        Command::CreateAdmin {
            email,
            password,
            full_name,
        } => {
            if password.is_empty() {
                return Err(ApiError::BadRequest("Password must not be empty".to_string()));
            }
            let hash = hash_password(&password)?;
            let admin = db.create_admin(&email, full_name.as_deref(), &hash).await?;
            info!(admin_id = %admin.id, %email, "Admin created");
        }
        Command::SetPassword {
            role,
            email,
            password,
        } => {
            if password.is_empty() {
                return Err(ApiError::BadRequest("Password must not be empty".to_string()));
            }
            let role = Role::from(role);
            let hash = hash_password(&password)?;
            let id = db.set_password_hash_by_email(role, &email, &hash).await?;
            info!(%role, %id, %email, "Password assigned");
        }
    }

    Ok(())
}
