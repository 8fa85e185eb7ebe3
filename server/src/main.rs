mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::Directory;
use tracing::info;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "directory-admin", version, about = "Employee directory administration")]
struct Cli {
    #[arg(long, global = true, help = "Run even when migrations are pending")]
    allow_dirty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Manage departments.
    #[command(subcommand)]
    Department(GroupCommand),
    /// Manage roles.
    #[command(subcommand)]
    Role(GroupCommand),
    /// Manage employee accounts.
    #[command(subcommand)]
    Employee(EmployeeCommand),
    /// Verify a login/password pair without changing anything.
    CheckPassword {
        /// Email or username.
        login: String,
        #[arg(long, env = "DIRECTORY_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
    /// List pending migrations.
    Status,
}

/// Departments and roles share the same administration surface.
#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    /// Print members.
    Members { id: i32 },
    Rename {
        id: i32,
        name: String,
    },
    /// Refused while employees are still assigned.
    Delete { id: i32 },
}

#[derive(Subcommand, Debug)]
pub enum EmployeeCommand {
    Add(AddEmployee),
    /// Show by id, email or username.
    Show { key: String },
    List,
    /// Change the department and/or role; omitted references are kept.
    Assign(AssignEmployee),
    /// Grant or revoke the administrator flag.
    Admin {
        id: i32,
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        enabled: bool,
    },
    /// Replace the password.
    Passwd {
        id: i32,
        #[arg(long, env = "DIRECTORY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Delete { id: i32 },
}

#[derive(Args, Debug)]
pub struct AddEmployee {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub department: Option<i32>,
    #[arg(long)]
    pub role: Option<i32>,
    #[arg(long)]
    pub admin: bool,
    #[arg(long, env = "DIRECTORY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct AssignEmployee {
    pub id: i32,
    #[arg(long, conflicts_with = "no_department")]
    pub department: Option<i32>,
    /// Remove the employee from their department.
    #[arg(long)]
    pub no_department: bool,
    #[arg(long, conflicts_with = "no_role")]
    pub role: Option<i32>,
    /// Remove the employee's role.
    #[arg(long)]
    pub no_role: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env("directory-admin")?)?;
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    match cli.command {
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
            MigrateCommand::Status => migrate_status().await,
        },
        Command::Department(cmd) => {
            let directory = open_directory(&config, cli.allow_dirty).await?;
            commands::department(&directory, cmd).await
        }
        Command::Role(cmd) => {
            let directory = open_directory(&config, cli.allow_dirty).await?;
            commands::role(&directory, cmd).await
        }
        Command::Employee(cmd) => {
            let directory = open_directory(&config, cli.allow_dirty).await?;
            commands::employee(&directory, &config, cmd).await
        }
        Command::CheckPassword { login, password } => {
            let directory = open_directory(&config, cli.allow_dirty).await?;
            commands::check_password(&directory, &login, &password).await
        }
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env()?;
    connect(&settings).await.map_err(Into::into)
}

async fn open_directory(config: &AppConfig, allow_dirty: bool) -> Result<Directory> {
    let pool = setup_pool().await?;
    ensure_migrations(&pool, allow_dirty).await?;
    Ok(Directory::with_hasher(pool, config.hasher()?))
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `directory-admin migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}

async fn migrate_status() -> Result<()> {
    let pool = setup_pool().await?;
    let pending = Migrator::get_pending_migrations(&pool).await?;
    if pending.is_empty() {
        info!("no pending migrations");
    }
    for pending_migration in pending {
        info!(name = pending_migration.name(), "pending migration");
    }
    Ok(())
}
