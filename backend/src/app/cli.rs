use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app;
use crate::app::MigrationError;
use crate::core;
use crate::core::ServiceError;
use crate::db;
use crate::services::{credentials, tenants};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Migration creation failed")]
    MigrationCreateFailed { #[source] source: MigrationError },

    // NoMigrationsApplied is reported as informational output, not as an error.
    #[error("Checking migration status failed")]
    MigrationStatusCheckFailed { #[source] source: MigrationError },

    #[error("Running migrations failed")]
    MigrationRunFailed { #[source] source: MigrationError },

    #[error("Reading the password failed")]
    PasswordPromptFailed { #[source] source: std::io::Error },

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Operation failed: {0}")]
    ServiceFailed(#[from] ServiceError),
}

#[derive(Parser)]
#[command(name = "feedboard")]
#[command(about = "Multi-tenant feedback board server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server (the default when no command is given)
    Serve,
    /// Database migration utilities
    Migrate {
        #[command(subcommand)]
        command: MigrateCommand,
    },
    /// Register a tenant workspace
    CreateTenant {
        /// Display name of the company
        company_name: String,
        /// Unique, immutable identifier used in URLs
        slug: String,
    },
    /// Create a user in a tenant, prompting for the password
    CreateUser {
        /// Tenant the user belongs to
        #[arg(short, long)]
        tenant_id: i64,
        /// Email address used to log in
        #[arg(short, long)]
        email: String,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
}

#[derive(Subcommand)]
pub enum MigrateCommand {
    /// Create a new migration file
    Create {
        /// Name of the migration
        name: String,
    },
    /// List all embedded migrations
    List,
    /// Check if there are pending migrations
    Status,
    /// Run all pending migrations
    Run,
}

impl Command {
    #[must_use]
    pub const fn is_migration(&self) -> bool {
        matches!(self, Self::Migrate { .. })
    }
}

pub async fn run_cli(context: &core::Context, command: Command) -> Result<(), CliError> {
    match command {
        Command::Serve => {}
        Command::Migrate { command } => run_migrate_command(&context.db, command).await?,
        Command::CreateTenant { company_name, slug } => {
            let tenant = tenants::create_tenant(&context.db, &company_name, &slug).await?;
            println!("Created tenant '{}' (id {}, slug {})", tenant.company_name, tenant.id, tenant.slug);
        }
        Command::CreateUser { tenant_id, email, admin } => {
            let password = rpassword::prompt_password(format!("Enter password for '{email}': "))
                .map_err(|e| CliError::PasswordPromptFailed { source: e })?;
            if password.trim().is_empty() {
                return Err(CliError::EmptyPassword);
            }

            let role = if admin { db::Role::Admin } else { db::Role::Member };
            let user = credentials::register(&context.db, tenant_id, &email, &password, role).await?;
            println!("Created {:?} user '{}' (id {}) in tenant {}", user.role, user.email, user.id, user.tenant_id);
        }
    }
    Ok(())
}

async fn run_migrate_command(db: &core::DbContext, command: MigrateCommand) -> Result<(), CliError> {
    match command {
        MigrateCommand::Create { name } => {
            let filename = app::create_migration(&name)
                .map_err(|e| CliError::MigrationCreateFailed { source: e })?;
            println!("Created new migration file: {filename}");
        }
        MigrateCommand::List => {
            let migrations = app::list_migrations();
            if migrations.is_empty() {
                println!("No migrations found.");
            } else {
                println!("Available migrations:");
                for (i, migration) in migrations.iter().enumerate() {
                    println!("{}. {}", i + 1, migration);
                }
            }
        }
        MigrateCommand::Status => match app::check_pending_migrations(db).await {
            Ok(true) => println!("There are pending migrations that need to be applied."),
            Ok(false) => println!("Database is up to date. No pending migrations."),
            Err(MigrationError::NoMigrationsApplied) => println!("No migrations have been applied yet."),
            Err(e) => return Err(CliError::MigrationStatusCheckFailed { source: e }),
        },
        MigrateCommand::Run => {
            app::run_migrations(db)
                .await
                .map_err(|e| CliError::MigrationRunFailed { source: e })?;
            println!("Migrations applied successfully.");
        }
    }
    Ok(())
}
