//! Pandí Dorty CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pd-cli migrate
//!
//! # Create an admin (ADMIN_EMAIL and ADMIN_PASSWORD from the environment)
//! pd-cli admin create "Jana Nováková"
//!
//! # Show wedding tasting occupancy
//! pd-cli capacity
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin users
//! - `capacity` - Report capacity-limited order kinds

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pd-cli")]
#[command(author, version, about = "Pandí Dorty CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Report wedding tasting occupancy
    Capacity {
        /// Maximum number of wedding tasting orders
        #[arg(long, env = "WEDDING_TASTING_CAPACITY", default_value_t = 15)]
        max: u32,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user from `ADMIN_EMAIL` and `ADMIN_PASSWORD`
    Create {
        /// Admin display name
        name: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { name } => {
                commands::admin::create_user(&name).await?;
            }
        },
        Commands::Capacity { max } => {
            commands::capacity::report(max).await?;
        }
    }
    Ok(())
}
