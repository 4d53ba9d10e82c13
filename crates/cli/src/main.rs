//! Countdown Events CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cd-cli migrate
//!
//! # Create an admin user (password from --password or COUNTDOWN_ADMIN_PASSWORD)
//! cd-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Reset a user's password
//! cd-cli admin set-password -e admin@example.com
//!
//! # Export join requests as CSV
//! cd-cli export join-requests --event-id aB3dE5gH -o guests.csv
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create admin users
//! - `admin set-password` - Reset a user's password
//! - `export join-requests` - Write join requests to a CSV file

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cd-cli")]
#[command(author, version, about = "Countdown Events CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Export data
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 8 characters)
        #[arg(short, long, env = "COUNTDOWN_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Set a user's password
    SetPassword {
        /// User email address
        #[arg(short, long)]
        email: String,

        /// New password (at least 8 characters)
        #[arg(short, long, env = "COUNTDOWN_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum ExportTarget {
    /// Export join requests as CSV
    JoinRequests {
        /// Only requests for this event
        #[arg(long)]
        event_id: Option<String>,

        /// Output file (defaults to join-requests-YYYY-MM-DD.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
            AdminAction::SetPassword { email, password } => {
                commands::admin::set_password(&email, &password).await?;
            }
        },
        Commands::Export { target } => match target {
            ExportTarget::JoinRequests { event_id, output } => {
                commands::export::join_requests(event_id.as_deref(), output).await?;
            }
        },
    }
    Ok(())
}
