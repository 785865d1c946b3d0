//! Gatecheck CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! gatecheck-cli migrate
//!
//! # Create a staff account
//! gatecheck-cli user create -e staff@example.com -n "Staff Name"
//!
//! # Seed the guest table with demo data
//! gatecheck-cli seed --count 20
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create staff accounts
//! - `seed` - Seed the database with demo guests

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gatecheck-cli")]
#[command(author, version, about = "Gatecheck CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the guest table with demo data
    Seed {
        /// Number of demo guests to create
        #[arg(short, long, default_value_t = 20)]
        count: usize,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new staff account
    Create {
        /// Staff email address
        #[arg(short, long)]
        email: String,

        /// Staff display name
        #[arg(short, long)]
        name: String,

        /// Password; a random one is generated and printed when omitted
        #[arg(short, long)]
        password: Option<String>,
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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
            } => {
                commands::user::create(&email, &name, password.as_deref()).await?;
            }
        },
        Commands::Seed { count } => commands::seed::guests(count).await?,
    }
    Ok(())
}
