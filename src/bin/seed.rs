//! Account provisioning CLI.
//!
//! Creates or refreshes well-known accounts directly against the user store.
//! Exit code is 0 on success, 1 on any failure; passwords are never printed.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use esgrid::config::Configuration;
use esgrid::crypto::PasswordManager;
use esgrid::database::{DEFAULT_DATABASE_PATH, DEFAULT_POOL_SIZE, Database};
use esgrid::user::{
    Account, BatchOutcome, Role, UserService, well_known_accounts,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum RoleArg {
    User,
    Admin,
    SuperAdmin,
    Supervisor,
    DataEntry,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
            RoleArg::SuperAdmin => Role::SuperAdmin,
            RoleArg::Supervisor => Role::Supervisor,
            RoleArg::DataEntry => Role::DataEntry,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Create or refresh a single approved account.
    User {
        #[clap(long, short)]
        email: String,
        #[clap(long, short)]
        password: String,
        /// Display name.
        #[clap(long, short)]
        name: String,
        #[clap(long, short, value_enum, default_value = "user")]
        role: RoleArg,
    },
    /// Provision the well-known accounts, skipping existing ones.
    Batch,
}

#[tokio::main]
async fn main() -> ExitCode {
    esgrid::telemetry::init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "seeding failed");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Configuration::default().read()?;

    let (path, pool_size) = match &config.sqlite {
        Some(sqlite) => (
            sqlite.path.clone(),
            sqlite.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
        ),
        None => (DEFAULT_DATABASE_PATH.to_owned(), DEFAULT_POOL_SIZE),
    };
    let db = Database::new(&path, pool_size).await?;
    db.migrate().await?;

    let pwd = PasswordManager::new(config.argon2.clone())?;
    let service = UserService::new(db.sqlite, Arc::new(pwd));

    match args.cmd {
        Commands::User {
            email,
            password,
            name,
            role,
        } => {
            let outcome = service
                .provision(&Account {
                    email: email.clone(),
                    password,
                    full_name: name,
                    role: role.into(),
                })
                .await?;

            println!("Account {email:?} {outcome:?}.");
            Ok(())
        },
        Commands::Batch => {
            let outcomes = service.provision_batch(&well_known_accounts()).await;

            let mut failures = 0;
            for (email, outcome) in &outcomes {
                match outcome {
                    BatchOutcome::Created => println!("Account {email:?} created."),
                    BatchOutcome::Skipped => println!("Account {email:?} already exists, skipped."),
                    BatchOutcome::Failed(reason) => {
                        failures += 1;
                        eprintln!("Account {email:?} failed: {reason}");
                    },
                }
            }

            if failures > 0 {
                return Err(format!("{failures} account(s) failed").into());
            }
            Ok(())
        },
    }
}
