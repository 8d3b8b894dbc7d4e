use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use console_shell_lib::router::SessionStatus;
use console_shell_lib::{ConsoleConfig, ConsoleShell, ThemePreference, VERSION};

#[derive(Parser)]
#[command(name = "console-shell")]
#[command(version = VERSION)]
#[command(about = "Gateway admin console client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file; environment variables fill missing fields
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange credentials for a session token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "CONSOLE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Drop the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Inspect or change the theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Navigate to a console path through the route guard
    Navigate {
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Manage the signed-in account
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Print the active preference and appearance
    Show,
    /// Set the preference (light, dark or auto)
    Set {
        #[arg(value_name = "THEME")]
        theme: ThemePreference,
    },
    /// Cycle light, dark, auto
    Toggle,
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Change the password
    Password {
        #[arg(long, env = "CONSOLE_OLD_PASSWORD", hide_env_values = true)]
        old: String,
        #[arg(long, env = "CONSOLE_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
    /// Change the username
    Username {
        #[arg(value_name = "NEW_USERNAME")]
        new_username: String,
    },
    /// Issue a new gateway API key
    ApiKey,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    let env_file_path = dotenvy::dotenv().ok();

    // Initialize the tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "console_shell_lib=debug,warn".into()
            } else {
                "console_shell_lib=info,warn".into()
            }
        }))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    match env_file_path {
        Some(path) => info!("Loaded environment variables from {}", path.display()),
        None => debug!("No .env file found. Using existing environment variables."),
    };

    let cli = Cli::parse();
    let config = ConsoleConfig::load(cli.config.as_deref())?;
    info!(origin = %config.origin, "Console client starting");

    let mut shell = ConsoleShell::from_config(&config)?;
    shell.start().await;
    // Let the restored token verify before acting on it
    shell.settle().await;
    shell.reload_if_requested().await;

    let result = execute(&shell, cli.command).await;
    shell.reload_if_requested().await;
    result
}

async fn execute(shell: &ConsoleShell, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            let phase = shell
                .session()
                .login(&username, &password)
                .await
                .context("Login failed")?;
            if !shell.session().is_logged_in() {
                return Err(anyhow!("Login succeeded but the profile could not be loaded"));
            }
            shell.theme().load_theme().await;
            println!("Logged in as {} ({:?})", username, phase);
        }
        Commands::Logout => {
            shell.session().logout();
            println!("Logged out");
        }
        Commands::Whoami => {
            let snapshot = shell.session().snapshot();
            match snapshot.user {
                Some(user) => {
                    println!("{} (id {})", user.username, user.id);
                    println!("admin:   {}", user.is_admin);
                    println!("api key: {}", user.api_key);
                    println!("session: {:?} since {}", snapshot.phase, snapshot.since.to_rfc3339());
                }
                None => return Err(anyhow!("Not logged in ({:?})", snapshot.phase)),
            }
        }
        Commands::Theme { command } => {
            let theme = shell.theme();
            match command {
                ThemeCommands::Show => {}
                ThemeCommands::Set { theme: value } => theme.set_theme(value).await,
                ThemeCommands::Toggle => {
                    theme.toggle_theme().await;
                }
            }
            println!("{} ({:?})", theme.theme(), theme.appearance());
        }
        Commands::Navigate { path } => {
            let outcome = shell.navigate(&path)?;
            for hop in &outcome.redirects {
                debug!(hop = %hop, "Followed redirect");
            }
            println!(
                "{} -> {}",
                outcome.requested,
                outcome.route.name.unwrap_or(outcome.route.path.as_str())
            );
        }
        Commands::Account { command } => {
            let session = shell.session();
            match command {
                AccountCommands::Password { old, new } => {
                    let ack = session.change_password(&old, &new).await?;
                    println!("{}", ack.message);
                }
                AccountCommands::Username { new_username } => {
                    let ack = session.change_username(&new_username).await?;
                    println!("{}", ack.message);
                }
                AccountCommands::ApiKey => {
                    let key = session.regenerate_api_key().await?;
                    println!("{}", key);
                }
            }
        }
    }
    Ok(())
}
