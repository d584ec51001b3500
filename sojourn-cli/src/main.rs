use anyhow::Result;
use clap::{Parser, Subcommand};

mod ask;
mod auth;
mod chat;
mod config;
mod logging;
mod state;
mod store;
mod transcript;

use transcript::ChatLog;

#[derive(Parser, Debug)]
#[command(
    name = "sojourn",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SOJOURN_BUILD_SHA"), ")"),
    about = "Sojourn travel chat: describe a trip, get a reply and an itinerary"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat with the itinerary panel (TTY required)
    Chat {
        /// Act as this user for profile updates (overrides `auth sign-in`)
        #[arg(long)]
        user: Option<String>,
    },

    /// Send one message and print the reply (and itinerary, if any)
    Ask {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Print the turn outcome as JSON
        #[arg(long)]
        json: bool,

        #[arg(long)]
        user: Option<String>,
    },

    /// Manage the signed-in identity used for profile updates
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Inspect stored profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Manage ~/.sojourn/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Remember a user id
    SignIn {
        #[arg(long)]
        user: String,
    },
    /// Forget the stored user id
    SignOut,
    /// Show who is signed in
    Status,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Print the stored profile record
    Show {
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn open_log(cfg: &config::Config) -> Result<ChatLog> {
    if cfg.chat.transcript {
        Ok(ChatLog::open_today(&state::chat_dir()?))
    } else {
        Ok(ChatLog::disabled())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Chat { .. } => logging::init_file()?,
        _ => logging::init_stderr(),
    }

    match cli.command {
        Command::Chat { user } => {
            let cfg = config::load_config()?;
            let identity = auth::resolve_identity(user)?;
            let log = open_log(&cfg)?;
            chat::run_chat(&cfg, identity, log)?;
        }

        Command::Ask { text, json, user } => {
            let cfg = config::load_config()?;
            let identity = auth::resolve_identity(user)?;
            let mut log = open_log(&cfg)?;
            ask::run_ask(&text.join(" "), json, &cfg, &identity, &mut log).await?;
        }

        Command::Auth { command } => match command {
            AuthCommand::SignIn { user } => auth::sign_in(&user)?,
            AuthCommand::SignOut => auth::sign_out()?,
            AuthCommand::Status => auth::status()?,
        },

        Command::Profile { command } => match command {
            ProfileCommand::Show { user } => {
                let identity = auth::resolve_identity(user)?;
                store::show_profile(&identity)?;
            }
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}
