pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - manage portfolio content on a running Folio API server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, env = "FOLIO_SERVER", help = "Server base URL (defaults to the saved session, then http://localhost:3000)")]
    pub server: Option<String>,

    #[arg(long, global = true, env = "FOLIO_TOKEN", hide_env_values = true, help = "Session token (defaults to the saved session)")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in as the portfolio owner and save the session")]
    Login {
        #[arg(help = "Owner email")]
        email: String,
        #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true, help = "Owner password")]
        password: String,
    },

    #[command(about = "Show the signed-in identity")]
    Whoami,

    #[command(about = "Sign out and forget the saved session")]
    Logout,

    #[command(about = "List the records of a collection")]
    List {
        #[arg(value_enum)]
        collection: Collection,
    },

    #[command(about = "Remove one record from a collection")]
    Remove {
        #[arg(value_enum)]
        collection: Collection,
        #[arg(help = "Record id (or category name for skills)")]
        id: String,
    },

    #[command(about = "Blob storage operations")]
    Blob {
        #[command(subcommand)]
        cmd: commands::blob::BlobCommands,
    },

    #[command(about = "Show the recent activity feed")]
    Activity,

    #[command(about = "Show dashboard totals")]
    Stats,

    #[command(about = "Check server health")]
    Health,
}

/// Collections reachable under `/api/<path>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Projects,
    Certifications,
    Timeline,
    KeySkills,
    Skills,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Certifications => "certifications",
            Collection::Timeline => "timeline",
            Collection::KeySkills => "key-skills",
            Collection::Skills => "skills",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::from_session(cli.server.clone(), cli.token.clone())?;

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&client, &email, &password, output_format).await,
        Commands::Whoami => commands::auth::whoami(&client, output_format).await,
        Commands::Logout => commands::auth::logout(&client, output_format).await,
        Commands::List { collection } => commands::data::list(&client, collection, output_format).await,
        Commands::Remove { collection, id } => commands::data::remove(&client, collection, &id, output_format).await,
        Commands::Blob { cmd } => commands::blob::handle(&client, cmd, output_format).await,
        Commands::Activity => commands::dashboard::activity(&client, output_format).await,
        Commands::Stats => commands::dashboard::stats(&client, output_format).await,
        Commands::Health => commands::server::health(&client, output_format).await,
    }
}
