pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Catalog CLI - development tooling for the product catalog API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a development JWT for a user")]
    Token {
        #[arg(long, help = "User id (a random one is generated when omitted)")]
        user: Option<Uuid>,
    },

    #[command(about = "Validate a JSON or YAML product batch offline")]
    Validate {
        #[arg(help = "Path to a list of products or a {products: [...]} document")]
        file: PathBuf,
    },

    #[command(about = "Apply the products schema to DATABASE_URL")]
    Migrate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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

    /// Print `report` as pretty JSON, or hand it to `text` for the terminal
    pub fn emit<T: Serialize>(&self, report: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
            OutputFormat::Text => text(report),
        }
        Ok(())
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token { user } => commands::token::handle(user, output_format),
        Commands::Validate { file } => commands::validate::handle(&file, output_format),
        Commands::Migrate => commands::migrate::handle(output_format).await,
    }
}
