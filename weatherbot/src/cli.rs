use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use weatherbot_core::{
    Command as BotCommand, Config, Invocation, LocationQuery, WeatherBot,
    provider::provider_from_config,
};

use crate::console::{ConsoleSink, run_console};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version, about = "Slash-command weather bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the bot token and weather API key in the config file.
    Configure,

    /// List the slash commands the bot registers.
    Commands,

    /// Read slash commands interactively, e.g. `/rain Springfield, IL`.
    Console,

    /// General weather overview for a city.
    Overview(LocationArgs),

    /// Hourly chance of rain for the next 12 hours.
    Rain(LocationArgs),

    /// Current wind speed and direction.
    Wind(LocationArgs),
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// City name.
    city: String,

    /// Optional state or region, e.g. "IL".
    #[arg(long, short)]
    region: Option<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Commands => {
                for cmd in BotCommand::all() {
                    println!("/{:<10} {}", cmd.name(), cmd.description());
                }
                Ok(())
            }
            Command::Console => run_console(start_bot()?).await,
            Command::Overview(args) => run_once(BotCommand::Overview, args).await,
            Command::Rain(args) => run_once(BotCommand::Rain, args).await,
            Command::Wind(args) => run_once(BotCommand::Wind, args).await,
        }
    }
}

/// Loads config and refuses to start without both secrets.
fn start_bot() -> anyhow::Result<WeatherBot> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    info!(endpoints = ?config.endpoints, "bot ready");
    Ok(WeatherBot::from_provider(provider))
}

async fn run_once(command: BotCommand, args: LocationArgs) -> anyhow::Result<()> {
    let bot = start_bot()?;
    let query = LocationQuery::new(args.city, args.region)?;
    bot.dispatch(&Invocation::new(command, query), &ConsoleSink).await
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let token = inquire::Password::new("Bot token:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current value")
        .prompt()
        .context("Failed to read bot token")?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current value")
        .prompt()
        .context("Failed to read weather API key")?;

    if !token.trim().is_empty() {
        config.discord_token = Some(token.trim().to_string());
    }
    if !api_key.trim().is_empty() {
        config.weather_api_key = Some(api_key.trim().to_string());
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
