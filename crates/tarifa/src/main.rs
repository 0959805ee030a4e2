use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const FETCH_FAILED: &str = "No se han podido obtener los precios. Inténtalo más tarde.";

#[derive(Parser, Debug)]
#[command(name = "tarifa", about = "Spanish electricity price chat bot")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/tarifa.toml")]
    config: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Print today's cheapest hours
    Cheapest,
    /// Print the trigger reply for a message, if any
    Reply { text: String },
    /// Print the bot status
    Status,
    /// Print the command list
    Help,
    /// Print the greeting
    Start,
    /// Print the welcome for a new chat member
    Welcome {
        name: String,
        /// The member is a bot
        #[arg(long)]
        bot: bool,
    },
    /// Read messages from stdin, one per line, and answer each
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = tarifa::load_config(&cli.config)?;

    // Initialize tracing (RUST_LOG wins over bot.log_level)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.bot.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Bot configuration:");
    for (name, value) in config.log_entries() {
        tracing::info!(setting = name, %value, "  config");
    }

    let bot = tarifa::build_bot(&config).context("Failed to build bot")?;

    match cli.action {
        Action::Cheapest => {
            let message = bot
                .cheapest(Utc::now().date_naive())
                .await
                .context("Failed to get cheapest prices")?;
            println!("{message}");
        }
        Action::Reply { text } => {
            if let Some(reply) = bot.reply(&text) {
                println!("{reply}");
            }
        }
        Action::Status => println!("{}", bot.status(Utc::now())),
        Action::Help => print!("{}", tarifa::bot::HELP_TEXT),
        Action::Start => println!("{}", bot.start()),
        Action::Welcome { name, bot: is_bot } => println!("{}", bot.welcome(&name, is_bot)),
        Action::Chat => chat(&bot).await?,
    }

    Ok(())
}

/// Stand-in transport: each stdin line is one incoming chat message.
async fn chat(bot: &tarifa::Bot) -> Result<()> {
    tracing::info!("Bot is ready");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match bot.handle(&line, Utc::now()).await {
                    Ok(Some(reply)) => println!("{reply}"),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to answer message");
                        println!("{FETCH_FAILED}");
                    }
                }
            }
        }
    }

    tracing::info!("Bot stopped");
    Ok(())
}
