use chrono::{DateTime, NaiveDate, Utc};
use tarifa_cache::{CacheError, DailyPriceCache};
use tarifa_models::config::BotConfig;
use tarifa_triggers::TriggerEngine;
use tracing::{debug, info};

pub const HELP_TEXT: &str = "Comandos disponibles:\n \
    - /start - Comienza a interactuar con el bot\n \
    - /help - Mostrar las interacciones disponibles\n \
    - /status - Mostrar el estado del bot\n \
    - /cheapest - Mostrar las horas más baratas de hoy\n";

/// Markdown greeting for a new human member.
const WELCOME_MEMBER: &str = "Welcome {name}!! I am a friendly and polite *bot* 🤖";
/// Markdown notice when another bot joins the chat.
const WELCOME_BOT: &str = "{name} is a *bot*!! -> It could be kindly removed 🗑";

/// An incoming chat message, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    Cheapest,
    /// Someone joined the chat. `/join <name> [bot]` stands in for the
    /// transport's new-member event.
    Join { name: String, is_bot: bool },
    /// A `/command` the bot does not know.
    Unknown(String),
    /// Free text, candidate for a trigger reply.
    Text(String),
}

impl Command {
    /// Accepts `/name` and `/name@botname`, case-insensitive. Arguments are
    /// ignored except by `/join`.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Command::Text(trimmed.to_string());
        };

        let mut args = rest.split_whitespace();
        let token = args.next().unwrap_or_default();
        let name = token.split('@').next().unwrap_or_default().to_lowercase();
        match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "status" => Command::Status,
            "cheapest" => Command::Cheapest,
            "join" => Self::parse_join(args.collect()).unwrap_or(Command::Unknown(name)),
            _ => Command::Unknown(name),
        }
    }

    /// A trailing `bot` marks the member as a bot; it is not part of the name.
    fn parse_join(mut args: Vec<&str>) -> Option<Self> {
        let is_bot = args.len() > 1 && args.last().is_some_and(|a| a.eq_ignore_ascii_case("bot"));
        if is_bot {
            args.pop();
        }
        if args.is_empty() {
            return None;
        }
        Some(Command::Join {
            name: args.join(" "),
            is_bot,
        })
    }
}

/// Routes chat input into the price cache and the trigger engine and
/// renders the replies as text (HTML for prices).
pub struct Bot {
    config: BotConfig,
    cache: DailyPriceCache,
    triggers: TriggerEngine,
    started_at: DateTime<Utc>,
}

impl Bot {
    pub fn new(config: BotConfig, cache: DailyPriceCache, triggers: TriggerEngine) -> Self {
        Self {
            config,
            cache,
            triggers,
            started_at: Utc::now(),
        }
    }

    pub fn with_start_time(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn cache(&self) -> &DailyPriceCache {
        &self.cache
    }

    /// Handle one message. `Ok(None)` means the bot stays silent.
    /// Price fetch failures are returned for the transport to report.
    pub async fn handle(
        &self,
        input: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, CacheError> {
        match Command::parse(input) {
            Command::Start => {
                info!("Received command /start");
                Ok(Some(self.start()))
            }
            Command::Help => {
                info!("Received command /help");
                Ok(Some(HELP_TEXT.to_string()))
            }
            Command::Status => {
                info!("Received command /status");
                Ok(Some(self.status(now)))
            }
            Command::Cheapest => {
                info!("Received command /cheapest");
                self.cheapest(now.date_naive()).await.map(Some)
            }
            Command::Join { name, is_bot } => {
                info!(member = %name, is_bot, "New chat member");
                Ok(Some(self.welcome(&name, is_bot)))
            }
            Command::Unknown(name) => {
                debug!(command = %name, "Ignoring unknown command");
                Ok(None)
            }
            Command::Text(text) => Ok(self.reply(&text)),
        }
    }

    pub fn start(&self) -> String {
        self.config.greeting.clone()
    }

    /// Markdown welcome for a new chat member. Bots get a removal hint instead.
    pub fn welcome(&self, name: &str, is_bot: bool) -> String {
        let template = if is_bot { WELCOME_BOT } else { WELCOME_MEMBER };
        template.replace("{name}", name)
    }

    pub fn status(&self, now: DateTime<Utc>) -> String {
        format!(
            "Status is OK, running since {}",
            crate::uptime::since(self.started_at, now)
        )
    }

    /// Today's cheapest slots as an HTML message.
    pub async fn cheapest(&self, today: NaiveDate) -> Result<String, CacheError> {
        let lines = self.cache.get(today).await?;
        Ok(render_html(&lines))
    }

    /// Trigger reply for free text, if replies are enabled and the gate allows it.
    pub fn reply(&self, text: &str) -> Option<String> {
        if !self.config.replies_enabled || text.is_empty() {
            return None;
        }
        let decision = self.triggers.match_message(text)?;
        info!(trigger = %decision.matched_trigger, reply = %decision.chosen_reply, "Sending trigger reply");
        Some(decision.chosen_reply)
    }
}

/// Join display lines with the header preformatted, for HTML parse mode.
pub fn render_html(lines: &[String]) -> String {
    let mut iter = lines.iter();
    let mut out = match iter.next() {
        Some(header) => format!("<pre>{header}</pre>"),
        None => return String::new(),
    };
    for line in iter {
        out.push('\n');
        out.push_str(line);
    }
    out
}
