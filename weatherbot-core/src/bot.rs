//! Command pipeline: invocation → resolve → fetch → format → reply.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tracing::info;

use crate::{
    error::{QueryError, WeatherError},
    model::{ForecastPayload, LocationQuery},
    present::{self, Embed},
    provider::{ForecastFetcher, LocationResolver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Overview,
    Rain,
    Wind,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Overview => "overview",
            Command::Rain => "rain",
            Command::Wind => "wind",
        }
    }

    /// Help text registered with the host.
    pub fn description(&self) -> &'static str {
        match self {
            Command::Overview => {
                "Get a general weather overview for a city (and optional state)."
            }
            Command::Rain => "Shows the hourly chance of rain for the next 12 hours.",
            Command::Wind => "Check the wind conditions for a city (and optional state).",
        }
    }

    pub const fn all() -> &'static [Command] {
        &[Command::Overview, Command::Rain, Command::Wind]
    }

    pub fn render(&self, query: &LocationQuery, payload: &ForecastPayload) -> Embed {
        match self {
            Command::Overview => present::overview(query, payload),
            Command::Rain => present::rain(query, payload),
            Command::Wind => present::wind(query, payload),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&str> for Command {
    type Error = QueryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "overview" => Ok(Command::Overview),
            "rain" => Ok(Command::Rain),
            "wind" => Ok(Command::Wind),
            _ => Err(QueryError::UnknownCommand(value.to_string())),
        }
    }
}

/// One user issuing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub query: LocationQuery,
}

impl Invocation {
    pub fn new(command: Command, query: LocationQuery) -> Self {
        Self { command, query }
    }

    /// Parse a typed slash-command line.
    ///
    /// Accepts `/rain Springfield, IL` (comma separates the region) and the
    /// named-option form `/rain city:Springfield region:IL`.
    pub fn parse(line: &str) -> Result<Self, QueryError> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);

        let (name, args) = match line.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (line, ""),
        };

        let command = Command::try_from(name)?;
        let (city, region) = if args.starts_with("city:") || args.starts_with("region:") {
            parse_named_options(args)
        } else {
            match args.split_once(',') {
                Some((city, region)) => (Some(city.to_string()), Some(region.to_string())),
                None => (Some(args.to_string()), None),
            }
        };

        let city = city
            .filter(|c| !c.trim().is_empty())
            .ok_or(QueryError::MissingCity { command: command.name() })?;

        Ok(Self { command, query: LocationQuery::new(city, region)? })
    }
}

#[derive(Clone, Copy)]
enum OptionKey {
    City,
    Region,
}

/// Splits `city:New York region:NY` into its two values. A key's value runs
/// until the next recognised `key:` token.
fn parse_named_options(args: &str) -> (Option<String>, Option<String>) {
    let mut city: Option<Vec<&str>> = None;
    let mut region: Option<Vec<&str>> = None;
    let mut key = None;

    for word in args.split_whitespace() {
        let word = if let Some(rest) = word.strip_prefix("city:") {
            key = Some(OptionKey::City);
            city = Some(Vec::new());
            rest
        } else if let Some(rest) = word.strip_prefix("region:") {
            key = Some(OptionKey::Region);
            region = Some(Vec::new());
            rest
        } else {
            word
        };

        let words = match key {
            Some(OptionKey::City) => city.as_mut(),
            Some(OptionKey::Region) => region.as_mut(),
            None => None,
        };
        if let Some(words) = words.filter(|_| !word.is_empty()) {
            words.push(word);
        }
    }

    let join = |words: Vec<&str>| words.join(" ");
    (city.map(join), region.map(join))
}

/// What the bot sends back for an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Embed(Embed),
    /// Plain text; `ephemeral` notices are visible only to the invoker.
    Notice { content: String, ephemeral: bool },
}

impl Reply {
    pub fn failure(query: &LocationQuery, err: WeatherError) -> Self {
        Reply::Notice { content: err.user_message(&query.verbatim()), ephemeral: true }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Reply::Notice { ephemeral: true, .. })
    }
}

/// Where replies go; implemented by the host.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: Reply) -> anyhow::Result<()>;
}

/// Stateless handler shared by every invocation.
#[derive(Debug, Clone)]
pub struct WeatherBot {
    resolver: Arc<dyn LocationResolver>,
    fetcher: Arc<dyn ForecastFetcher>,
}

impl WeatherBot {
    pub fn new(resolver: Arc<dyn LocationResolver>, fetcher: Arc<dyn ForecastFetcher>) -> Self {
        Self { resolver, fetcher }
    }

    /// Convenience for a provider that does both lookups.
    pub fn from_provider<P>(provider: P) -> Self
    where
        P: LocationResolver + ForecastFetcher + 'static,
    {
        let provider = Arc::new(provider);
        Self { resolver: provider.clone(), fetcher: provider }
    }

    /// Resolve then fetch; the fetch never runs without coordinates.
    pub async fn forecast(&self, query: &LocationQuery) -> Result<ForecastPayload, WeatherError> {
        let coord = self.resolver.resolve(query).await?;
        self.fetcher.fetch(coord).await
    }

    pub async fn handle(&self, invocation: &Invocation) -> Reply {
        let Invocation { command, query } = invocation;

        let reply = self
            .forecast(query)
            .await
            .map(|payload| command.render(query, &payload))
            .map_or_else(|err| Reply::failure(query, err), Reply::Embed);

        info!(
            command = %command,
            location = %query.verbatim(),
            ok = !reply.is_ephemeral(),
            "handled invocation"
        );

        reply
    }

    pub async fn dispatch(&self, invocation: &Invocation, sink: &dyn ReplySink) -> anyhow::Result<()> {
        let reply = self.handle(invocation).await;
        sink.send(reply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, GeoCoordinate};
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    struct FixedResolver(Option<GeoCoordinate>);

    #[async_trait]
    impl LocationResolver for FixedResolver {
        async fn resolve(&self, _query: &LocationQuery) -> Result<GeoCoordinate, WeatherError> {
            self.0.ok_or(WeatherError::NotFound)
        }
    }

    #[derive(Debug, Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ForecastFetcher for CountingFetcher {
        async fn fetch(&self, _coord: GeoCoordinate) -> Result<ForecastPayload, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WeatherError::Unavailable);
            }
            Ok(ForecastPayload {
                current: CurrentConditions {
                    temperature_f: 72.5,
                    feels_like_f: 70.1,
                    humidity_pct: 40,
                    weather_description: "clear sky".into(),
                    weather_icon_id: "01d".into(),
                    wind_speed_mph: 5.0,
                    wind_direction_deg: 90,
                },
                hourly: Vec::new(),
                utc_offset_seconds: 0,
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<Reply>>);

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn send(&self, reply: Reply) -> anyhow::Result<()> {
            self.0.lock().map_err(|_| anyhow::anyhow!("poisoned"))?.push(reply);
            Ok(())
        }
    }

    const SPRINGFIELD: GeoCoordinate = GeoCoordinate { latitude: 39.8, longitude: -89.6 };

    fn bot(coord: Option<GeoCoordinate>, fetcher: Arc<CountingFetcher>) -> WeatherBot {
        WeatherBot::new(Arc::new(FixedResolver(coord)), fetcher)
    }

    #[test]
    fn command_name_roundtrip() {
        for cmd in Command::all() {
            assert_eq!(Command::try_from(cmd.name()), Ok(*cmd));
        }
        assert_eq!(Command::try_from("RAIN"), Ok(Command::Rain));
    }

    #[test]
    fn unknown_command_error() {
        let err = Command::try_from("snow").unwrap_err();
        assert!(err.to_string().contains("Unknown command 'snow'"));
    }

    #[test]
    fn parse_positional_with_region() {
        let inv = Invocation::parse("/rain Springfield, IL").unwrap();
        assert_eq!(inv.command, Command::Rain);
        assert_eq!(inv.query.city, "Springfield");
        assert_eq!(inv.query.region.as_deref(), Some("IL"));
    }

    #[test]
    fn parse_positional_multi_word_city() {
        let inv = Invocation::parse("wind  new york ").unwrap();
        assert_eq!(inv.command, Command::Wind);
        assert_eq!(inv.query.city, "new york");
        assert_eq!(inv.query.region, None);
    }

    #[test]
    fn parse_named_options_in_any_order() {
        let inv = Invocation::parse("/overview region:ny city:New York").unwrap();
        assert_eq!(inv.query.city, "New York");
        assert_eq!(inv.query.region.as_deref(), Some("ny"));
    }

    #[test]
    fn parse_requires_city() {
        let err = Invocation::parse("/wind").unwrap_err();
        assert_eq!(err, QueryError::MissingCity { command: "wind" });

        let err = Invocation::parse("/wind region:IL").unwrap_err();
        assert_eq!(err, QueryError::MissingCity { command: "wind" });
    }

    #[tokio::test]
    async fn every_command_fails_when_location_not_found() {
        for cmd in Command::all() {
            let fetcher = Arc::new(CountingFetcher::default());
            let bot = bot(None, fetcher.clone());
            let inv = Invocation::new(*cmd, LocationQuery::new("Nowhereville", None).unwrap());

            let reply = bot.handle(&inv).await;

            assert_eq!(reply, Reply::Notice {
                content: "Could not find weather data for 'Nowhereville'.".into(),
                ephemeral: true,
            });
            assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0, "fetch ran for {cmd}");
        }
    }

    #[tokio::test]
    async fn unavailable_forecast_uses_same_notice_with_verbatim_location() {
        let fetcher = Arc::new(CountingFetcher { fail: true, ..Default::default() });
        let bot = bot(Some(SPRINGFIELD), fetcher.clone());
        let inv = Invocation::parse("/overview springfield, il").unwrap();

        let reply = bot.handle(&inv).await;

        assert_eq!(reply, Reply::Notice {
            content: "Could not find weather data for 'springfield, il'.".into(),
            ephemeral: true,
        });
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_invocation_renders_selected_view() {
        let bot = bot(Some(SPRINGFIELD), Arc::new(CountingFetcher::default()));
        let inv = Invocation::parse("/wind springfield, il").unwrap();

        match bot.handle(&inv).await {
            Reply::Embed(embed) => {
                assert_eq!(embed.title, "💨 Wind Conditions for Springfield, IL");
                assert_eq!(embed.field_value("Direction"), Some("90°, E"));
            }
            other => panic!("expected embed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dispatch_sends_reply_to_sink() {
        let bot = bot(None, Arc::new(CountingFetcher::default()));
        let sink = RecordingSink::default();
        let inv = Invocation::parse("/rain Nowhereville").unwrap();

        bot.dispatch(&inv, &sink).await.unwrap();

        let sent = sink.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].is_ephemeral());
    }
}
