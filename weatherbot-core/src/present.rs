//! Rich-message views over a [`ForecastPayload`].
//!
//! Every view is pure: it takes the already-fetched payload and the
//! user's [`LocationQuery`] and returns an [`Embed`]. Failure handling
//! happens upstream in [`crate::bot`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::model::{ForecastPayload, LocationQuery};

/// Only the first this-many hourly slots feed the rain view.
pub const RAIN_WINDOW_HOURS: usize = 12;

/// Slots must be strictly above this probability to be listed.
pub const RAIN_THRESHOLD: f64 = 0.10;

pub const NO_RAIN_MESSAGE: &str = "No significant chance of rain in the next 12 hours. ☀️";
pub const FOOTER_TEXT: &str = "Data provided by OpenWeatherMap";

pub const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Embed colours, matching the platform's named palette.
pub mod colors {
    pub const BLUE: u32 = 0x3498DB;
    pub const DARK_BLUE: u32 = 0x206694;
    pub const LIGHT_GREY: u32 = 0x979C9F;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Host-agnostic rich message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<EmbedField>,
    pub thumbnail_url: Option<String>,
    pub footer: Option<String>,
    pub color: Option<u32>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField { name: name.into(), value: value.into(), inline });
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Value of the first field called `name`.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }
}

pub fn icon_url(icon_id: &str) -> String {
    format!("http://openweathermap.org/img/wn/{icon_id}@2x.png")
}

/// General conditions summary.
pub fn overview(query: &LocationQuery, payload: &ForecastPayload) -> Embed {
    let current = &payload.current;

    Embed::new(format!("Weather Overview for {}", query.display_name()))
        .description(format!("It's currently **{}**.", current.weather_description))
        .color(colors::BLUE)
        .field("Temperature", format!("{}°F", current.temperature_f), true)
        .field("Feels Like", format!("{}°F", current.feels_like_f), true)
        .field("Humidity", format!("{}%", current.humidity_pct), true)
        .thumbnail(icon_url(&current.weather_icon_id))
        .footer(FOOTER_TEXT)
}

/// Hour-by-hour precipitation outlook.
pub fn rain(query: &LocationQuery, payload: &ForecastPayload) -> Embed {
    let lines = rain_lines(payload);
    let description = if lines.is_empty() { NO_RAIN_MESSAGE.to_string() } else { lines.join("\n") };

    Embed::new(format!("🌧️ Hourly Rain Forecast for {}", query.display_name()))
        .color(colors::DARK_BLUE)
        .description(description)
}

/// One line per qualifying slot, in payload order.
pub fn rain_lines(payload: &ForecastPayload) -> Vec<String> {
    payload
        .hourly
        .iter()
        .take(RAIN_WINDOW_HOURS)
        .filter(|slot| slot.precipitation_probability > RAIN_THRESHOLD)
        .map(|slot| {
            format!(
                "**{}**: {}% chance of rain",
                local_time_label(slot.timestamp_utc, payload.utc_offset_seconds),
                (slot.precipitation_probability * 100.0) as i64,
            )
        })
        .collect()
}

/// Current wind speed and direction.
pub fn wind(query: &LocationQuery, payload: &ForecastPayload) -> Embed {
    let current = &payload.current;

    Embed::new(format!("💨 Wind Conditions for {}", query.display_name()))
        .color(colors::LIGHT_GREY)
        .field("Speed", format!("{} mph", current.wind_speed_mph), true)
        .field(
            "Direction",
            format!("{}°, {}", current.wind_direction_deg, compass_point(current.wind_direction_deg.into())),
            true,
        )
}

/// Eight 45° buckets centred on the cardinal and intercardinal points.
pub fn compass_point(degrees: f64) -> &'static str {
    let index = ((degrees + 22.5) / 45.0).floor().rem_euclid(8.0) as usize;
    COMPASS_POINTS[index]
}

/// 12-hour wall-clock time at `offset_seconds` from UTC, e.g. `1:00 PM`.
pub fn local_time_label(timestamp: DateTime<Utc>, offset_seconds: i64) -> String {
    let local = timestamp + Duration::seconds(offset_seconds);
    let formatted = local.format("%I:%M %p").to_string();
    match formatted.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => formatted,
    }
}
