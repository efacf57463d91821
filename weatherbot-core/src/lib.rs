//! Core library for the `weatherbot` slash-command bot.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location resolution and forecast retrieval (OpenWeatherMap)
//! - Reply formatting for the overview, rain and wind commands
//! - The per-invocation command pipeline
//!
//! It is used by the `weatherbot` binary, but any chat host can drive
//! [`WeatherBot`] through [`ReplySink`].

pub mod bot;
pub mod config;
pub mod error;
pub mod model;
pub mod present;
pub mod provider;

pub use bot::{Command, Invocation, Reply, ReplySink, WeatherBot};
pub use config::{Config, Credentials, Endpoints};
pub use error::{QueryError, WeatherError};
pub use model::{CurrentConditions, ForecastPayload, GeoCoordinate, HourlySlot, LocationQuery};
pub use present::{Embed, EmbedField};
pub use provider::{ForecastFetcher, LocationResolver, openweather::OpenWeatherProvider};
