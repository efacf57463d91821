//! Typed errors for the lookup pipeline.
//!
//! Upstream failures are deliberately coarse: the geocoder reports
//! [`WeatherError::NotFound`] whether the place does not exist or the call
//! failed, and the forecast service reports [`WeatherError::Unavailable`].

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("location not found")]
    NotFound,

    #[error("forecast unavailable")]
    Unavailable,
}

impl WeatherError {
    /// Text for the invoker. Both outcomes read the same.
    pub fn user_message(&self, location: &str) -> String {
        format!("Could not find weather data for '{location}'.")
    }
}

/// Problems with what the user typed, caught before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("city must not be empty")]
    EmptyCity,

    #[error("missing `city` argument.\nUsage: /{command} <city>[, <region>] or /{command} city:<city> region:<region>")]
    MissingCity { command: &'static str },

    #[error("Unknown command '{0}'. Supported commands: overview, rain, wind.")]
    UnknownCommand(String),
}
