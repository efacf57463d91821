use crate::{
    Config, WeatherError,
    model::{ForecastPayload, GeoCoordinate, LocationQuery},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Turns a free-text place into coordinates. First match wins.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve(&self, query: &LocationQuery) -> Result<GeoCoordinate, WeatherError>;
}

/// Retrieves current conditions and the hourly series for a coordinate.
#[async_trait]
pub trait ForecastFetcher: Send + Sync + Debug {
    async fn fetch(&self, coord: GeoCoordinate) -> Result<ForecastPayload, WeatherError>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let creds = config.credentials()?;
    Ok(OpenWeatherProvider::new(creds.weather_api_key, config.endpoints.clone()))
}
