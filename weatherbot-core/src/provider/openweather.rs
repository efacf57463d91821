use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    WeatherError,
    config::Endpoints,
    model::{CurrentConditions, ForecastPayload, GeoCoordinate, HourlySlot, LocationQuery},
};

use super::{ForecastFetcher, LocationResolver};

/// OpenWeatherMap direct geocoding plus One Call 3.0.
#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    endpoints: Endpoints,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, endpoints: Endpoints) -> Self {
        Self::with_client(Client::new(), api_key, endpoints)
    }

    pub fn with_client(http: Client, api_key: String, endpoints: Endpoints) -> Self {
        Self { api_key, http, endpoints }
    }

    async fn get_body(&self, url: &str, what: &str, params: &[(&str, String)]) -> Result<String> {
        let res = self
            .http
            .get(url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }

    async fn geocode(&self, query: &LocationQuery) -> Result<Option<GeoCoordinate>> {
        let q = query.geocoding_query();
        debug!(query = %q, "geocoding lookup");

        let body = self
            .get_body(
                &self.endpoints.geocoding_url,
                "geocoding",
                &[("q", q), ("limit", "1".to_string())],
            )
            .await?;

        let matches: Vec<OwGeoMatch> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

        Ok(matches.into_iter().next().map(|m| GeoCoordinate {
            latitude: m.lat,
            longitude: m.lon,
        }))
    }

    async fn one_call(&self, coord: GeoCoordinate) -> Result<ForecastPayload> {
        debug!(lat = coord.latitude, lon = coord.longitude, "one call lookup");

        let body = self
            .get_body(
                &self.endpoints.onecall_url,
                "one call",
                &[
                    ("lat", coord.latitude.to_string()),
                    ("lon", coord.longitude.to_string()),
                    ("units", "imperial".to_string()),
                    ("exclude", "minutely,daily,alerts".to_string()),
                ],
            )
            .await?;

        let parsed: OwOneCallResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather one call JSON")?;

        parsed.try_into()
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    wind_speed: f64,
    wind_deg: u16,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwHourly {
    dt: i64,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwOneCallResponse {
    current: OwCurrent,
    hourly: Vec<OwHourly>,
    timezone_offset: i64,
}

impl TryFrom<OwOneCallResponse> for ForecastPayload {
    type Error = anyhow::Error;

    fn try_from(raw: OwOneCallResponse) -> Result<Self> {
        let OwCurrent { temp, feels_like, humidity, wind_speed, wind_deg, weather } = raw.current;

        let condition = weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather one call response had no current weather entry"))?;

        let hourly = raw
            .hourly
            .into_iter()
            .map(|h| {
                let timestamp_utc = unix_to_utc(h.dt)
                    .ok_or_else(|| anyhow!("OpenWeather hourly timestamp out of range: {}", h.dt))?;
                Ok(HourlySlot { timestamp_utc, precipitation_probability: h.pop })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ForecastPayload {
            current: CurrentConditions {
                temperature_f: temp,
                feels_like_f: feels_like,
                humidity_pct: humidity,
                weather_description: condition.description,
                weather_icon_id: condition.icon,
                wind_speed_mph: wind_speed,
                wind_direction_deg: wind_deg,
            },
            hourly,
            utc_offset_seconds: raw.timezone_offset,
        })
    }
}

#[async_trait]
impl LocationResolver for OpenWeatherProvider {
    async fn resolve(&self, query: &LocationQuery) -> Result<GeoCoordinate, WeatherError> {
        match self.geocode(query).await {
            Ok(Some(coord)) => Ok(coord),
            Ok(None) => {
                debug!(query = %query.geocoding_query(), "geocoder returned no matches");
                Err(WeatherError::NotFound)
            }
            Err(err) => {
                warn!("geocoding failed: {err:#}");
                Err(WeatherError::NotFound)
            }
        }
    }
}

#[async_trait]
impl ForecastFetcher for OpenWeatherProvider {
    async fn fetch(&self, coord: GeoCoordinate) -> Result<ForecastPayload, WeatherError> {
        self.one_call(coord).await.map_err(|err| {
            warn!("forecast fetch failed: {err:#}");
            WeatherError::Unavailable
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
