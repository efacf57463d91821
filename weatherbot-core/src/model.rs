use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Country code appended to region-qualified geocoding lookups.
pub const COUNTRY_CODE: &str = "US";

/// City (and optional region) a user asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub city: String,
    pub region: Option<String>,
}

impl LocationQuery {
    pub fn new(city: impl Into<String>, region: Option<String>) -> Result<Self, QueryError> {
        let city = city.into().trim().to_string();
        if city.is_empty() {
            return Err(QueryError::EmptyCity);
        }

        let region = region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(Self { city, region })
    }

    /// Text sent to the geocoder, e.g. `Springfield,IL,US`.
    pub fn geocoding_query(&self) -> String {
        match &self.region {
            Some(region) => format!("{},{},{}", self.city, region, COUNTRY_CODE),
            None => self.city.clone(),
        }
    }

    /// Name shown in reply titles: `Springfield, IL`.
    pub fn display_name(&self) -> String {
        let mut name = title_case(&self.city);
        if let Some(region) = &self.region {
            name.push_str(", ");
            name.push_str(&region.to_uppercase());
        }
        name
    }

    /// The location exactly as the user typed it.
    pub fn verbatim(&self) -> String {
        match &self.region {
            Some(region) => format!("{}, {}", self.city, region),
            None => self.city.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions plus the short-term hourly series for one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    pub current: CurrentConditions,
    /// Chronological, starting at the current hour.
    pub hourly: Vec<HourlySlot>,
    pub utc_offset_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_f: f64,
    pub feels_like_f: f64,
    pub humidity_pct: u8,
    pub weather_description: String,
    pub weather_icon_id: String,
    pub wind_speed_mph: f64,
    pub wind_direction_deg: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySlot {
    pub timestamp_utc: DateTime<Utc>,
    /// 0.0 ..= 1.0
    pub precipitation_probability: f64,
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}
