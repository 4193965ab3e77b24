//! Geocoding provider: place string → coordinates, plus timezone lookup.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GeocodeError;

/// A geocoding candidate returned by the provider.
#[derive(Debug, Clone)]
pub struct GeoCandidate {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
    /// IANA timezone, when the provider knows it.
    pub timezone: Option<String>,
}

/// A fully resolved location, as consumed by the engine.
#[derive(Debug, Clone)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub formatted_address: String,
}

/// Forward search plus reverse timezone lookup.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Search candidates for a free-text place. An empty vec means the
    /// provider found nothing.
    async fn search(&self, place: &str) -> Result<Vec<GeoCandidate>, GeocodeError>;

    /// Reverse lookup: timezone for a coordinate.
    async fn timezone(&self, latitude: f64, longitude: f64) -> Result<String, GeocodeError>;
}

/// HTTP geocoder against an Open-Meteo-style search endpoint.
pub struct HttpGeocoder {
    http: reqwest::Client,
    search_url: String,
    timezone_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    latitude: f64,
    longitude: f64,
    name: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimezoneResponse {
    timezone: String,
}

impl HttpGeocoder {
    pub fn new(http: reqwest::Client, search_url: String, timezone_url: Option<String>) -> Self {
        Self {
            http,
            search_url,
            timezone_url,
        }
    }
}

#[async_trait]
impl GeocodeProvider for HttpGeocoder {
    async fn search(&self, place: &str) -> Result<Vec<GeoCandidate>, GeocodeError> {
        let response = self
            .http
            .get(&self.search_url)
            .query(&[("name", place), ("count", "1"), ("format", "json")])
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| {
                let display_name = match &r.country {
                    Some(country) => format!("{}, {}", r.name, country),
                    None => r.name.clone(),
                };
                GeoCandidate {
                    latitude: r.latitude,
                    longitude: r.longitude,
                    display_name,
                    timezone: r.timezone,
                }
            })
            .collect())
    }

    async fn timezone(&self, latitude: f64, longitude: f64) -> Result<String, GeocodeError> {
        let url = self
            .timezone_url
            .as_ref()
            .ok_or_else(|| GeocodeError::Http("no timezone endpoint configured".to_string()))?;

        let response = self
            .http
            .get(url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        let parsed: TimezoneResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
        Ok(parsed.timezone)
    }
}

/// Longitude-based timezone estimate: ±UTC offset at one hour per 15°.
pub fn estimate_timezone(longitude: f64) -> String {
    let offset = (longitude / 15.0).round() as i32;
    if offset >= 0 {
        format!("UTC+{offset}")
    } else {
        format!("UTC{offset}")
    }
}
