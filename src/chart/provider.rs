//! Remote chart provider client: OAuth2 client-credentials auth with a
//! process-wide token cache, and the chart-by-datetime endpoint.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ChartProviderError;
use crate::model::{Aspect, HouseCusp, PlanetPosition};

/// Injected time source so token-expiry behavior is testable without real
/// time passing.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Margin subtracted from the provider TTL so a borderline-expired token is
/// never sent.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// A chart computation request: naive local birth instant + coordinates.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub datetime: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
}

/// Parsed provider output. Sun/moon/ascendant extraction happens in the
/// resolver, from these lists.
#[derive(Debug, Clone)]
pub struct ProviderChart {
    pub planets: Vec<PlanetPosition>,
    pub houses: Vec<HouseCusp>,
    pub aspects: Vec<Aspect>,
    /// Raw payload, kept on the chart for audit.
    pub raw: serde_json::Value,
}

/// Remote chart computation.
#[async_trait]
pub trait ChartProvider: Send + Sync {
    async fn compute_chart(&self, request: &ChartRequest)
    -> Result<ProviderChart, ChartProviderError>;
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct WirePlanet {
    name: String,
    sign: String,
    #[serde(default)]
    degree: f64,
    #[serde(default)]
    house: u8,
    #[serde(default)]
    retrograde: bool,
}

#[derive(Debug, Deserialize)]
struct WireHouse {
    house: u8,
    sign: String,
    #[serde(default)]
    degree: f64,
}

#[derive(Debug, Deserialize)]
struct WireAspect {
    first: String,
    second: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    orb: f64,
}

#[derive(Debug, Deserialize)]
struct WireChart {
    #[serde(default)]
    planets: Vec<WirePlanet>,
    #[serde(default)]
    houses: Vec<WireHouse>,
    #[serde(default)]
    aspects: Vec<WireAspect>,
}

/// HTTP chart provider with bearer-token auth.
///
/// The token cache is the only process-wide mutable state in the crate. It
/// is guarded by a timestamp check, not a lock across the refresh: two
/// concurrent refreshes are tolerated (last write wins), never prevented.
pub struct HttpChartProvider {
    http: reqwest::Client,
    token_url: String,
    chart_url: String,
    client_id: String,
    client_secret: SecretString,
    clock: Box<dyn Clock>,
    cache: Mutex<Option<CachedToken>>,
}

impl HttpChartProvider {
    pub fn new(
        http: reqwest::Client,
        token_url: String,
        chart_url: String,
        client_id: String,
        client_secret: SecretString,
    ) -> Self {
        Self::with_clock(
            http,
            token_url,
            chart_url,
            client_id,
            client_secret,
            Box::new(SystemClock),
        )
    }

    pub fn with_clock(
        http: reqwest::Client,
        token_url: String,
        chart_url: String,
        client_id: String,
        client_secret: SecretString,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            http,
            token_url,
            chart_url,
            client_id,
            client_secret,
            clock,
            cache: Mutex::new(None),
        }
    }

    fn cached_token(&self) -> Option<String> {
        let now = self.clock.now();
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .as_ref()
            .filter(|t| now < t.expires_at)
            .map(|t| t.access_token.clone())
    }

    fn store_token(&self, token: CachedToken) {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = Some(token);
    }

    /// Client-credentials exchange, reusing the cached token while valid.
    async fn bearer_token(&self) -> Result<String, ChartProviderError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let issued_at = self.clock.now();
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| ChartProviderError::AuthFailed {
                reason: e.to_string(),
            })?
            .error_for_status()
            .map_err(|e| ChartProviderError::AuthFailed {
                reason: e.to_string(),
            })?;

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| ChartProviderError::AuthFailed {
                    reason: format!("bad token response: {e}"),
                })?;

        let expires_at =
            issued_at + Duration::seconds(token.expires_in - TOKEN_EXPIRY_MARGIN_SECS);
        self.store_token(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });
        tracing::debug!(expires_at = %expires_at, "Chart provider token refreshed");
        Ok(token.access_token)
    }

    fn parse_chart(raw: serde_json::Value) -> Result<ProviderChart, ChartProviderError> {
        let wire: WireChart = serde_json::from_value(raw.clone()).map_err(|e| {
            ChartProviderError::InvalidResponse {
                reason: e.to_string(),
            }
        })?;
        if wire.planets.is_empty() {
            return Err(ChartProviderError::InvalidResponse {
                reason: "no planets in response".to_string(),
            });
        }
        Ok(ProviderChart {
            planets: wire
                .planets
                .into_iter()
                .map(|p| PlanetPosition {
                    name: p.name,
                    sign: p.sign,
                    degree: p.degree,
                    house: p.house,
                    retrograde: p.retrograde,
                })
                .collect(),
            houses: wire
                .houses
                .into_iter()
                .map(|h| HouseCusp {
                    house: h.house,
                    sign: h.sign,
                    degree: h.degree,
                })
                .collect(),
            aspects: wire
                .aspects
                .into_iter()
                .map(|a| Aspect {
                    first: a.first,
                    second: a.second,
                    kind: a.kind,
                    orb: a.orb,
                })
                .collect(),
            raw,
        })
    }
}

#[async_trait]
impl ChartProvider for HttpChartProvider {
    async fn compute_chart(
        &self,
        request: &ChartRequest,
    ) -> Result<ProviderChart, ChartProviderError> {
        let token = self.bearer_token().await?;

        let response = self
            .http
            .post(&self.chart_url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "datetime": request.datetime.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "latitude": request.latitude,
                "longitude": request.longitude,
            }))
            .send()
            .await
            .map_err(|e| ChartProviderError::RequestFailed {
                reason: e.to_string(),
            })?
            .error_for_status()
            .map_err(|e| ChartProviderError::RequestFailed {
                reason: e.to_string(),
            })?;

        let raw: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| ChartProviderError::InvalidResponse {
                    reason: e.to_string(),
                })?;
        Self::parse_chart(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        fn at(when: DateTime<Utc>) -> Self {
            Self(Mutex::new(when))
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn provider_with_clock(clock: Box<dyn Clock>) -> HttpChartProvider {
        HttpChartProvider::with_clock(
            reqwest::Client::new(),
            "http://localhost/token".to_string(),
            "http://localhost/chart".to_string(),
            "client".to_string(),
            SecretString::from("secret"),
            clock,
        )
    }

    #[test]
    fn cached_token_respects_expiry_boundary() {
        let start = Utc::now();
        let provider = provider_with_clock(Box::new(FixedClock::at(start)));

        provider.store_token(CachedToken {
            access_token: "tok".to_string(),
            expires_at: start + Duration::seconds(10),
        });
        assert_eq!(provider.cached_token().as_deref(), Some("tok"));

        // Exactly at expiry the token is no longer reused.
        let provider = provider_with_clock(Box::new(FixedClock::at(start + Duration::seconds(10))));
        provider.store_token(CachedToken {
            access_token: "tok".to_string(),
            expires_at: start + Duration::seconds(10),
        });
        assert_eq!(provider.cached_token(), None);
    }

    #[test]
    fn parse_chart_maps_wire_fields() {
        let raw = serde_json::json!({
            "planets": [
                {"name": "Sun", "sign": "Gemini", "degree": 24.1, "house": 10, "retrograde": false},
                {"name": "Mercury", "sign": "Cancer", "degree": 2.0, "house": 11, "retrograde": true}
            ],
            "houses": [{"house": 1, "sign": "Virgo", "degree": 14.2}],
            "aspects": [{"first": "Sun", "second": "Moon", "type": "trine", "orb": 1.4}]
        });
        let chart = HttpChartProvider::parse_chart(raw).unwrap();
        assert_eq!(chart.planets.len(), 2);
        assert!(chart.planets[1].retrograde);
        assert_eq!(chart.houses[0].sign, "Virgo");
        assert_eq!(chart.aspects[0].kind, "trine");
        assert!(chart.raw.get("planets").is_some());
    }

    #[test]
    fn parse_chart_rejects_empty_planets() {
        let err = HttpChartProvider::parse_chart(serde_json::json!({})).unwrap_err();
        assert!(matches!(err, ChartProviderError::InvalidResponse { .. }));
    }
}
