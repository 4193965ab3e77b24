//! ChartResolver — geocoding plus chart generation with graceful fallback.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{ChartProviderError, GeocodeError};
use crate::model::{Chart, PlanetPosition, UserProfile};

use super::fallback;
use super::geocode::{GeoLocation, GeocodeProvider, estimate_timezone};
use super::provider::{ChartProvider, ChartRequest};
use super::zodiac::sun_sign_for_date;

/// Resolves places to coordinates and birth data to charts.
///
/// The chart provider is optional; without one (or on any provider-path
/// error) charts come from the deterministic local fallback, so onboarding
/// never blocks on a remote dependency.
pub struct ChartResolver {
    geocoder: Arc<dyn GeocodeProvider>,
    provider: Option<Arc<dyn ChartProvider>>,
}

impl ChartResolver {
    pub fn new(geocoder: Arc<dyn GeocodeProvider>, provider: Option<Arc<dyn ChartProvider>>) -> Self {
        Self { geocoder, provider }
    }

    /// Resolve a place string to coordinates + timezone.
    ///
    /// Both "no candidates" and a failed provider call surface as
    /// `LocationNotFound`; the engine turns that into a retry prompt.
    pub async fn geocode(&self, place: &str) -> Result<GeoLocation, GeocodeError> {
        let candidates = match self.geocoder.search(place).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(place = %place, error = %e, "Geocoding call failed");
                return Err(GeocodeError::LocationNotFound {
                    place: place.to_string(),
                });
            }
        };
        let Some(candidate) = candidates.into_iter().next() else {
            return Err(GeocodeError::LocationNotFound {
                place: place.to_string(),
            });
        };

        let timezone = match candidate.timezone {
            Some(tz) => tz,
            None => match self
                .geocoder
                .timezone(candidate.latitude, candidate.longitude)
                .await
            {
                Ok(tz) => tz,
                Err(e) => {
                    tracing::warn!(error = %e, "Timezone lookup failed, estimating from longitude");
                    estimate_timezone(candidate.longitude)
                }
            },
        };

        Ok(GeoLocation {
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            timezone,
            formatted_address: candidate.display_name,
        })
    }

    /// Generate a chart for a user with complete birth data. Never fails:
    /// any provider-path error degrades to the local fallback.
    pub async fn generate_chart(&self, user: &UserProfile) -> Chart {
        let birth_date = user.birth_date.unwrap_or_default();
        let birth_time = user.birth_time.as_deref().unwrap_or("12:00");

        match self.try_provider(user, birth_date, birth_time).await {
            Ok(chart) => chart,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Chart provider unavailable, using fallback");
                fallback::fallback_chart(user.id, birth_date, birth_time)
            }
        }
    }

    async fn try_provider(
        &self,
        user: &UserProfile,
        birth_date: NaiveDate,
        birth_time: &str,
    ) -> Result<Chart, ChartProviderError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(ChartProviderError::NotConfigured)?;

        let (latitude, longitude) = match (user.birth_latitude, user.birth_longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(ChartProviderError::RequestFailed {
                    reason: "missing birth coordinates".to_string(),
                });
            }
        };

        let (hour, minute) = fallback::time_components(birth_time);
        let datetime = birth_date
            .and_hms_opt(hour, minute, 0)
            .ok_or_else(|| ChartProviderError::RequestFailed {
                reason: "invalid birth time".to_string(),
            })?;

        let parsed = provider
            .compute_chart(&ChartRequest {
                datetime,
                latitude,
                longitude,
            })
            .await?;

        Ok(Self::assemble(user.id, birth_date, birth_time, parsed))
    }

    /// Extract the headline placements from provider planets/houses, using
    /// the deterministic approximations where the provider is silent.
    fn assemble(
        user_id: Uuid,
        birth_date: NaiveDate,
        birth_time: &str,
        parsed: super::provider::ProviderChart,
    ) -> Chart {
        let (hour, minute) = fallback::time_components(birth_time);
        let table_sun = sun_sign_for_date(birth_date);

        let find_sign = |name: &str| {
            parsed
                .planets
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(name))
                .map(|p| p.sign.clone())
        };

        let sun_sign = find_sign("Sun").unwrap_or_else(|| table_sun.to_string());
        let moon_sign = find_sign("Moon")
            .unwrap_or_else(|| fallback::moon_sign(birth_date, hour, minute).to_string());
        let ascendant = find_sign("Ascendant")
            .or_else(|| {
                parsed
                    .houses
                    .iter()
                    .find(|h| h.house == 1)
                    .map(|h| h.sign.clone())
            })
            .unwrap_or_else(|| fallback::ascendant_sign(table_sun, hour, minute).to_string());

        Chart {
            id: Uuid::new_v4(),
            user_id,
            sun_sign,
            moon_sign,
            ascendant,
            planets: parsed.planets,
            houses: parsed.houses,
            aspects: parsed.aspects,
            raw_payload: parsed.raw,
            interpretation: None,
            created_at: Utc::now(),
        }
    }

    /// Approximate current planet positions, for daily horoscopes.
    pub fn current_transits(&self) -> Vec<PlanetPosition> {
        fallback::transit_positions(Utc::now())
    }
}
