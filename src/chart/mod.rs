//! Chart resolution: geocoding, the remote chart provider, and the
//! deterministic local fallback.

pub mod fallback;
pub mod geocode;
pub mod provider;
pub mod resolver;
pub mod zodiac;

pub use geocode::{GeoCandidate, GeoLocation, GeocodeProvider, HttpGeocoder};
pub use provider::{ChartProvider, ChartRequest, Clock, HttpChartProvider, SystemClock};
pub use resolver::ChartResolver;
pub use zodiac::{ZodiacSign, sun_sign_for_date};
