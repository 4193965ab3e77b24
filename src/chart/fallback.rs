//! Deterministic local chart computation.
//!
//! Used whenever the remote chart provider is unavailable, so onboarding can
//! always complete. None of this is real ephemeris math: the moon cycles
//! uniformly through the zodiac every 28 days, the ascendant advances one
//! sign per two hours, and the remaining planets sit at fixed sign offsets
//! from the sun. Identical inputs always produce identical output.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use uuid::Uuid;

use crate::model::{Chart, HouseCusp, PlanetPosition};

use super::zodiac::{ZodiacSign, sun_sign_for_date};

/// 28 days in milliseconds, the approximate lunar cycle used by the moon
/// heuristic.
const MOON_CYCLE_MS: f64 = 28.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Fixed sign offsets from the sun for the synthetic planet list (the sun
/// and moon are computed separately). Order is rendering order.
const PLANET_OFFSETS: [(&str, i64); 5] = [
    ("Mercury", 1),
    ("Venus", 2),
    ("Mars", 4),
    ("Jupiter", 6),
    ("Saturn", 9),
];

/// Parse "HH:MM" leniently; malformed stored values fall back to noon, the
/// same sentinel `parse_birth_time` uses for "unknown".
pub(crate) fn time_components(birth_time: &str) -> (u32, u32) {
    let mut parts = birth_time.splitn(2, ':');
    let hour = parts.next().and_then(|p| p.parse().ok()).unwrap_or(12);
    let minute = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    if hour > 23 || minute > 59 { (12, 0) } else { (hour, minute) }
}

fn birth_instant(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}

/// Moon sign: zodiac position cycling uniformly through all 12 signs every
/// 28 days from the epoch.
pub fn moon_sign(date: NaiveDate, hour: u32, minute: u32) -> ZodiacSign {
    let millis = birth_instant(date, hour, minute).and_utc().timestamp_millis() as f64;
    let phase = (millis / MOON_CYCLE_MS).rem_euclid(1.0);
    ZodiacSign::from_index((phase * 12.0).floor() as i64)
}

/// Ascendant: one sign per two hours of the birth day, offset from the sun.
pub fn ascendant_sign(sun: ZodiacSign, hour: u32, minute: u32) -> ZodiacSign {
    let offset = (hour as f64 + minute as f64 / 60.0) / 2.0;
    ZodiacSign::from_index(sun.index() as i64 + offset.floor() as i64)
}

/// Synthetic planet list: sun, moon, and five classical planets at fixed
/// offsets. Houses are whole-sign relative to the ascendant so rendering
/// always has sensible values.
pub fn synthetic_planets(
    sun: ZodiacSign,
    moon: ZodiacSign,
    ascendant: ZodiacSign,
    date: NaiveDate,
) -> Vec<PlanetPosition> {
    let asc_idx = ascendant.index() as i64;
    let day_of_year = date.ordinal() as i64;

    let position = |name: &str, sign: ZodiacSign, slot: i64| {
        let sign_idx = sign.index() as i64;
        PlanetPosition {
            name: name.to_string(),
            sign: sign.to_string(),
            degree: ((day_of_year + slot * 7) % 30) as f64,
            house: ((sign_idx - asc_idx).rem_euclid(12) + 1) as u8,
            retrograde: false,
        }
    };

    let mut planets = vec![position("Sun", sun, 0), position("Moon", moon, 1)];
    for (i, (name, delta)) in PLANET_OFFSETS.into_iter().enumerate() {
        let sign = ZodiacSign::from_index(sun.index() as i64 + delta);
        planets.push(position(name, sign, i as i64 + 2));
    }
    planets
}

/// Twelve whole-sign house cusps starting at the ascendant.
pub fn synthetic_houses(ascendant: ZodiacSign) -> Vec<HouseCusp> {
    (0..12)
        .map(|i| HouseCusp {
            house: i + 1,
            sign: ZodiacSign::from_index(ascendant.index() as i64 + i as i64).to_string(),
            degree: 0.0,
        })
        .collect()
}

/// Build a complete fallback chart from the stored birth fields.
pub fn fallback_chart(user_id: Uuid, birth_date: NaiveDate, birth_time: &str) -> Chart {
    let (hour, minute) = time_components(birth_time);
    let sun = sun_sign_for_date(birth_date);
    let moon = moon_sign(birth_date, hour, minute);
    let asc = ascendant_sign(sun, hour, minute);

    Chart {
        id: Uuid::new_v4(),
        user_id,
        sun_sign: sun.to_string(),
        moon_sign: moon.to_string(),
        ascendant: asc.to_string(),
        planets: synthetic_planets(sun, moon, asc, birth_date),
        houses: synthetic_houses(asc),
        aspects: Vec::new(),
        raw_payload: serde_json::Value::Null,
        interpretation: None,
        created_at: Utc::now(),
    }
}

/// Approximate current planet positions, for daily horoscopes. Same math as
/// the natal fallback, evaluated at `now`.
pub fn transit_positions(now: DateTime<Utc>) -> Vec<PlanetPosition> {
    let date = now.date_naive();
    let sun = sun_sign_for_date(date);
    let moon = moon_sign(date, now.hour(), now.minute());
    let asc = ascendant_sign(sun, now.hour(), now.minute());
    synthetic_planets(sun, moon, asc, date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birthday() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()
    }

    #[test]
    fn fallback_is_deterministic() {
        let uid = Uuid::new_v4();
        let a = fallback_chart(uid, birthday(), "09:30");
        let b = fallback_chart(uid, birthday(), "09:30");
        assert_eq!(a.sun_sign, b.sun_sign);
        assert_eq!(a.moon_sign, b.moon_sign);
        assert_eq!(a.ascendant, b.ascendant);
        assert_eq!(a.planets, b.planets);
        assert_eq!(a.houses, b.houses);
    }

    #[test]
    fn fallback_has_seven_planets_and_twelve_houses() {
        let chart = fallback_chart(Uuid::new_v4(), birthday(), "09:30");
        assert_eq!(chart.planets.len(), 7);
        assert_eq!(chart.houses.len(), 12);
        assert_eq!(chart.planets[0].name, "Sun");
        assert_eq!(chart.planets[1].name, "Moon");
        for (i, house) in chart.houses.iter().enumerate() {
            assert_eq!(house.house, i as u8 + 1);
        }
    }

    #[test]
    fn sun_sign_comes_from_table() {
        let chart = fallback_chart(Uuid::new_v4(), birthday(), "12:00");
        assert_eq!(chart.sun_sign, "Gemini");
    }

    #[test]
    fn ascendant_advances_one_sign_per_two_hours() {
        let sun = ZodiacSign::Aries;
        assert_eq!(ascendant_sign(sun, 0, 0), ZodiacSign::Aries);
        assert_eq!(ascendant_sign(sun, 1, 59), ZodiacSign::Aries);
        assert_eq!(ascendant_sign(sun, 2, 0), ZodiacSign::Taurus);
        assert_eq!(ascendant_sign(sun, 23, 59), ZodiacSign::Pisces);
    }

    #[test]
    fn moon_sign_changes_over_the_cycle() {
        // Two dates half a cycle apart should land on different signs.
        let a = moon_sign(NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(), 12, 0);
        let b = moon_sign(NaiveDate::from_ymd_opt(1990, 6, 29).unwrap(), 12, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn moon_sign_defined_before_epoch() {
        // Pre-1970 births produce negative timestamps; index must stay valid.
        let sign = moon_sign(NaiveDate::from_ymd_opt(1901, 3, 2).unwrap(), 4, 15);
        assert!(super::super::zodiac::ALL_SIGNS.contains(&sign));
    }

    #[test]
    fn malformed_stored_time_falls_back_to_noon() {
        assert_eq!(time_components("whatever"), (12, 0));
        assert_eq!(time_components("25:70"), (12, 0));
        assert_eq!(time_components("09:30"), (9, 30));
    }
}
