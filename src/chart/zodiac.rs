//! Zodiac signs and the fixed sun-sign-by-date table.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The twelve zodiac signs, in ecliptic order starting at Aries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

pub const ALL_SIGNS: [ZodiacSign; 12] = [
    ZodiacSign::Aries,
    ZodiacSign::Taurus,
    ZodiacSign::Gemini,
    ZodiacSign::Cancer,
    ZodiacSign::Leo,
    ZodiacSign::Virgo,
    ZodiacSign::Libra,
    ZodiacSign::Scorpio,
    ZodiacSign::Sagittarius,
    ZodiacSign::Capricorn,
    ZodiacSign::Aquarius,
    ZodiacSign::Pisces,
];

/// (sign, start month, start day, end month, end day), spanning the
/// calendar year. Capricorn wraps the year boundary and appears twice.
const SUN_SIGN_TABLE: [(ZodiacSign, u32, u32, u32, u32); 13] = [
    (ZodiacSign::Capricorn, 1, 1, 1, 19),
    (ZodiacSign::Aquarius, 1, 20, 2, 18),
    (ZodiacSign::Pisces, 2, 19, 3, 20),
    (ZodiacSign::Aries, 3, 21, 4, 19),
    (ZodiacSign::Taurus, 4, 20, 5, 20),
    (ZodiacSign::Gemini, 5, 21, 6, 20),
    (ZodiacSign::Cancer, 6, 21, 7, 22),
    (ZodiacSign::Leo, 7, 23, 8, 22),
    (ZodiacSign::Virgo, 8, 23, 9, 22),
    (ZodiacSign::Libra, 9, 23, 10, 22),
    (ZodiacSign::Scorpio, 10, 23, 11, 21),
    (ZodiacSign::Sagittarius, 11, 22, 12, 21),
    (ZodiacSign::Capricorn, 12, 22, 12, 31),
];

impl ZodiacSign {
    /// Zero-based index in ecliptic order (Aries = 0).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Sign at a (possibly unnormalized) ecliptic index.
    pub fn from_index(index: i64) -> ZodiacSign {
        ALL_SIGNS[index.rem_euclid(12) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }
}

impl std::fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sun sign for a birth date, from the fixed range table.
pub fn sun_sign_for_date(date: NaiveDate) -> ZodiacSign {
    let (month, day) = (date.month(), date.day());
    for (sign, sm, sd, em, ed) in SUN_SIGN_TABLE {
        let after_start = month > sm || (month == sm && day >= sd);
        let before_end = month < em || (month == em && day <= ed);
        if after_start && before_end {
            return sign;
        }
    }
    // The table covers Jan 1–Dec 31 with no gaps.
    unreachable!("sun sign table covers the whole year")
}
