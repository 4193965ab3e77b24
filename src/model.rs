//! Core data model: conversation state, user profile, chart, message log.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The states of the onboarding conversation.
///
/// Progresses linearly: New → AwaitingName → AwaitingBirthDate →
/// AwaitingBirthTime → AwaitingBirthPlace → ChartReady → Chatting.
/// Chatting is absorbing; an explicit reset command returns to New from
/// any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    New,
    AwaitingName,
    AwaitingBirthDate,
    AwaitingBirthTime,
    AwaitingBirthPlace,
    ChartReady,
    Chatting,
}

impl ConversationState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ConversationState) -> bool {
        use ConversationState::*;
        // Reset is allowed from everywhere.
        if target == New {
            return true;
        }
        matches!(
            (self, target),
            (New, AwaitingName)
                | (AwaitingName, AwaitingBirthDate)
                | (AwaitingBirthDate, AwaitingBirthTime)
                | (AwaitingBirthTime, AwaitingBirthPlace)
                | (AwaitingBirthPlace, ChartReady)
                | (ChartReady, Chatting)
                | (Chatting, Chatting)
        )
    }

    /// Get the next state in the linear onboarding progression, if any.
    pub fn next(&self) -> Option<ConversationState> {
        use ConversationState::*;
        match self {
            New => Some(AwaitingName),
            AwaitingName => Some(AwaitingBirthDate),
            AwaitingBirthDate => Some(AwaitingBirthTime),
            AwaitingBirthTime => Some(AwaitingBirthPlace),
            AwaitingBirthPlace => Some(ChartReady),
            ChartReady => Some(Chatting),
            Chatting => None,
        }
    }

    /// Whether the user has finished onboarding (chart exists or is imminent).
    pub fn is_onboarded(&self) -> bool {
        matches!(self, Self::ChartReady | Self::Chatting)
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::New
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::AwaitingName => "awaiting_name",
            Self::AwaitingBirthDate => "awaiting_birth_date",
            Self::AwaitingBirthTime => "awaiting_birth_time",
            Self::AwaitingBirthPlace => "awaiting_birth_place",
            Self::ChartReady => "chart_ready",
            Self::Chatting => "chatting",
        };
        write!(f, "{s}")
    }
}

/// A user of the bot, keyed by channel address.
///
/// Created on first contact; birth fields are filled in incrementally as
/// each onboarding step completes. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    /// Channel-native address (unique per user).
    pub address: String,
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// "HH:MM", 24-hour. "12:00" when the user doesn't know.
    pub birth_time: Option<String>,
    pub birth_place: Option<String>,
    /// `Some(0.0)` is a valid coordinate (equator / prime meridian), so
    /// presence is `is_some()`, never a value check.
    pub birth_latitude: Option<f64>,
    pub birth_longitude: Option<f64>,
    pub timezone: Option<String>,
    pub state: ConversationState,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            address: address.into(),
            name: None,
            birth_date: None,
            birth_time: None,
            birth_place: None,
            birth_latitude: None,
            birth_longitude: None,
            timezone: None,
            state: ConversationState::New,
            created_at: Utc::now(),
        }
    }

    /// Complete birth data iff the user is eligible to enter ChartReady.
    pub fn has_complete_birth_data(&self) -> bool {
        self.birth_date.is_some()
            && self.birth_time.is_some()
            && self.birth_place.is_some()
            && self.birth_latitude.is_some()
            && self.birth_longitude.is_some()
    }

    /// Clear birth data and chart linkage on reset.
    pub fn reset(&mut self) {
        self.name = None;
        self.birth_date = None;
        self.birth_time = None;
        self.birth_place = None;
        self.birth_latitude = None;
        self.birth_longitude = None;
        self.timezone = None;
        self.state = ConversationState::New;
    }
}

/// A planet's position within a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub name: String,
    pub sign: String,
    pub degree: f64,
    pub house: u8,
    pub retrograde: bool,
}

/// A house cusp (house number 1–12).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    pub house: u8,
    pub sign: String,
    pub degree: f64,
}

/// An aspect between two planets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub first: String,
    pub second: String,
    pub kind: String,
    pub orb: f64,
}

/// The derived astrological chart. Immutable once computed; regenerated
/// only via an explicit reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sun_sign: String,
    pub moon_sign: String,
    pub ascendant: String,
    pub planets: Vec<PlanetPosition>,
    pub houses: Vec<HouseCusp>,
    pub aspects: Vec<Aspect>,
    /// Raw provider payload kept for audit. Null for fallback charts.
    pub raw_payload: serde_json::Value,
    /// Cached interpretation text, filled after the first interpretation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Role of a persisted conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

/// One persisted message-log entry. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
