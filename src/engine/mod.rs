//! ConversationEngine — the per-user state machine.
//!
//! One call to [`ConversationEngine::process_message`] handles one inbound
//! turn: load (or create) the user, persist the inbound text, route by
//! conversation state, persist the reply, return it. The caller is
//! responsible for serializing turns per user; the engine holds no lock
//! across a turn.

pub mod replies;

use std::sync::Arc;

use chrono::Utc;

use crate::advice::AdviceGenerator;
use crate::chart::ChartResolver;
use crate::error::{Error, GeocodeError, Result};
use crate::model::{ConversationState, Role, UserProfile};
use crate::parsers;
use crate::store::{ChartRepository, MessageRepository, UserRepository};

/// How many persisted turns feed the Q&A context.
const ADVICE_CONTEXT_TURNS: usize = 10;

pub struct ConversationEngine {
    users: Arc<dyn UserRepository>,
    charts: Arc<dyn ChartRepository>,
    messages: Arc<dyn MessageRepository>,
    resolver: Arc<ChartResolver>,
    advisor: Arc<AdviceGenerator>,
}

impl ConversationEngine {
    pub fn new(
        users: Arc<dyn UserRepository>,
        charts: Arc<dyn ChartRepository>,
        messages: Arc<dyn MessageRepository>,
        resolver: Arc<ChartResolver>,
        advisor: Arc<AdviceGenerator>,
    ) -> Self {
        Self {
            users,
            charts,
            messages,
            resolver,
            advisor,
        }
    }

    /// Handle one inbound message and return the outbound reply.
    ///
    /// Both the inbound text and the reply are persisted unconditionally;
    /// the user-turn write happens before any downstream resolver call.
    /// Repository failures propagate — they are integrity failures, not
    /// conversation content.
    pub async fn process_message(&self, address: &str, text: &str) -> Result<String> {
        let user = match self.users.find_by_address(address).await? {
            Some(user) => user,
            None => self.users.create(address).await?,
        };

        let user_id = user.id;
        self.messages.append(user_id, Role::User, text).await?;

        let reply = self.route(user, text).await?;

        self.messages
            .append(user_id, Role::Assistant, &reply)
            .await?;
        Ok(reply)
    }

    async fn route(&self, mut user: UserProfile, text: &str) -> Result<String> {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();

        // Reset wins over everything, from any state.
        if lower == "reset" || lower == "start over" {
            user.reset();
            self.users.update(&user).await?;
            tracing::info!(user_id = %user.id, "Conversation reset");
            return Ok(replies::restart());
        }

        match user.state {
            ConversationState::New => self.handle_new(user).await,
            ConversationState::AwaitingName => self.handle_name(user, trimmed).await,
            ConversationState::AwaitingBirthDate => self.handle_date(user, trimmed).await,
            ConversationState::AwaitingBirthTime => self.handle_time(user, trimmed).await,
            ConversationState::AwaitingBirthPlace => self.handle_place(user, trimmed).await,
            ConversationState::ChartReady | ConversationState::Chatting => {
                self.handle_chat(user, trimmed, &lower).await
            }
        }
    }

    /// Any first message triggers the welcome and moves to AwaitingName.
    async fn handle_new(&self, mut user: UserProfile) -> Result<String> {
        user.state = ConversationState::AwaitingName;
        self.users.update(&user).await?;
        Ok(replies::welcome())
    }

    async fn handle_name(&self, mut user: UserProfile, text: &str) -> Result<String> {
        match parsers::parse_name(text) {
            Ok(name) => {
                let reply = replies::date_prompt(&name);
                user.name = Some(name);
                user.state = ConversationState::AwaitingBirthDate;
                self.users.update(&user).await?;
                Ok(reply)
            }
            Err(rejection) => Ok(rejection.user_message().to_string()),
        }
    }

    async fn handle_date(&self, mut user: UserProfile, text: &str) -> Result<String> {
        match parsers::parse_birth_date(text, Utc::now().date_naive()) {
            Ok(parsed) => {
                let reply = replies::time_prompt(&parsed.day, &parsed.month, &parsed.year);
                user.birth_date = Some(parsed.date);
                user.state = ConversationState::AwaitingBirthTime;
                self.users.update(&user).await?;
                Ok(reply)
            }
            Err(rejection) => Ok(rejection.user_message().to_string()),
        }
    }

    async fn handle_time(&self, mut user: UserProfile, text: &str) -> Result<String> {
        match parsers::parse_birth_time(text) {
            Ok(time) => {
                let reply = replies::place_prompt(&time);
                user.birth_time = Some(time);
                user.state = ConversationState::AwaitingBirthPlace;
                self.users.update(&user).await?;
                Ok(reply)
            }
            Err(rejection) => Ok(rejection.user_message().to_string()),
        }
    }

    /// The heavy step: geocode, then chart generation (which never fails),
    /// then the first interpretation. Geocode failure keeps the state so
    /// the user can retry the place.
    async fn handle_place(&self, mut user: UserProfile, text: &str) -> Result<String> {
        let place = match parsers::parse_place(text) {
            Ok(place) => place,
            Err(rejection) => return Ok(rejection.user_message().to_string()),
        };

        let location = match self.resolver.geocode(&place).await {
            Ok(location) => location,
            Err(GeocodeError::LocationNotFound { .. }) => {
                return Ok(replies::location_not_found());
            }
            Err(e) => return Err(Error::Geocode(e)),
        };

        user.birth_place = Some(place);
        user.birth_latitude = Some(location.latitude);
        user.birth_longitude = Some(location.longitude);
        user.timezone = Some(location.timezone);
        debug_assert!(user.has_complete_birth_data());

        let mut chart = self.resolver.generate_chart(&user).await;
        let interpretation = self.advisor.interpret_chart(&chart).await;
        chart.interpretation = Some(interpretation.clone());
        self.charts.save(&chart).await?;

        user.state = ConversationState::ChartReady;
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, sun = %chart.sun_sign, "Chart generated");

        let name = user.name.clone().unwrap_or_else(|| "stargazer".to_string());
        Ok(replies::chart_ready(
            &name,
            &location.formatted_address,
            &chart,
            &interpretation,
        ))
    }

    /// Command routing for onboarded users. Priority: menu/help, chart
    /// summary, daily horoscope, then free-form Q&A. The first non-command
    /// message moves ChartReady to Chatting.
    async fn handle_chat(&self, mut user: UserProfile, text: &str, lower: &str) -> Result<String> {
        if lower == "menu" || lower == "help" {
            return Ok(replies::menu());
        }

        if lower.contains("my chart") || lower.contains("summary") {
            return match self.charts.find_by_user(user.id).await? {
                Some(chart) => Ok(replies::chart_summary(&chart)),
                None => Ok(replies::no_chart()),
            };
        }

        let chart = self.charts.find_by_user(user.id).await?;

        if lower.contains("today") || lower.contains("daily") || lower.contains("horoscope") {
            return Ok(self.advisor.daily_horoscope(&user, chart.as_ref()).await);
        }

        let history = self.messages.recent(user.id, ADVICE_CONTEXT_TURNS).await?;
        let reply = self
            .advisor
            .get_advice(&user, chart.as_ref(), text, &history)
            .await;

        if user.state == ConversationState::ChartReady {
            user.state = ConversationState::Chatting;
            self.users.update(&user).await?;
        }
        Ok(reply)
    }
}
