//! Advice generation: chart interpretation, contextual Q&A, daily
//! horoscopes. Remote LLM first, templated fallback on any failure.

pub mod prompts;
pub mod templates;

use std::sync::Arc;

use chrono::{Datelike, Utc};

use crate::chart::ChartResolver;
use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::model::{Chart, ConversationTurn, UserProfile};

const INTERPRETATION_TEMPERATURE: f32 = 0.8;
const ADVICE_TEMPERATURE: f32 = 0.7;
const HOROSCOPE_TEMPERATURE: f32 = 0.9;

/// Produces all user-facing astrological text.
///
/// The LLM provider is optional; every operation degrades to a local
/// template, and provider errors never reach the caller.
pub struct AdviceGenerator {
    llm: Option<Arc<dyn LlmProvider>>,
    resolver: Arc<ChartResolver>,
}

impl AdviceGenerator {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>, resolver: Arc<ChartResolver>) -> Self {
        Self { llm, resolver }
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let llm = self.llm.as_ref().ok_or(LlmError::NotConfigured)?;
        let request = CompletionRequest::new(messages)
            .with_temperature(temperature)
            .with_max_tokens(1024);
        Ok(llm.complete(request).await?.content.trim().to_string())
    }

    /// Multi-paragraph reading of a chart.
    pub async fn interpret_chart(&self, chart: &Chart) -> String {
        match self
            .complete(prompts::interpretation_messages(chart), INTERPRETATION_TEMPERATURE)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(user_id = %chart.user_id, error = %e, "Interpretation call failed, using template");
                templates::fallback_interpretation(chart)
            }
        }
    }

    /// Contextual answer to a free-form question. `history` is newest-first,
    /// as returned by the message repository.
    pub async fn get_advice(
        &self,
        user: &UserProfile,
        chart: Option<&Chart>,
        question: &str,
        history: &[ConversationTurn],
    ) -> String {
        match self
            .complete(
                prompts::advice_messages(user, chart, question, history),
                ADVICE_TEMPERATURE,
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Advice call failed, using template");
                templates::fallback_advice(question, chart)
            }
        }
    }

    /// Daily horoscope from natal placements plus current transits.
    pub async fn daily_horoscope(&self, user: &UserProfile, chart: Option<&Chart>) -> String {
        let Some(chart) = chart else {
            return "I don't have your birth chart yet, so no horoscope for now. \
                    Type \"reset\" to start over and I'll build one."
                .to_string();
        };

        let transits = self.resolver.current_transits();
        match self
            .complete(
                prompts::horoscope_messages(user, chart, &transits),
                HOROSCOPE_TEMPERATURE,
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Horoscope call failed, using template");
                templates::fallback_horoscope(chart, Utc::now().ordinal() as usize)
            }
        }
    }
}
