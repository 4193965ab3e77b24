//! Prompt builders for the three advice operations.

use crate::llm::ChatMessage;
use crate::model::{Chart, ConversationTurn, PlanetPosition, Role, UserProfile};

/// How many history turns go into the advice context.
pub const HISTORY_TURNS: usize = 8;
/// How many planets are described in the system prompt.
pub const PROMPT_PLANETS: usize = 7;

fn placements_line(chart: &Chart) -> String {
    format!(
        "Sun in {}, Moon in {}, Ascendant {}",
        chart.sun_sign, chart.moon_sign, chart.ascendant
    )
}

fn planets_section(planets: &[PlanetPosition]) -> String {
    planets
        .iter()
        .take(PROMPT_PLANETS)
        .map(|p| {
            let retro = if p.retrograde { " (retrograde)" } else { "" };
            format!(
                "- {} in {} at {:.1}°, house {}{}",
                p.name, p.sign, p.degree, p.house, retro
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages for a full chart interpretation.
pub fn interpretation_messages(chart: &Chart) -> Vec<ChatMessage> {
    let system = "You are a warm, insightful astrologer. Write a multi-paragraph reading \
         of the user's birth chart. Be specific to the placements, encouraging in tone, \
         and avoid generic filler. No disclaimers.";

    let mut user = format!(
        "Birth chart placements: {}.\n",
        placements_line(chart)
    );
    if !chart.planets.is_empty() {
        user.push_str("Planets:\n");
        user.push_str(&planets_section(&chart.planets));
    }
    user.push_str("\n\nWrite the interpretation.");

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Messages for contextual Q&A.
///
/// `history` arrives newest-first (repository order) and is reversed here so
/// the model sees it chronologically; the new question goes last.
pub fn advice_messages(
    user: &UserProfile,
    chart: Option<&Chart>,
    question: &str,
    history: &[ConversationTurn],
) -> Vec<ChatMessage> {
    let name = user.name.as_deref().unwrap_or("the user");
    let mut system = format!(
        "You are a personal astrologer advising {name}. Answer their question with \
         warmth and practical guidance, grounded in their chart.\n"
    );
    match chart {
        Some(chart) => {
            system.push_str(&format!("Their placements: {}.\n", placements_line(chart)));
            if !chart.planets.is_empty() {
                system.push_str("Planets:\n");
                system.push_str(&planets_section(&chart.planets));
                system.push('\n');
            }
        }
        None => system.push_str("Their chart is not available; keep guidance general.\n"),
    }

    let mut messages = vec![ChatMessage::system(system)];

    let mut recent: Vec<&ConversationTurn> = history.iter().take(HISTORY_TURNS).collect();
    recent.reverse();
    for turn in recent {
        match turn.role {
            Role::User => messages.push(ChatMessage::user(&turn.content)),
            Role::Assistant => messages.push(ChatMessage::assistant(&turn.content)),
            Role::System => {}
        }
    }

    messages.push(ChatMessage::user(question));
    messages
}

/// Messages for a daily horoscope combining natal placements and transits.
pub fn horoscope_messages(
    user: &UserProfile,
    chart: &Chart,
    transits: &[PlanetPosition],
) -> Vec<ChatMessage> {
    let name = user.name.as_deref().unwrap_or("the user");
    let system = "You are an astrologer writing a short daily horoscope. Structure it as: \
         overall energy of the day, three concrete focus areas, and one power word. \
         Keep it under 150 words.";

    let request = format!(
        "Daily horoscope for {name}.\nNatal placements: {}.\nCurrent transits:\n{}",
        placements_line(chart),
        planets_section(transits),
    );

    vec![ChatMessage::system(system), ChatMessage::user(request)]
}
