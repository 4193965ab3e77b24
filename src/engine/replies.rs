//! Static reply texts for the onboarding flow and command routing.

use crate::model::Chart;

pub fn welcome() -> String {
    "✨ Welcome to Astro Guide! I build personal birth charts and answer your \
     questions about them.\n\nFirst things first — what's your name?"
        .to_string()
}

pub fn date_prompt(name: &str) -> String {
    format!(
        "Lovely to meet you, {name}! 🌙 When were you born? Please send your \
         birth date as DD.MM.YYYY, for example 15.06.1990."
    )
}

/// Echoes the user's own day/month/year strings back, as parsed.
pub fn time_prompt(day: &str, month: &str, year: &str) -> String {
    format!(
        "Got it — {day}.{month}.{year}. What time were you born? Send HH:MM \
         (24-hour), or \"unknown\" if you're not sure."
    )
}

pub fn place_prompt(time: &str) -> String {
    format!(
        "Noted: {time}. And where were you born? A city and country works best, \
         like \"Berlin, Germany\"."
    )
}

pub fn location_not_found() -> String {
    "Hmm, I couldn't find that location. Could you try again with a bigger \
     nearby city, like \"Berlin, Germany\"?"
        .to_string()
}

pub fn chart_ready(name: &str, address: &str, chart: &Chart, interpretation: &str) -> String {
    format!(
        "Your chart is ready, {name}! 🌟 Born in {address}:\n\n\
         ☀️ Sun in {sun}  🌙 Moon in {moon}  ⬆️ {asc} rising\n\n\
         {interpretation}\n\n\
         Type \"menu\" to see what I can do, or just ask me anything.",
        sun = chart.sun_sign,
        moon = chart.moon_sign,
        asc = chart.ascendant,
    )
}

pub fn menu() -> String {
    "Here's what I can do:\n\
     • \"my chart\" — your birth chart summary\n\
     • \"today\" — your daily horoscope\n\
     • \"reset\" — start over with new birth data\n\
     • or just ask me anything about your chart ✨"
        .to_string()
}

pub fn restart() -> String {
    "Okay, let's start fresh! ✨ What's your name?".to_string()
}

pub fn no_chart() -> String {
    "I don't have a chart for you yet. Type \"reset\" and we'll build one from \
     scratch."
        .to_string()
}

pub fn chart_summary(chart: &Chart) -> String {
    let mut lines = vec![
        "Your birth chart:".to_string(),
        format!("☀️ Sun in {}", chart.sun_sign),
        format!("🌙 Moon in {}", chart.moon_sign),
        format!("⬆️ Ascendant {}", chart.ascendant),
    ];
    if !chart.planets.is_empty() {
        lines.push(String::new());
        for planet in &chart.planets {
            let retro = if planet.retrograde { " ℞" } else { "" };
            lines.push(format!(
                "{} in {} (house {}){}",
                planet.name, planet.sign, planet.house, retro
            ));
        }
    }
    if let Some(ref interpretation) = chart.interpretation {
        lines.push(String::new());
        lines.push(interpretation.clone());
    }
    lines.join("\n")
}
