//! Templated fallback texts, used whenever the LLM provider is absent or
//! errors. All of them are total: a missing chart degrades to neutral
//! wording, never a panic or an error.

use crate::model::Chart;

/// Fixed multi-paragraph reading substituting the three placements.
pub fn fallback_interpretation(chart: &Chart) -> String {
    format!(
        "Your Sun is in {sun}, which shapes the core of who you are: your vitality, \
         your sense of purpose, and the way you shine when you feel at home in yourself.\n\n\
         Your Moon is in {moon}. This is your inner world — how you feel, what you need \
         to feel safe, and the instincts you fall back on when no one is watching.\n\n\
         Your Ascendant is {asc}, the face you show the world. It colors first \
         impressions and the style with which you meet new people and new situations.\n\n\
         Together, a {sun} Sun, {moon} Moon and {asc} rising make a distinctive \
         combination. Ask me anything about how these energies play together!",
        sun = chart.sun_sign,
        moon = chart.moon_sign,
        asc = chart.ascendant,
    )
}

/// Keyword-matched canned advice: love, career, or general.
pub fn fallback_advice(question: &str, chart: Option<&Chart>) -> String {
    let sun = chart.map(|c| c.sun_sign.as_str()).unwrap_or("your sign");
    let moon = chart.map(|c| c.moon_sign.as_str()).unwrap_or("Unknown");
    let lower = question.to_lowercase();

    if lower.contains("love") || lower.contains("relationship") {
        format!(
            "In matters of the heart, your {sun} Sun asks you to stay true to what \
             genuinely warms you rather than what merely flatters you. With your Moon \
             in {moon}, pay attention to what makes you feel emotionally safe — the \
             right connection will feel steady, not dramatic. Openness now invites the \
             kind of love that lasts."
        )
    } else if lower.contains("career") || lower.contains("work") || lower.contains("job") {
        format!(
            "Professionally, your {sun} Sun gives you a distinct way of leading and \
             creating. The current period rewards patience: build skills and let \
             results speak. Your Moon in {moon} hints at what kind of work environment \
             will actually sustain you — honor that when weighing opportunities."
        )
    } else {
        format!(
            "The stars suggest this is a time for reflection and steady steps. As a \
             {sun}, you do best when you act from your own center rather than from \
             outside pressure. Trust your intuition, take one concrete step today, and \
             let the bigger picture unfold at its own pace."
        )
    }
}

const ENERGIES: [&str; 4] = ["bright and forward-moving", "calm and grounding", "introspective", "charged with possibility"];
const FOCUS_AREAS: [&str; 6] = [
    "an honest conversation",
    "a small act of self-care",
    "finishing something you started",
    "reaching out to someone you miss",
    "your physical energy",
    "a creative impulse",
];
const POWER_WORDS: [&str; 6] = ["Clarity", "Patience", "Courage", "Balance", "Trust", "Renewal"];

/// Fixed-structure daily horoscope: overall energy, three focus areas, one
/// power word. Deterministic given the chart and day.
pub fn fallback_horoscope(chart: &Chart, day_of_year: usize) -> String {
    let seed = chart.sun_sign.len() + day_of_year;
    let energy = ENERGIES[seed % ENERGIES.len()];
    let focus: Vec<&str> = (0..3)
        .map(|i| FOCUS_AREAS[(seed + i * 2) % FOCUS_AREAS.len()])
        .collect();
    let word = POWER_WORDS[seed % POWER_WORDS.len()];

    format!(
        "Today's energy for {sun}: {energy}.\n\n\
         Focus areas:\n• {f0}\n• {f1}\n• {f2}\n\n\
         Power word of the day: {word}",
        sun = chart.sun_sign,
        f0 = focus[0],
        f1 = focus[1],
        f2 = focus[2],
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::chart::fallback::fallback_chart;

    use super::*;

    fn chart() -> Chart {
        fallback_chart(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            "09:30",
        )
    }

    #[test]
    fn interpretation_mentions_all_three_placements() {
        let chart = chart();
        let text = fallback_interpretation(&chart);
        assert!(text.contains(&chart.sun_sign));
        assert!(text.contains(&chart.moon_sign));
        assert!(text.contains(&chart.ascendant));
    }

    #[test]
    fn advice_selects_love_template() {
        let chart = chart();
        let text = fallback_advice("Tell me about my love life", Some(&chart));
        assert!(text.contains("heart"));
        assert!(text.contains("Gemini"));
    }

    #[test]
    fn advice_selects_career_template() {
        let text = fallback_advice("Should I change my job?", Some(&chart()));
        assert!(text.contains("Professionally"));
    }

    #[test]
    fn advice_general_without_keywords() {
        let text = fallback_advice("What about my health?", Some(&chart()));
        assert!(text.contains("reflection"));
    }

    #[test]
    fn advice_is_safe_without_chart() {
        let text = fallback_advice("relationship trouble", None);
        assert!(text.contains("your sign"));
        assert!(text.contains("Unknown"));
    }

    #[test]
    fn horoscope_is_deterministic_per_day() {
        let chart = chart();
        let a = fallback_horoscope(&chart, 170);
        let b = fallback_horoscope(&chart, 170);
        assert_eq!(a, b);
        assert!(a.contains("Power word"));
        assert!(a.contains("Gemini"));
        assert_eq!(a.matches('•').count(), 3);
    }
}
