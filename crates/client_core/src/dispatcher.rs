use std::sync::{Arc, LazyLock};

use regex::Regex;
use shared::domain::AqiReading;
use tracing::{debug, warn};

use crate::{
    knowledge::Topic,
    source::AqiSource,
    store::{LoadStatus, LocationSnapshot},
};

const SAFETY_KEYWORDS: &[&str] = &["safe", "run", "walk", "outside", "play"];
const STATUS_KEYWORDS: &[&str] = &["aqi", "pollution", "quality"];
const GREETING_WORDS: &[&str] = &["hello", "hi", "hey"];
const THANKS_KEYWORDS: &[&str] = &["thank"];

/// Words that never name a place on their own, as in "safe for kids to play"
/// or "pollution at the moment". A captured phrase made only of these (and
/// dispatcher keywords) is not a city.
const NON_PLACE_WORDS: &[&str] = &[
    "me", "you", "us", "them", "him", "her", "it", "my", "your", "our", "kids", "children", "now",
    "today", "tomorrow", "tonight", "the", "a", "an", "this", "that", "moment", "all", "everyone",
    "some", "to", "of", "and", "or", "with", "go", "be", "here", "there", "city", "area",
    "running", "walking", "jogging", "cycling", "playing", "exercise",
];
const TRAILING_TIME_WORDS: &[&str] = &["now", "today", "tomorrow", "tonight"];

static PREPOSITION_PLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:in|at|for)\s+([a-z\s]+?)\s*(?:[?!.,]|$)").expect("valid regex")
});
static TELL_ME_ABOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btell me\s+about\s+([a-z\s]+?)\s*(?:[?!.,]|$)").expect("valid regex")
});
static TELL_ME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btell me\s+([a-z\s]+?)\s*(?:[?!.,]|$)").expect("valid regex")
});
static INNER_PREPOSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:in|at|for)\s+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    LocationLookup,
    LocationNotFound,
    LocationUnavailable,
    Safety,
    Topic(Topic),
    Status,
    Greeting,
    Thanks,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub intent: Intent,
    pub text: String,
    /// Reading for a city named in the utterance. Callers may hand it to
    /// `LocationStore::adopt_reading`.
    pub target: Option<AqiReading>,
}

impl Reply {
    fn new(intent: Intent, text: impl Into<String>) -> Self {
        Self {
            intent,
            text: text.into(),
            target: None,
        }
    }
}

#[derive(Clone, Copy)]
struct Rule {
    intent: Intent,
    keywords: &'static [&'static str],
    whole_words: bool,
}

impl Rule {
    const fn substring(intent: Intent, keywords: &'static [&'static str]) -> Self {
        Self {
            intent,
            keywords,
            whole_words: false,
        }
    }

    const fn words(intent: Intent, keywords: &'static [&'static str]) -> Self {
        Self {
            intent,
            keywords,
            whole_words: true,
        }
    }

    fn matches(&self, lower: &str) -> bool {
        if self.whole_words {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| self.keywords.contains(&word))
        } else {
            self.keywords.iter().any(|keyword| lower.contains(keyword))
        }
    }
}

const RULE_COUNT: usize = Topic::ORDERED.len() + 4;

/// Evaluated top to bottom; the first match wins. Safety comes first, then
/// the topics in [`Topic::ORDERED`] order.
const RULES: [Rule; RULE_COUNT] = build_rules();

const fn build_rules() -> [Rule; RULE_COUNT] {
    let mut rules = [Rule::substring(Intent::Safety, SAFETY_KEYWORDS); RULE_COUNT];
    let mut i = 0;
    while i < Topic::ORDERED.len() {
        let topic = Topic::ORDERED[i];
        rules[i + 1] = Rule::substring(Intent::Topic(topic), topic.keywords());
        i += 1;
    }
    rules[RULE_COUNT - 3] = Rule::substring(Intent::Status, STATUS_KEYWORDS);
    rules[RULE_COUNT - 2] = Rule::words(Intent::Greeting, GREETING_WORDS);
    rules[RULE_COUNT - 1] = Rule::substring(Intent::Thanks, THANKS_KEYWORDS);
    rules
}

fn is_safety_query(lower: &str) -> bool {
    RULES[0].matches(lower)
}

/// Exact match only: "medicine" is filler, "Medicine Hat" and "Curepipe" are not.
fn is_filler_word(word: &str) -> bool {
    NON_PLACE_WORDS.contains(&word)
        || RULES
            .iter()
            .flat_map(|rule| rule.keywords)
            .any(|keyword| *keyword == word)
}

/// Finds a city named in the utterance, e.g. "Mumbai" in
/// "What is the AQI in Mumbai?".
pub fn extract_location(utterance: &str) -> Option<String> {
    let captured = [&*PREPOSITION_PLACE, &*TELL_ME_ABOUT, &*TELL_ME]
        .into_iter()
        .find_map(|pattern| pattern.captures(utterance))
        .and_then(|caps| caps.get(1))?
        .as_str();

    // "safe for running in Delhi" names Delhi, not "running in Delhi".
    let phrase = INNER_PREPOSITION
        .find_iter(captured)
        .last()
        .map_or(captured, |m| &captured[m.end()..]);

    let mut words: Vec<&str> = phrase.split_whitespace().collect();
    while words
        .last()
        .is_some_and(|w| TRAILING_TIME_WORDS.contains(&w.to_lowercase().as_str()))
    {
        words.pop();
    }
    if words.iter().all(|w| is_filler_word(&w.to_lowercase())) {
        return None;
    }
    Some(words.join(" "))
}

fn status_label(aqi: u32) -> &'static str {
    match aqi {
        301.. => "Hazardous",
        201..=300 => "Very Unhealthy",
        151..=200 => "Unhealthy",
        101..=150 => "Moderate",
        _ => "Good",
    }
}

fn safety_text(location: &str, aqi: u32) -> String {
    match aqi {
        151.. => format!(
            "No, it's not safe to run in {location}. The AQI is {aqi}. Better stay indoors."
        ),
        101..=150 => format!(
            "It's moderate in {location} (AQI {aqi}). Sensitive groups should be careful."
        ),
        _ => format!(
            "Yes, it's safe to run in {location}! The AQI is {aqi}. Enjoy your activity."
        ),
    }
}

fn lookup_text(reading: &AqiReading) -> String {
    format!(
        "The current AQI in {} is {}. PM2.5 levels are {} µg/m³.",
        reading.location, reading.aqi, reading.pm25
    )
}

/// Answers an utterance against a known location and reading without any
/// network access. City extraction is not part of this step.
pub fn classify_offline(utterance: &str, location: &str, reading: Option<&AqiReading>) -> Reply {
    let lower = utterance.to_lowercase();
    let intent = RULES
        .iter()
        .find(|rule| rule.matches(&lower))
        .map_or(Intent::Fallback, |rule| rule.intent);

    let text = match intent {
        Intent::Safety => match reading {
            Some(reading) => safety_text(location, reading.aqi),
            None => "I need the AQI data to answer that.".to_string(),
        },
        Intent::Topic(topic) => topic.answer().to_string(),
        Intent::Status => match reading {
            Some(reading) => format!(
                "The AQI in {location} is {} ({}).",
                reading.aqi,
                status_label(reading.aqi)
            ),
            None => "I'm still loading the air quality data. Please wait a moment.".to_string(),
        },
        Intent::Greeting => {
            "Hello! I am AirGuard. Ask me anything about air pollution, health, or the app."
                .to_string()
        }
        Intent::Thanks => "You're welcome! Stay safe and breathe easy.".to_string(),
        _ => "I'm not sure about that. I can tell you about AQI, health tips, specific pollutants like PM2.5, or check pollution in any city.".to_string(),
    };
    Reply::new(intent, text)
}

/// The reading the snapshot can answer with. While a new location is loading
/// the previous city's reading does not count.
fn usable_reading(snapshot: &LocationSnapshot) -> Option<&AqiReading> {
    snapshot
        .reading
        .as_ref()
        .filter(|r| snapshot.status == LoadStatus::Ready || r.location == snapshot.location)
}

pub struct Dispatcher {
    source: Arc<dyn AqiSource>,
}

impl Dispatcher {
    pub fn new(source: Arc<dyn AqiSource>) -> Self {
        Self { source }
    }

    /// Produces the assistant's reply. Never fails: lookup errors become reply
    /// text. The store is not touched.
    pub async fn respond(&self, utterance: &str, snapshot: &LocationSnapshot) -> Reply {
        let Some(city) = extract_location(utterance) else {
            return classify_offline(utterance, &snapshot.location, usable_reading(snapshot));
        };

        debug!(%city, "utterance names a location");
        let target = match self.source.current(&city).await {
            Ok(Some(reading)) => reading,
            Ok(None) => {
                return Reply::new(
                    Intent::LocationNotFound,
                    format!("I couldn't find data for {city}. Please try another city."),
                );
            }
            Err(err) => {
                warn!(%city, error = %err, "location lookup failed");
                return Reply::new(
                    Intent::LocationUnavailable,
                    format!("I'm sorry, I couldn't get the data for {city}. Please try again."),
                );
            }
        };

        let mut reply = if is_safety_query(&utterance.to_lowercase()) {
            classify_offline(utterance, &target.location, Some(&target))
        } else {
            Reply::new(Intent::LocationLookup, lookup_text(&target))
        };
        reply.target = Some(target);
        reply
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
