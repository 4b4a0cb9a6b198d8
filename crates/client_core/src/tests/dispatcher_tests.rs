use super::*;
use crate::{
    store::DataOrigin,
    test_support::{reading, Scripted, ScriptedSource},
};

fn ready_snapshot(location: &str, aqi: u32) -> LocationSnapshot {
    LocationSnapshot {
        location: location.into(),
        reading: Some(reading(location, aqi, 80.0)),
        status: LoadStatus::Ready,
        origin: Some(DataOrigin::Live),
        generation: 1,
        refresh_count: 0,
    }
}

fn empty_snapshot(location: &str) -> LocationSnapshot {
    LocationSnapshot {
        location: location.into(),
        reading: None,
        status: LoadStatus::Loading,
        origin: None,
        generation: 1,
        refresh_count: 0,
    }
}

fn dispatcher(source: ScriptedSource) -> (Arc<ScriptedSource>, Dispatcher) {
    let source = Arc::new(source);
    (source.clone(), Dispatcher::new(source))
}

#[test]
fn extracts_city_after_preposition() {
    assert_eq!(
        extract_location("What is the AQI in Mumbai?").as_deref(),
        Some("Mumbai")
    );
    assert_eq!(
        extract_location("how is the air at new delhi").as_deref(),
        Some("new delhi")
    );
    assert_eq!(
        extract_location("Show pollution for San Francisco, please").as_deref(),
        Some("San Francisco")
    );
}

#[test]
fn extracts_city_from_tell_me_phrases() {
    assert_eq!(
        extract_location("tell me about Varanasi").as_deref(),
        Some("Varanasi")
    );
    assert_eq!(extract_location("Tell me Kolkata!").as_deref(), Some("Kolkata"));
}

#[test]
fn inner_preposition_narrows_to_city() {
    assert_eq!(
        extract_location("Is it safe for running in Delhi?").as_deref(),
        Some("Delhi")
    );
}

#[test]
fn trailing_time_words_are_dropped() {
    assert_eq!(
        extract_location("How bad is it in Lucknow today?").as_deref(),
        Some("Lucknow")
    );
}

#[test]
fn non_place_phrases_are_not_cities() {
    for utterance in [
        "How do I prevent pollution?",
        "Is it safe for kids to play outside?",
        "What can you do for me?",
        "How is the pollution at the moment?",
        "Thanks for the help",
        "Is it good for running?",
        "Is the air bad in my city?",
        "hello",
    ] {
        assert_eq!(extract_location(utterance), None, "{utterance}");
    }
}

#[test]
fn city_names_sharing_words_with_keywords_are_kept() {
    let cases = [
        ("What is the AQI in The Hague?", "The Hague"),
        ("What is the AQI in Medicine Hat?", "Medicine Hat"),
        ("Is it safe to walk in Curepipe?", "Curepipe"),
        ("What is the AQI in Eaton?", "Eaton"),
        ("tell me about Indexville", "Indexville"),
    ];
    for (utterance, city) in cases {
        assert_eq!(extract_location(utterance).as_deref(), Some(city), "{utterance}");
    }
}

#[test]
fn greeting_words_only_match_whole_words() {
    assert_eq!(extract_location("tell me about Hiroshima").as_deref(), Some("Hiroshima"));
    assert_eq!(classify_offline("hi there", "Delhi", None).intent, Intent::Greeting);
    assert_eq!(classify_offline("Hey!", "Delhi", None).intent, Intent::Greeting);
    assert_eq!(
        classify_offline("which city is this", "Delhi", None).intent,
        Intent::Fallback
    );
}

#[test]
fn topic_questions_return_canned_text() {
    let reply = classify_offline("How do I prevent pollution?", "Delhi", None);
    assert_eq!(reply.intent, Intent::Topic(Topic::Prevention));
    assert_eq!(reply.text, Topic::Prevention.answer());

    let reply = classify_offline("what is pm2.5", "Delhi", None);
    assert_eq!(reply.intent, Intent::Topic(Topic::Pm25));

    let reply = classify_offline("What is AQI?", "Delhi", None);
    assert_eq!(reply.intent, Intent::Topic(Topic::AqiIndex));

    let reply = classify_offline("any remedy for a cough", "Delhi", None);
    assert_eq!(reply.intent, Intent::Topic(Topic::Cure));
}

#[test]
fn rules_follow_topic_lookup_order() {
    assert_eq!(RULES[0].intent, Intent::Safety);
    let topics: Vec<Intent> = RULES[1..=Topic::ORDERED.len()].iter().map(|r| r.intent).collect();
    let expected: Vec<Intent> = Topic::ORDERED.into_iter().map(Intent::Topic).collect();
    assert_eq!(topics, expected);
    let tail: Vec<Intent> = RULES[RULE_COUNT - 3..].iter().map(|r| r.intent).collect();
    assert_eq!(tail, [Intent::Status, Intent::Greeting, Intent::Thanks]);
}

#[test]
fn earlier_topic_wins_when_several_match() {
    let reply = classify_offline("what food helps my health", "Delhi", None);
    assert_eq!(reply.intent, Intent::Topic(Topic::HealthEffects));
}

#[test]
fn safety_bands() {
    let at = |aqi| reading("Delhi", aqi, 60.0);
    let not_safe = classify_offline("is it safe to run outside", "Delhi", Some(&at(180)));
    assert_eq!(not_safe.intent, Intent::Safety);
    assert_eq!(
        not_safe.text,
        "No, it's not safe to run in Delhi. The AQI is 180. Better stay indoors."
    );

    let moderate = classify_offline("can I walk", "Delhi", Some(&at(150)));
    assert_eq!(
        moderate.text,
        "It's moderate in Delhi (AQI 150). Sensitive groups should be careful."
    );

    let safe = classify_offline("can the kids play", "Delhi", Some(&at(100)));
    assert_eq!(
        safe.text,
        "Yes, it's safe to run in Delhi! The AQI is 100. Enjoy your activity."
    );

    let missing = classify_offline("is it safe", "Delhi", None);
    assert_eq!(missing.text, "I need the AQI data to answer that.");
}

#[test]
fn status_bands() {
    let cases = [
        (301, "Hazardous"),
        (300, "Very Unhealthy"),
        (201, "Very Unhealthy"),
        (151, "Unhealthy"),
        (150, "Moderate"),
        (101, "Moderate"),
        (100, "Good"),
        (0, "Good"),
    ];
    for (aqi, label) in cases {
        let current = reading("Delhi", aqi, 60.0);
        let reply = classify_offline("how is the air quality", "Delhi", Some(&current));
        assert_eq!(reply.intent, Intent::Status);
        assert_eq!(reply.text, format!("The AQI in Delhi is {aqi} ({label})."));
    }

    let loading = classify_offline("pollution?", "Delhi", None);
    assert_eq!(
        loading.text,
        "I'm still loading the air quality data. Please wait a moment."
    );
}

#[test]
fn thanks_and_fallback() {
    assert_eq!(
        classify_offline("thank you!", "Delhi", None).text,
        "You're welcome! Stay safe and breathe easy."
    );
    let reply = classify_offline("what's the capital of France", "Delhi", None);
    assert_eq!(reply.intent, Intent::Fallback);
    assert!(reply.text.starts_with("I'm not sure about that."));
}

#[tokio::test]
async fn named_city_lookup_reports_reading_and_target() {
    let (source, dispatcher) = dispatcher(
        ScriptedSource::new().with("Mumbai", Scripted::Reading(reading("Mumbai", 162, 74.5))),
    );
    let reply = dispatcher
        .respond("What is the AQI in Mumbai?", &ready_snapshot("Delhi", 300))
        .await;

    assert_eq!(reply.intent, Intent::LocationLookup);
    assert_eq!(
        reply.text,
        "The current AQI in Mumbai is 162. PM2.5 levels are 74.5 µg/m³."
    );
    assert_eq!(reply.target.map(|r| r.location), Some("Mumbai".to_string()));
    assert_eq!(source.calls(), vec!["Mumbai"]);
}

#[tokio::test]
async fn safety_question_about_named_city_uses_its_reading() {
    let (_, dispatcher) = dispatcher(
        ScriptedSource::new().with("Shimla", Scripted::Reading(reading("Shimla", 42, 8.0))),
    );
    let reply = dispatcher
        .respond("Is it safe to run in Shimla?", &ready_snapshot("Delhi", 320))
        .await;

    assert_eq!(reply.intent, Intent::Safety);
    assert_eq!(
        reply.text,
        "Yes, it's safe to run in Shimla! The AQI is 42. Enjoy your activity."
    );
    assert!(reply.target.is_some());
}

#[tokio::test]
async fn named_city_overrides_ambient_reading_even_when_it_looks_like_a_keyword() {
    let (source, dispatcher) = dispatcher(
        ScriptedSource::new()
            .with("The Hague", Scripted::Reading(reading("The Hague", 38, 9.0)))
            .with("Medicine Hat", Scripted::Reading(reading("Medicine Hat", 21, 4.5)))
            .with("Eaton", Scripted::Reading(reading("Eaton", 55, 12.0))),
    );
    let delhi = ready_snapshot("Delhi", 342);

    for city in ["The Hague", "Medicine Hat", "Eaton"] {
        let reply = dispatcher
            .respond(&format!("What is the AQI in {city}?"), &delhi)
            .await;
        assert_eq!(reply.intent, Intent::LocationLookup, "{city}");
        assert!(reply.text.starts_with(&format!("The current AQI in {city} is")), "{}", reply.text);
        assert!(!reply.text.contains("Delhi"));
        assert_eq!(reply.target.map(|r| r.location), Some(city.to_string()));
    }
    assert_eq!(source.calls(), vec!["The Hague", "Medicine Hat", "Eaton"]);
}

#[tokio::test]
async fn safety_question_about_keyword_like_city_uses_its_reading() {
    let (_, dispatcher) = dispatcher(
        ScriptedSource::new().with("Curepipe", Scripted::Reading(reading("Curepipe", 30, 6.0))),
    );
    let reply = dispatcher
        .respond("Is it safe to walk in Curepipe?", &ready_snapshot("Delhi", 342))
        .await;

    assert_eq!(reply.intent, Intent::Safety);
    assert_eq!(
        reply.text,
        "Yes, it's safe to run in Curepipe! The AQI is 30. Enjoy your activity."
    );
}

#[tokio::test]
async fn empty_lookup_result_means_city_not_found() {
    let (source, dispatcher) =
        dispatcher(ScriptedSource::new().with("Gotham", Scripted::Missing));
    let reply = dispatcher
        .respond("What is the AQI in Gotham?", &ready_snapshot("Delhi", 342))
        .await;
    assert_eq!(reply.intent, Intent::LocationNotFound);
    assert_eq!(
        reply.text,
        "I couldn't find data for Gotham. Please try another city."
    );
    assert_eq!(source.calls(), vec!["Gotham"]);
}

#[tokio::test]
async fn unknown_city_stops_the_turn() {
    let (_, dispatcher) = dispatcher(ScriptedSource::new());
    let reply = dispatcher
        .respond("Is it safe to walk in Atlantis?", &ready_snapshot("Delhi", 80))
        .await;
    assert_eq!(reply.intent, Intent::LocationNotFound);
    assert_eq!(
        reply.text,
        "I couldn't find data for Atlantis. Please try another city."
    );
    assert!(reply.target.is_none());
}

#[tokio::test]
async fn failed_lookup_never_falls_back_to_ambient_data() {
    let (_, dispatcher) = dispatcher(ScriptedSource::new().with("Paris", Scripted::Fail));
    let reply = dispatcher
        .respond("pollution in Paris", &ready_snapshot("Delhi", 80))
        .await;
    assert_eq!(reply.intent, Intent::LocationUnavailable);
    assert_eq!(
        reply.text,
        "I'm sorry, I couldn't get the data for Paris. Please try again."
    );
    assert!(!reply.text.contains("Delhi"));
}

#[tokio::test]
async fn without_city_the_snapshot_answers() {
    let (source, dispatcher) = dispatcher(ScriptedSource::new());
    let reply = dispatcher
        .respond("is it safe to run outside", &ready_snapshot("Delhi", 180))
        .await;
    assert_eq!(
        reply.text,
        "No, it's not safe to run in Delhi. The AQI is 180. Better stay indoors."
    );
    assert!(reply.target.is_none());
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn reading_of_previous_city_is_ignored_while_loading() {
    let (_, dispatcher) = dispatcher(ScriptedSource::new());
    let mut snapshot = empty_snapshot("Pune");
    snapshot.reading = Some(reading("Delhi", 250, 120.0));
    let reply = dispatcher.respond("what's the aqi", &snapshot).await;
    assert_eq!(
        reply.text,
        "I'm still loading the air quality data. Please wait a moment."
    );
}
