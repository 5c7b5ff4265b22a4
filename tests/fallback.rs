use travelmate::fallback::knowledge::KnowledgeBase;
use travelmate::fallback::phrasebook::{MatchKind, Phrasebook};
use travelmate::language::Language;

fn phrasebook() -> Phrasebook {
    Phrasebook::builtin().unwrap()
}

#[test]
fn builtin_assets_parse() {
    let kb = KnowledgeBase::builtin().unwrap();
    assert_eq!(
        kb.topic_names(),
        vec!["beach", "lodging", "weather", "food", "transport", "emergency"]
    );
    assert!(phrasebook().has_pair(Language::English, Language::Hindi));
    assert!(!phrasebook().has_pair(Language::Japanese, Language::Chinese));
}

#[test]
fn exact_phrase_english_to_hindi() {
    let out = phrasebook().translate("Hello", Language::English, Language::Hindi);
    assert_eq!(out.text, "नमस्ते");
    assert_eq!(out.kind, MatchKind::Exact);
}

#[test]
fn phrase_lookup_falls_back_to_case_insensitive() {
    let out = phrasebook().translate("  hello ", Language::English, Language::Hindi);
    assert_eq!(out.text, "नमस्ते");
    assert_eq!(out.kind, MatchKind::CaseInsensitive);
}

#[test]
fn word_level_substitution_keeps_unknown_words_and_punctuation() {
    let out = phrasebook().translate("Water, please Zorblax!", Language::English, Language::Hindi);
    assert_eq!(out.kind, MatchKind::WordLevel);
    assert!(out.text.starts_with("पानी,"), "got {}", out.text);
    assert!(out.text.ends_with("Zorblax!"), "got {}", out.text);
}

#[test]
fn nothing_translatable_echoes_input() {
    let out = phrasebook().translate("Zorblax quux", Language::English, Language::Hindi);
    assert_eq!(out.text, "Zorblax quux");
    assert_eq!(out.kind, MatchKind::Untranslated);
}

#[test]
fn unknown_pair_echoes_input() {
    let out = phrasebook().translate("Hello", Language::Japanese, Language::Chinese);
    assert_eq!(out.text, "Hello");
    assert_eq!(out.kind, MatchKind::Untranslated);
}

#[test]
fn reverse_pair_is_available() {
    let out = phrasebook().translate("नमस्ते", Language::Hindi, Language::English);
    assert_eq!(out.text, "Hello");
}

#[test]
fn beach_message_gets_beach_paragraph() {
    let kb = KnowledgeBase::builtin().unwrap();
    let reply = kb.answer("Which BEACH is best for families?");
    assert_eq!(reply.topics, vec!["beach"]);
    assert!(reply.text.contains("Palolem"));
}

#[test]
fn multiple_topics_concatenate_in_bucket_order() {
    let kb = KnowledgeBase::builtin().unwrap();
    let reply = kb.answer("Any hotel near the beach?");
    assert_eq!(reply.topics, vec!["beach", "lodging"]);
    let beach = reply.text.find("coastline").unwrap();
    let lodging = reply.text.find("places to stay").unwrap();
    assert!(beach < lodging);
}

#[test]
fn unmatched_message_gets_generic_reply() {
    let kb = KnowledgeBase::builtin().unwrap();
    let reply = kb.answer("Tell me a joke");
    assert!(reply.topics.is_empty());
    assert_eq!(reply.text, kb.generic());
}

#[test]
fn custom_assets_are_loaded_from_toml() {
    let pb = Phrasebook::from_toml(
        r#"
        [pairs.english-spanish.phrases]
        "Good night" = "Buenas noches"
        [pairs.english-spanish.words]
        Night = "noche"
        "#,
    )
    .unwrap();
    assert_eq!(
        pb.translate("good night", Language::English, Language::Spanish).text,
        "Buenas noches"
    );
    assert_eq!(
        pb.translate("night", Language::English, Language::Spanish).text,
        "noche"
    );

    let kb = KnowledgeBase::from_toml(
        r#"
        generic = "Ask me anything."
        [[topics]]
        name = "ferry"
        keywords = ["Ferry"]
        reply = "Ferries cross the Mandovi every 20 minutes."
        "#,
    )
    .unwrap();
    assert_eq!(kb.answer("ferry times?").topics, vec!["ferry"]);
}

#[test]
fn malformed_assets_are_rejected() {
    assert!(Phrasebook::from_toml("pairs = 3").is_err());
    assert!(KnowledgeBase::from_toml("generic = \"\"").is_err());
}
