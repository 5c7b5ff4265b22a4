mod common;

use std::sync::Arc;

use common::{MockServer, offline_config};
use tokio_test::assert_ok;
use travelmate::dispatch::AttemptOutcome;
use travelmate::dispatch::http::HttpDispatch;
use travelmate::fallback::phrasebook::{MatchKind, Phrasebook};
use travelmate::limits::cooldown::CooldownTracker;
use travelmate::model::TranslationRequest;
use travelmate::orchestrator::translate::TranslationOrchestrator;

fn orchestrator(config: &travelmate::config::Config) -> TranslationOrchestrator {
    TranslationOrchestrator::from_config(
        config,
        HttpDispatch::new(),
        Arc::new(CooldownTracker::new()),
        Arc::new(assert_ok!(Phrasebook::builtin())),
    )
}

#[tokio::test]
async fn chain_order_is_fixed() {
    let config = offline_config().await;
    let translator = orchestrator(&config);
    assert_eq!(
        translator.provider_order(),
        vec!["mymemory", "gemini", "libretranslate", "lingva"]
    );
}

#[tokio::test]
async fn all_providers_down_uses_phrasebook() {
    let config = offline_config().await;
    let translator = orchestrator(&config);

    let out = translator
        .translate(&TranslationRequest::new("Hello", "English", "Hindi"))
        .await;

    assert_eq!(out.text, "नमस्ते");
    assert_eq!(out.provider, "offline");
    assert!(out.used_fallback);
    assert!(!out.rate_limited);
    assert_eq!(out.match_kind, Some(MatchKind::Exact));

    let trace: Vec<_> = out.attempts.iter().map(|a| a.outcome).collect();
    // Gemini has no key in the offline config.
    assert_eq!(
        trace,
        vec![
            AttemptOutcome::NetworkError,
            AttemptOutcome::Skipped,
            AttemptOutcome::NetworkError,
            AttemptOutcome::NetworkError
        ]
    );
}

#[tokio::test]
async fn untranslatable_text_is_echoed_with_fallback_flag() {
    let config = offline_config().await;
    let out = orchestrator(&config)
        .translate(&TranslationRequest::new("Qwzx vrrp", "English", "Hindi"))
        .await;

    assert_eq!(out.text, "Qwzx vrrp");
    assert!(out.used_fallback);
}

#[tokio::test]
async fn first_provider_success_is_returned() {
    let mymemory = MockServer::json(
        200,
        r#"{"responseData":{"translatedText":"नमस्ते दुनिया"},"responseStatus":200}"#,
    )
    .await;
    let lingva = MockServer::json(200, r#"{"translation":"unused"}"#).await;
    let mut config = offline_config().await;
    config.endpoints.mymemory = mymemory.url.clone();
    config.endpoints.lingva = lingva.url.clone();

    let out = orchestrator(&config)
        .translate(&TranslationRequest::new("Hello world", "English", "Hindi"))
        .await;

    assert_eq!(out.text, "नमस्ते दुनिया");
    assert_eq!(out.provider, "mymemory");
    assert!(!out.used_fallback);
    assert_eq!(lingva.hits(), 0);
}

#[tokio::test]
async fn missing_translation_field_advances_to_next_provider() {
    let mymemory = MockServer::json(200, r#"{"responseData":{},"responseStatus":200}"#).await;
    let libre = MockServer::json(200, r#"{"translatedText":"  "}"#).await;
    let lingva = MockServer::json(200, r#"{"translation":"Hola mundo"}"#).await;
    let mut config = offline_config().await;
    config.endpoints.mymemory = mymemory.url.clone();
    config.endpoints.libretranslate = libre.url.clone();
    config.endpoints.lingva = lingva.url.clone();

    let out = orchestrator(&config)
        .translate(&TranslationRequest::new("Hello world", "English", "Spanish"))
        .await;

    assert_eq!(out.text, "Hola mundo");
    assert_eq!(out.provider, "lingva");
    assert_eq!(mymemory.hits(), 1);
    assert_eq!(libre.hits(), 1);
    let trace: Vec<_> = out.attempts.iter().map(|a| a.outcome).collect();
    assert_eq!(trace[0], AttemptOutcome::Malformed);
    assert_eq!(trace[2], AttemptOutcome::Malformed);
    assert_eq!(trace[3], AttemptOutcome::Success);
}

#[tokio::test]
async fn overload_before_fallback_sets_rate_limited() {
    let mymemory = MockServer::json(429, r#"{"responseStatus":429}"#).await;
    let mut config = offline_config().await;
    config.endpoints.mymemory = mymemory.url.clone();

    let translator = orchestrator(&config);
    let req = TranslationRequest::new("Hello", "English", "Hindi");

    let out = translator.translate(&req).await;
    assert!(out.used_fallback);
    assert!(out.rate_limited);
    assert_eq!(out.text, "नमस्ते");

    // MyMemory is now cooling down and is skipped without a request.
    let again = translator.translate(&req).await;
    assert_eq!(mymemory.hits(), 1);
    assert_eq!(again.attempts[0].outcome, AttemptOutcome::CoolingDown);
    assert!(again.used_fallback);
    assert!(again.rate_limited);
}

#[tokio::test]
async fn quota_warning_in_body_counts_as_rate_limit() {
    let mymemory = MockServer::json(
        200,
        r#"{"responseData":{"translatedText":"MYMEMORY WARNING: YOU USED ALL AVAILABLE FREE TRANSLATIONS FOR TODAY."},"responseStatus":"200"}"#,
    )
    .await;
    let mut config = offline_config().await;
    config.endpoints.mymemory = mymemory.url.clone();

    let out = orchestrator(&config)
        .translate(&TranslationRequest::new("Thank you", "English", "Hindi"))
        .await;

    assert!(out.used_fallback);
    assert!(out.rate_limited);
    assert_eq!(out.attempts[0].outcome, AttemptOutcome::RateLimited);
}

#[tokio::test]
async fn keyed_gemini_is_tried_second() {
    let gemini = MockServer::json(
        200,
        r#"{"candidates":[{"content":{"parts":[{"text":"\"Bonjour\""}]}}]}"#,
    )
    .await;
    let mut config = offline_config().await;
    config.gemini_api_key = Some("test-key".to_string());
    config.endpoints.gemini = gemini.url.clone();

    let out = orchestrator(&config)
        .translate(&TranslationRequest::new("Hello", "English", "French"))
        .await;

    assert_eq!(out.provider, "gemini");
    assert_eq!(out.text, "Bonjour");
    assert_eq!(gemini.hits(), 1);
}
