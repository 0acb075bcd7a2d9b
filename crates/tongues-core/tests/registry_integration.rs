//! Registry, manager and identity behavior seen from outside the crate


use serde_json::json;
use test_support::*;
use tongues_core::{
    build_registry, stable_id, Error, TranslationRequest, TranslatorConfig, TranslatorManager,
};

#[test]
fn test_names_follow_configuration_order() {
    let registry = build_registry(&all_engines("google"), StubTransport::ok(json!({})), None).unwrap();
    assert_eq!(registry.names(), vec!["libre_local", "deepl_free", "google", "bing"]);
    assert_eq!(registry.default_name(), "google");
}

#[test]
fn test_missing_engine_and_default() {
    let registry = build_registry(&all_engines("default"), StubTransport::ok(json!({})), None).unwrap();

    assert!(matches!(registry.get("missing"), Err(Error::EngineNotFound { ref name }) if name == "missing"));
    assert!(matches!(registry.get_default(), Err(Error::EngineNotFound { ref name }) if name == "default"));
}

#[test]
fn test_default_engine_name_defaults_to_default() {
    let config: TranslatorConfig = serde_json::from_value(json!({
        "engines": [{"name": "default", "type": "libre", "base_uri": "http://localhost:5000"}]
    }))
    .unwrap();

    let registry = build_registry(&config, StubTransport::ok(json!({})), None).unwrap();
    assert_eq!(registry.get_default().unwrap().name(), "default");
}

#[test]
fn test_missing_api_key_is_configuration_error() {
    let mut config = all_engines("libre_local");
    config.engines.push(tongues_core::EngineConfig::new("deepl_nokey", tongues_core::EngineType::Deepl));

    let err = build_registry(&config, StubTransport::ok(json!({})), None).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("deepl_nokey"));
}

#[tokio::test]
async fn test_manager_side_by_side() {
    let transport = StubTransport::sequence(vec![
        json!({"translatedText": "Hola", "detectedLanguage": {"language": "en"}}),
        json!({"translations": [{"text": "Hola", "detected_source_language": "EN"}]}),
    ]);
    let config = TranslatorConfig {
        default_engine: "libre_local".into(),
        engines: vec![libre_local(), deepl_free()],
        ..Default::default()
    };
    let manager = TranslatorManager::with_transport(&config, transport.clone(), None).unwrap();

    let request = TranslationRequest::new("Hello", "auto", "es");
    let mut outputs = Vec::new();
    for name in manager.names() {
        let engine = manager.by(name).unwrap();
        let result = engine.translate(&request).await.unwrap();
        outputs.push((engine.name().to_string(), result.translated_text, result.detected_source));
    }

    assert_eq!(
        outputs,
        vec![
            ("libre_local".to_string(), "Hola".to_string(), "en".to_string()),
            ("deepl_free".to_string(), "Hola".to_string(), "EN".to_string()),
        ]
    );
    assert_eq!(transport.calls(), 2);
}

#[test]
fn test_stable_id_locale_position() {
    for text in ["", "Hello", "¿Dónde está la biblioteca?"] {
        let id = stable_id(text, "es");
        assert_eq!(id.len(), 18);
        assert_eq!(&id[3..5], "ES");
        assert_eq!(id, stable_id(text, "ES"));
    }
}

#[test]
#[should_panic(expected = "exactly 2 ASCII characters")]
fn test_stable_id_three_letter_locale() {
    stable_id("Hello", "spa");
}
