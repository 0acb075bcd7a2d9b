//! End-to-end adapter behavior against a stub transport


use std::sync::Arc;

use serde_json::json;
use test_support::*;
use tongues_core::registry::create_engine;
use tongues_core::{
    Error, ErrorClassification, TranslationBatchRequest, TranslationRequest, TranslatorEngine,
};

fn engine(config: &tongues_core::EngineConfig, transport: Arc<StubTransport>) -> Arc<dyn TranslatorEngine> {
    create_engine(config, transport, None, 0).unwrap()
}

// ============================================================================
// LIBRETRANSLATE
// ============================================================================

#[tokio::test]
async fn test_libre_hello_to_spanish() {
    let transport = StubTransport::ok(json!({
        "translatedText": "Hola",
        "detectedLanguage": {"language": "en"}
    }));
    let libre = engine(&libre_local(), transport.clone());

    let result = libre
        .translate(&TranslationRequest::new("Hello", "en", "es"))
        .await
        .unwrap();

    assert_eq!(result.translated_text, "Hola");
    assert_eq!(result.detected_source, "en");
    assert_eq!(result.metadata["engine"], "libre_local");

    let request = transport.last_request();
    assert_eq!(request.url().unwrap().as_str(), "http://localhost:5000/translate");
    assert!(json_body(&request).get("api_key").is_none());
    assert!(request.headers.is_empty());
}

#[tokio::test]
async fn test_libre_extra_merged_into_body() {
    let transport = StubTransport::ok(json!({"translatedText": "Hola"}));
    let libre = engine(&libre_local(), transport.clone());

    libre
        .translate(&TranslationRequest::new("Hello", "auto", "es").with_extra("alternatives", 2))
        .await
        .unwrap();

    let body = json_body(&transport.last_request());
    assert_eq!(body["alternatives"], 2);
    assert_eq!(body["source"], "auto");
}

// ============================================================================
// DEEPL
// ============================================================================

#[tokio::test]
async fn test_deepl_source_lang_omitted_for_auto() {
    let transport = StubTransport::ok(json!({"translations": [{"text": "Hola", "detected_source_language": "EN"}]}));
    let deepl = engine(&deepl_free(), transport.clone());

    let result = deepl
        .translate(&TranslationRequest::new("Hello", "auto", "es"))
        .await
        .unwrap();
    assert_eq!(result.detected_source, "EN");
    assert!(!form_has(&transport.last_request(), "source_lang"));
}

#[tokio::test]
async fn test_deepl_source_lang_uppercased() {
    let transport = StubTransport::ok(json!({"translations": [{"text": "Hola"}]}));
    let deepl = engine(&deepl_free(), transport.clone());

    deepl
        .translate(&TranslationRequest::new("Hello", "en", "es"))
        .await
        .unwrap();

    let pairs = form_body(&transport.last_request());
    assert!(pairs.contains(&("source_lang".to_string(), "EN".to_string())));
    assert!(pairs.contains(&("target_lang".to_string(), "ES".to_string())));
}

#[tokio::test]
async fn test_deepl_auth_error_is_classified() {
    let transport = StubTransport::always(403, json!({"message": "Authorization failure"}));
    let deepl = engine(&deepl_free(), transport);

    let err = deepl
        .translate(&TranslationRequest::new("Hello", "en", "es"))
        .await
        .unwrap_err();

    match &err {
        Error::EngineHttp { engine, status_code, body } => {
            assert_eq!(engine, "deepl_free");
            assert_eq!(*status_code, 403);
            assert!(body.contains("Authorization failure"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.classification(), Some(ErrorClassification::AuthenticationError));
}

// ============================================================================
// GOOGLE
// ============================================================================

#[tokio::test]
async fn test_google_empty_detections() {
    let transport = StubTransport::ok(json!({"data": {"detections": []}}));
    let google = engine(&google(), transport);

    let result = google.detect("Hello").await.unwrap();
    assert_eq!(result.language, "und");
    assert_eq!(result.confidence, 0.0);
}

#[tokio::test]
async fn test_google_key_in_query_only() {
    let transport = StubTransport::ok(json!({"data": {"translations": [{"translatedText": "Hola"}]}}));
    let google = engine(&google(), transport.clone());

    google
        .translate(&TranslationRequest::new("Hello", "en", "es"))
        .await
        .unwrap();

    let request = transport.last_request();
    assert_eq!(request.query_value("key"), Some("google-key"));
    assert!(request.header_value("Authorization").is_none());
    assert!(json_body(&request).get("key").is_none());
}

// ============================================================================
// CROSS-VENDOR PROPERTIES
// ============================================================================

#[tokio::test]
async fn test_batch_preserves_order_for_every_vendor() {
    let texts = ["one", "two", "three"];
    let expected = vec!["uno", "dos", "tres"];

    let cases = vec![
        (
            libre_local(),
            json!({"translatedText": ["uno", "dos", "tres"], "detectedLanguage": [{"language": "en"}]}),
        ),
        (
            deepl_free(),
            json!({"translations": [{"text": "uno"}, {"text": "dos"}, {"text": "tres"}]}),
        ),
        (
            google(),
            json!({"data": {"translations": [
                {"translatedText": "uno"}, {"translatedText": "dos"}, {"translatedText": "tres"}
            ]}}),
        ),
        (
            bing(),
            json!([
                {"translations": [{"text": "uno"}]},
                {"translations": [{"text": "dos"}]},
                {"translations": [{"text": "tres"}]}
            ]),
        ),
    ];

    for (config, body) in cases {
        let adapter = engine(&config, StubTransport::ok(body));
        let result = adapter
            .translate_batch(&TranslationBatchRequest::new(texts, "en", "es"))
            .await
            .unwrap();
        assert_eq!(result.translated_texts, expected, "engine {}", config.name);
        assert_eq!(result.detected_source, "en", "engine {}", config.name);
    }
}

#[tokio::test]
async fn test_short_batch_is_an_error() {
    let transport = StubTransport::ok(json!({"translations": [{"text": "uno"}]}));
    let deepl = engine(&deepl_free(), transport);

    let err = deepl
        .translate_batch(&TranslationBatchRequest::new(["one", "two"], "en", "es"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::IncompleteBatch { expected: 2, received: 1, .. }));
}

#[tokio::test]
async fn test_invalid_request_never_reaches_vendor() {
    let transport = StubTransport::ok(json!({}));
    let google = engine(&google(), transport.clone());

    let err = google
        .translate(&TranslationRequest::new("Hello", "en", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }));

    let err = google
        .translate_batch(&TranslationBatchRequest::new(Vec::<String>::new(), "en", "es"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }));

    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_non_json_body_is_invalid_response() {
    let transport = StubTransport::raw(200, "<html>502 Bad Gateway</html>");
    let libre = engine(&libre_local(), transport);

    let err = libre
        .translate(&TranslationRequest::new("Hello", "en", "es"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse { ref engine, .. } if engine == "libre_local"));
}

#[tokio::test]
async fn test_null_body_degrades_to_defaults() {
    let transport = StubTransport::ok(json!(null));
    let libre = engine(&libre_local(), transport);

    let result = libre
        .translate(&TranslationRequest::new("Hello", "auto", "es"))
        .await
        .unwrap();
    assert_eq!(result.translated_text, "");
    assert_eq!(result.detected_source, "auto");
}

#[test]
fn test_capabilities_are_constant() {
    for config in [libre_local(), deepl_free(), google(), bing()] {
        let adapter = engine(&config, StubTransport::ok(json!({})));
        assert_eq!(adapter.capabilities(), adapter.capabilities());
        assert_eq!(adapter.capabilities().metadata["vendor"], config.engine_type.as_str());
    }
}
