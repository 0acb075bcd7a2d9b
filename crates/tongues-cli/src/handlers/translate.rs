//! Translate command handler

use super::select_engines;
use crate::cli::TranslateArgs;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use serde::Serialize;
use serde_json::Value;
use tongues_core::types::is_auto;
use tongues_core::{Extra, TranslationRequest, TranslatorManager};

/// One engine's answer, as emitted by the machine output formats
#[derive(Debug, Serialize)]
pub struct TranslateOutcome {
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_source: Option<String>,
    #[serde(skip_serializing_if = "Extra::is_empty")]
    pub metadata: Extra,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handle the translate command
///
/// With `--all` a failing engine is reported and the remaining engines
/// still run; the command fails only when every engine failed.
pub async fn handle_translate(
    args: TranslateArgs,
    manager: &TranslatorManager,
    output: &mut OutputWriter,
) -> Result<()> {
    let request = build_request(&args);
    let engines = select_engines(manager, args.engine.as_deref(), args.all)?;
    let show_detected = is_auto(&args.from);

    let mut outcomes = Vec::with_capacity(engines.len());
    for engine in engines {
        let timer = Timer::new("translate");
        let spinner = output.spinner(&format!("Translating with {}...", engine.name()));
        let result = engine.translate(&request).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok(result) => {
                tracing::info!(
                    engine = engine.name(),
                    duration_ms = timer.elapsed().as_millis() as u64,
                    "Translation finished"
                );
                output.result(engine.name(), &result.translated_text)?;
                if show_detected && !is_auto(&result.detected_source) {
                    output.comment(&format!("Detected: {}", result.detected_source))?;
                }
                outcomes.push(TranslateOutcome {
                    engine: engine.name().to_string(),
                    translated_text: Some(result.translated_text),
                    detected_source: Some(result.detected_source),
                    metadata: result.metadata,
                    error: None,
                });
            }
            Err(e) if args.all => {
                tracing::warn!(engine = engine.name(), error = %e, "Engine failed, continuing");
                output.error(engine.name(), &e.to_string())?;
                outcomes.push(TranslateOutcome {
                    engine: engine.name().to_string(),
                    translated_text: None,
                    detected_source: None,
                    metadata: Extra::new(),
                    error: Some(e.to_string()),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    if args.all {
        output.data(&outcomes)?;
        if outcomes.iter().all(|o| o.error.is_some()) {
            return Err(Error::other(format!("all {} engines failed", outcomes.len())));
        }
    } else if let Some(outcome) = outcomes.first() {
        output.data(outcome)?;
    }

    Ok(())
}

fn build_request(args: &TranslateArgs) -> TranslationRequest {
    let mut request = TranslationRequest::new(args.text.as_str(), args.from.as_str(), args.to.as_str())
        .with_html(args.html);
    if let Some(glossary) = &args.glossary {
        request = request.with_glossary(glossary.as_str());
    }
    for (key, raw) in &args.extra {
        request = request.with_extra(key.as_str(), extra_value(raw));
    }
    request
}

/// `3` and `true` become JSON scalars, anything else stays a string
fn extra_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
