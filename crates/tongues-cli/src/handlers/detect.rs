//! Detect command handler

use super::select_engines;
use crate::cli::DetectArgs;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use serde::Serialize;
use tongues_core::TranslatorManager;

#[derive(Debug, Serialize)]
pub struct DetectOutcome {
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handle the detect command
pub async fn handle_detect(
    args: DetectArgs,
    manager: &TranslatorManager,
    output: &mut OutputWriter,
) -> Result<()> {
    if args.text.trim().is_empty() {
        return Err(Error::from(tongues_core::Error::invalid_request(
            "text",
            "nothing to detect",
        )));
    }

    let engines = select_engines(manager, args.engine.as_deref(), args.all)?;
    let mut outcomes = Vec::with_capacity(engines.len());

    for engine in engines {
        let spinner = output.spinner(&format!("Detecting with {}...", engine.name()));
        let result = engine.detect(&args.text).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match result {
            Ok(detection) => {
                output.result(
                    engine.name(),
                    &format!("{} (confidence {:.2})", detection.language, detection.confidence),
                )?;
                outcomes.push(DetectOutcome {
                    engine: engine.name().to_string(),
                    language: Some(detection.language),
                    confidence: Some(detection.confidence),
                    error: None,
                });
            }
            Err(e) if args.all => {
                tracing::warn!(engine = engine.name(), error = %e, "Engine failed, continuing");
                output.error(engine.name(), &e.to_string())?;
                outcomes.push(DetectOutcome {
                    engine: engine.name().to_string(),
                    language: None,
                    confidence: None,
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
