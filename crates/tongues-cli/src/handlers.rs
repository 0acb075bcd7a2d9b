//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod detect;
mod engines;
mod stable_id;
mod translate;

pub use completions::handle_completions;
pub use detect::handle_detect;
pub use engines::handle_engines;
pub use stable_id::handle_stable_id;
pub use translate::handle_translate;

use crate::error::{Error, Result};
use std::sync::Arc;
use tongues_core::{TranslatorEngine, TranslatorManager};

/// Engines a command runs against: the named one, the default, or all of them
fn select_engines(
    manager: &TranslatorManager,
    engine: Option<&str>,
    all: bool,
) -> Result<Vec<Arc<dyn TranslatorEngine>>> {
    if all {
        let registry = manager.registry();
        if registry.is_empty() {
            return Err(Error::config(
                "no engines configured; pass --config or create tongues.yaml",
            ));
        }
        return Ok(registry.iter().cloned().collect());
    }

    let selected = match engine {
        Some(name) => manager.by(name)?,
        None => manager.default_engine()?,
    };
    Ok(vec![selected])
}
