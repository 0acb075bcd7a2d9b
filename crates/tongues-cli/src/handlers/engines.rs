//! Engines command handler

use crate::error::Result;
use crate::output::OutputWriter;
use serde::Serialize;
use tongues_core::{EngineCapabilities, TranslatorManager};

#[derive(Debug, Serialize)]
pub struct EngineListing {
    pub name: String,
    pub vendor: String,
    pub default: bool,
    pub capabilities: EngineCapabilities,
}

/// Handle the engines command
pub fn handle_engines(manager: &TranslatorManager, output: &mut OutputWriter) -> Result<()> {
    let listings: Vec<EngineListing> = manager
        .registry()
        .iter()
        .map(|engine| EngineListing {
            name: engine.name().to_string(),
            vendor: engine.vendor().to_string(),
            default: engine.name() == manager.default_name(),
            capabilities: engine.capabilities(),
        })
        .collect();

    if !output.is_human() {
        return output.data(&listings);
    }

    if listings.is_empty() {
        output.comment("No engines configured")?;
        return Ok(());
    }

    output.section("Engines")?;
    let rows = listings
        .iter()
        .map(|listing| {
            vec![
                if listing.default {
                    format!("{} *", listing.name)
                } else {
                    listing.name.clone()
                },
                listing.vendor.clone(),
                yes_no(listing.capabilities.supports_html).to_string(),
                yes_no(listing.capabilities.supports_glossary).to_string(),
                listing
                    .capabilities
                    .max_chars_per_request
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    output.table(&["NAME", "VENDOR", "HTML", "GLOSSARY", "MAX CHARS"], rows)?;

    if !manager.registry().contains(manager.default_name()) {
        output.comment(&format!(
            "Default engine '{}' is not configured",
            manager.default_name()
        ))?;
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
