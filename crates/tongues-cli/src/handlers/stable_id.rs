//! Stable-id command handler

use crate::cli::StableIdArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use serde::Serialize;
use tongues_core::stable_id;

#[derive(Debug, Serialize)]
struct StableIdOutput<'a> {
    text: &'a str,
    locale: String,
    id: String,
}

/// Handle the stable-id command
///
/// The locale is checked by the argument parser, so `stable_id` cannot panic here.
pub fn handle_stable_id(args: StableIdArgs, output: &mut OutputWriter) -> Result<()> {
    let id = stable_id(&args.text, &args.locale);

    if output.is_human() {
        return output.writeln(&id);
    }

    output.data(&StableIdOutput {
        text: &args.text,
        locale: args.locale.to_uppercase(),
        id,
    })
}
