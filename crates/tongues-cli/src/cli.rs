//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Tongues CLI - one command line over several translation engines
///
/// Translate text, detect languages and compare configured engines side by
/// side. Engines are declared in a YAML, JSON or TOML configuration file.
#[derive(Parser, Debug)]
#[command(
    name = "tongues",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TONGUES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text with one engine or every configured engine
    Translate(TranslateArgs),

    /// Detect the language of a text
    Detect(DetectArgs),

    /// List configured engines and their capabilities
    Engines,

    /// Print the catalog key for a text and locale
    StableId(StableIdArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the translate command
#[derive(Parser, Debug)]
pub struct TranslateArgs {
    /// Text to translate
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Engine name (defaults to the configured default engine)
    #[arg(short, long, value_name = "ENGINE", conflicts_with = "all")]
    pub engine: Option<String>,

    /// Run every configured engine in registration order
    #[arg(long)]
    pub all: bool,

    /// Source language, e.g. en or auto
    #[arg(long, default_value = "auto")]
    pub from: String,

    /// Target language, e.g. es
    #[arg(long, default_value = "es")]
    pub to: String,

    /// Treat input as HTML
    #[arg(long)]
    pub html: bool,

    /// Vendor glossary id
    #[arg(long, value_name = "ID")]
    pub glossary: Option<String>,

    /// Vendor-specific option, repeatable (e.g. --extra formality=more)
    #[arg(long = "extra", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub extra: Vec<(String, String)>,
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Text whose language should be detected
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Engine name (defaults to the configured default engine)
    #[arg(short, long, value_name = "ENGINE", conflicts_with = "all")]
    pub engine: Option<String>,

    /// Run every configured engine in registration order
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the stable-id command
#[derive(Parser, Debug)]
pub struct StableIdArgs {
    /// Source text
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Two-letter locale embedded in the key
    #[arg(short, long, value_parser = parse_locale)]
    pub locale: String,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Parse a `KEY=VALUE` pair for `--extra`
fn parse_key_val(raw: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected KEY=VALUE, got '{}'", raw))?;
    if key.trim().is_empty() {
        anyhow::bail!("empty key in '{}'", raw);
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn parse_locale(raw: &str) -> anyhow::Result<String> {
    if raw.len() != 2 || !raw.is_ascii() {
        anyhow::bail!("locale must be exactly 2 ASCII characters, got '{}'", raw);
    }
    Ok(raw.to_string())
}
