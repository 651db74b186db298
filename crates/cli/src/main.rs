mod commands;
mod input;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use treedoc_core::{ParseError, ParseOptions, DEFAULT_MAX_DEPTH};

use commands::{cmd_check, cmd_parse, cmd_tokens};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Settings {
    pub output: OutputFormat,
    pub quiet: bool,
    pub options: ParseOptions,
}

/// treedoc document toolchain.
#[derive(Parser)]
#[command(name = "treedoc", version, about = "treedoc document parser and inspector")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log parser activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Maximum nesting depth of elements and arrays
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and print its projection as JSON
    Parse {
        /// Path to the .tdoc file, or - for stdin
        file: PathBuf,
    },

    /// Parse a document and report whether it is well formed
    Check {
        /// Path to the .tdoc file, or - for stdin
        file: PathBuf,
    },

    /// Print every token of a document, comments included
    Tokens {
        /// Path to the .tdoc file, or - for stdin
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings {
        output: cli.output,
        quiet: cli.quiet,
        options: ParseOptions {
            max_depth: cli.max_depth,
        },
    };

    match cli.command {
        Commands::Parse { file } => cmd_parse(&file, settings),
        Commands::Check { file } => cmd_check(&file, settings),
        Commands::Tokens { file } => cmd_tokens(&file, settings),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Report a parse failure on stderr in the selected format. `--quiet`
/// silences it in both formats, like [`report_error`].
pub(crate) fn report_parse_error(e: &ParseError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => eprintln!("error: {}", e),
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
