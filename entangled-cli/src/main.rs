//! Entangled CLI - Literate Programming Engine

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

use entangled::config::AnnotationMethod;
use entangled::errors::Result;
use entangled::interface::Context;
use entangled::io::TransactionMode;

/// Annotation method for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAnnotation {
    /// No markers on block boundaries.
    None,
    /// Markers on every expanded named block.
    Standard,
    /// Plain output; stitching back becomes lossy.
    Naked,
}

impl From<CliAnnotation> for AnnotationMethod {
    fn from(a: CliAnnotation) -> Self {
        match a {
            CliAnnotation::None => AnnotationMethod::None,
            CliAnnotation::Standard => AnnotationMethod::Standard,
            CliAnnotation::Naked => AnnotationMethod::Naked,
        }
    }
}

#[derive(Parser)]
#[command(name = "entangled")]
#[command(author, version, about = "Literate programming engine", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract code from markdown files
    Tangle {
        /// Annotation method (overrides configuration)
        #[arg(short, long, value_enum)]
        annotate: Option<CliAnnotation>,

        /// Overwrite files that were modified externally
        #[arg(short, long)]
        force: bool,

        /// Only show what would happen
        #[arg(short, long)]
        show: bool,
    },

    /// Update markdown from modified tangled files
    Stitch {
        /// Overwrite markdown that was modified externally
        #[arg(short, long)]
        force: bool,

        /// Only show what would happen
        #[arg(short, long)]
        show: bool,
    },

    /// Stitch then tangle in one transaction
    Sync {
        /// Overwrite files that were modified externally
        #[arg(short, long)]
        force: bool,
    },

    /// Rebuild the file database from on-disk state
    Reset,

    /// Watch for changes and sync on each batch
    Watch,

    /// Show tracked files and out-of-band changes
    Status,
}

fn mode_for(force: bool, show: bool) -> TransactionMode {
    if show {
        TransactionMode::Show
    } else if force {
        TransactionMode::Force
    } else {
        TransactionMode::Fail
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut ctx = Context::from_current_dir()?;

    match cli.command {
        Commands::Tangle {
            annotate,
            force,
            show,
        } => {
            if let Some(annotate) = annotate {
                ctx.config.annotation = annotate.into();
            }
            commands::tangle(&ctx, mode_for(force, show))
        }
        Commands::Stitch { force, show } => commands::stitch(&ctx, mode_for(force, show)),
        Commands::Sync { force } => commands::sync(&ctx, mode_for(force, false)),
        Commands::Reset => commands::reset(&ctx),
        Commands::Watch => commands::watch(&ctx),
        Commands::Status => commands::status(&ctx),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
