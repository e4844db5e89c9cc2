use std::process::ExitCode;

use clap::{
    builder::{styling::AnsiColor, Styles},
    Parser,
};
use color_eyre::eyre::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{self, prelude::*};

mod contains;
mod dockerfile;
mod find;
mod matching;

/// Exit status for failures other than "no reference matched".
const EXIT_ERROR: u8 = 2;

#[derive(Debug, Parser)]
#[command(version, about, styles = style())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser)]
enum Commands {
    /// List the image references in a Dockerfile that match the predicates
    ///
    /// Each match is printed on its own line exactly as written in the Dockerfile.
    /// Without predicates, every image reference is listed.
    Find(find::Options),

    /// Test whether a Dockerfile contains an image reference matching the predicates
    ///
    /// Nothing is printed; the exit status is the result:
    ///
    /// 0: at least one image reference matched
    ///
    /// 1: no image reference matched
    ///
    /// 2: the predicates or the input were invalid
    #[clap(verbatim_doc_comment)]
    Contains(contains::Options),
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = color_eyre::install() {
        eprintln!("Error: {err:?}");
        return ExitCode::from(EXIT_ERROR);
    }

    tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(
            tracing_tree::HierarchicalLayer::default()
                .with_indent_lines(true)
                .with_indent_amount(2)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_verbose_exit(false)
                .with_verbose_entry(false)
                .with_deferred_spans(true)
                .with_bracketed_fields(true)
                .with_span_retrace(true)
                .with_targets(false),
        )
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Find(opts) => find::main(opts).await,
        Commands::Contains(opts) => contains::main(opts).await,
    }
}

fn style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default())
        .usage(AnsiColor::Green.on_default())
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
        .error(AnsiColor::Red.on_default())
        .invalid(AnsiColor::Red.on_default())
        .valid(AnsiColor::Blue.on_default())
}
