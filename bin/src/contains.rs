use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;
use tap::Pipe;
use tracing::{debug, info};

use crate::matching::{Predicates, Target};

/// Exit status when no reference matched.
const EXIT_NO_MATCH: u8 = 1;

#[derive(Debug, Parser)]
pub struct Options {
    #[clap(flatten)]
    target: Target,

    #[clap(flatten)]
    predicates: Predicates,
}

#[tracing::instrument]
pub async fn main(opts: Options) -> Result<ExitCode> {
    let predicate = opts.predicates.predicate()?;
    let found = opts.target.references().await?;

    let matched = found.iter().find(|found| predicate.matches(&found.reference));
    match matched {
        Some(found) => {
            info!(%predicate, ?found, "found matching reference");
            ExitCode::SUCCESS
        }
        None => {
            debug!(%predicate, count = found.len(), "no reference matched");
            ExitCode::from(EXIT_NO_MATCH)
        }
    }
    .pipe(Ok)
}
