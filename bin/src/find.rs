use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use dockmoor_lib::Reference;
use pluralizer::pluralize;
use serde::Serialize;
use tracing::info;

use crate::{
    dockerfile::Found,
    matching::{Predicates, Target},
};

#[derive(Debug, Parser)]
pub struct Options {
    #[clap(flatten)]
    target: Target,

    #[clap(flatten)]
    predicates: Predicates,

    /// Print the matching references as a JSON array of their parsed fields and line numbers
    #[arg(long)]
    json: bool,
}

#[tracing::instrument]
pub async fn main(opts: Options) -> Result<ExitCode> {
    let predicate = opts.predicates.predicate()?;
    let found = opts.target.references().await?;
    let total = found.len();

    let matches = found
        .into_iter()
        .filter(|found| predicate.matches(&found.reference))
        .collect::<Vec<_>>();
    info!(
        %predicate,
        "matched {} of {total}",
        pluralize("reference", matches.len() as isize, true)
    );

    if opts.json {
        let listing = matches.iter().map(Match::from).collect::<Vec<_>>();
        let rendered = serde_json::to_string_pretty(&listing).context("render matches")?;
        println!("{rendered}");
    } else {
        matches
            .iter()
            .map(|found| found.reference.original())
            .for_each(|original| println!("{original}"));
    }

    Ok(ExitCode::SUCCESS)
}

/// A matching reference as rendered in JSON output.
#[derive(Debug, Serialize)]
struct Match<'a> {
    /// The line on which the reference's instruction starts.
    line: usize,

    #[serde(flatten)]
    reference: &'a Reference,
}

impl<'a> From<&'a Found> for Match<'a> {
    fn from(found: &'a Found) -> Self {
        Self {
            line: found.line,
            reference: &found.reference,
        }
    }
}
