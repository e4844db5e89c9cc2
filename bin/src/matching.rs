use std::path::PathBuf;

use clap::Args;
use color_eyre::{
    eyre::{Context, Report, Result},
    Section, SectionExt,
};
use dockmoor_lib::{
    DigestOptions, DomainOptions, NameOptions, Predicate, PredicateOption, Selection,
    SelectionError, TagOptions,
};
use tracing::debug;

use crate::dockerfile::{self, Found};

/// Suggested fix when more than one predicate of a group is selected.
const CONFLICT_SUGGESTION: &str =
    "use at most one predicate per group; see `--help` for the groups";

/// The Dockerfile being read.
#[derive(Debug, Args)]
pub struct Target {
    /// Dockerfile from which image references are read
    pub input: PathBuf,
}

impl Target {
    /// Read the image references in the target.
    #[tracing::instrument]
    pub async fn references(&self) -> Result<Vec<Found>> {
        let input_section = || self.input.display().to_string().header("Input:");
        let content = tokio::fs::read_to_string(&self.input)
            .await
            .context("read input")
            .with_section(input_section)?;

        let found = dockerfile::references(&content).with_section(input_section)?;
        debug!(count = found.len(), "scanned input");
        Ok(found)
    }
}

/// Predicates selecting image references.
///
/// Within each heading at most one predicate may be used;
/// predicates under different headings are combined and must all match.
#[derive(Debug, Args)]
pub struct Predicates {
    #[command(flatten)]
    tag: TagArgs,

    #[command(flatten)]
    digest: DigestArgs,

    #[command(flatten)]
    domain: DomainArgs,

    #[command(flatten)]
    name: NameArgs,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Tag predicates (at most one)")]
struct TagArgs {
    /// Select image references without a tag
    #[arg(long)]
    untagged: bool,

    /// Select image references tagged `latest`
    #[arg(long)]
    latest: bool,

    /// Select image references for which a newer tag is available
    #[arg(long, hide = true)]
    outdated: bool,

    /// Select image references with any of these tags
    #[arg(long, value_name = "TAG", value_delimiter = ',')]
    tags: Vec<String>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Digest predicates (at most one)")]
struct DigestArgs {
    /// Select image references not pinned to a digest
    #[arg(long)]
    unpinned: bool,

    /// Select image references pinned to any of these digests (e.g. sha256:abc...)
    #[arg(long, value_name = "DIGEST", value_delimiter = ',')]
    digests: Vec<String>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Domain predicates")]
struct DomainArgs {
    /// Select image references hosted on any of these domains (e.g. docker.io)
    #[arg(long, value_name = "DOMAIN", value_delimiter = ',')]
    domains: Vec<String>,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Name predicates")]
struct NameArgs {
    /// Select image references with any of these fully qualified names (e.g. docker.io/library/nginx)
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    names: Vec<String>,
}

impl Predicates {
    /// The selection these arguments describe.
    pub fn selection(self) -> Selection {
        Selection::builder()
            .tag(
                TagOptions::builder()
                    .untagged(self.tag.untagged)
                    .latest(self.tag.latest)
                    .outdated(self.tag.outdated)
                    .tags(self.tag.tags)
                    .build(),
            )
            .digest(
                DigestOptions::builder()
                    .unpinned(self.digest.unpinned)
                    .digests(self.digest.digests)
                    .build(),
            )
            .domain(DomainOptions::builder().domains(self.domain.domains).build())
            .name(NameOptions::builder().names(self.name.names).build())
            .build()
    }

    /// Validate the selected predicates and combine them.
    pub fn predicate(self) -> Result<Predicate> {
        let selection = self.selection();
        let selected = selection
            .active()
            .into_iter()
            .map(PredicateOption::flag)
            .collect::<Vec<_>>()
            .join(" ");

        selection.predicate().map_err(|err| {
            let conflict = matches!(err, SelectionError::AtMostOnePredicate { .. });
            let report = Report::new(err)
                .wrap_err("select predicates")
                .section(selected.header("Selected:"));
            if conflict {
                report.suggestion(CONFLICT_SUGGESTION)
            } else {
                report
            }
        })
    }
}
