//! Locates image references in Dockerfiles.

use color_eyre::eyre::{bail, Result};
use derive_more::Debug;
use dockmoor_lib::Reference;
use tracing::{debug, warn};

/// An image reference found in a Dockerfile.
#[derive(Debug, Clone)]
#[debug("{reference} (line {line})")]
pub struct Found {
    /// The line on which the instruction containing the reference starts, counting from 1.
    pub line: usize,

    /// The parsed reference.
    pub reference: Reference,
}

/// Stage that starts from no image at all.
const SCRATCH: &str = "scratch";

/// Find the image references in the `FROM` instructions of a Dockerfile.
///
/// Build stages that start from an earlier stage, `scratch`, or an image named by a build argument
/// are skipped, as are references that don't parse; skipped references are logged.
/// Content without any `FROM` instruction is an error.
#[tracing::instrument(skip(content))]
pub fn references(content: &str) -> Result<Vec<Found>> {
    let mut stages = Vec::new();
    let mut found = Vec::new();
    let mut instructions = 0usize;

    for (line, instruction) in instructions_of(content) {
        let mut words = instruction.split_whitespace();
        match words.next() {
            Some(keyword) if keyword.eq_ignore_ascii_case("FROM") => instructions += 1,
            _ => continue,
        }

        // Flags such as `--platform=linux/amd64` precede the image.
        let mut words = words.skip_while(|word| word.starts_with("--"));
        let Some(image) = words.next() else {
            warn!(line, "skipping FROM instruction without an image");
            continue;
        };

        // Stage names are case insensitive, and only earlier stages can be referenced.
        let is_stage = stages.contains(&image.to_lowercase());
        if let (Some(keyword), Some(stage)) = (words.next(), words.next()) {
            if keyword.eq_ignore_ascii_case("AS") {
                stages.push(stage.to_lowercase());
            }
        }

        if image.eq_ignore_ascii_case(SCRATCH) {
            debug!(line, "skipping scratch stage");
            continue;
        }
        if is_stage {
            debug!(line, image, "skipping reference to build stage");
            continue;
        }
        if image.contains('$') {
            warn!(line, image, "skipping image named by a build argument");
            continue;
        }

        match Reference::parse(image) {
            Ok(reference) => found.push(Found { line, reference }),
            Err(err) => warn!(line, image, %err, "skipping invalid image reference"),
        }
    }

    if instructions == 0 {
        bail!("input is not a Dockerfile: no FROM instruction found");
    }
    Ok(found)
}

/// Join continued lines into whole instructions, dropping comments and blank lines.
/// Each instruction is paired with the line on which it starts, counting from 1.
fn instructions_of(content: &str) -> Vec<(usize, String)> {
    let mut instructions = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (text, line) in content.lines().zip(1usize..) {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (body, continued) = match trimmed.strip_suffix('\\') {
            Some(body) => (body.trim_end(), true),
            None => (trimmed, false),
        };

        let (start, mut instruction) = current.take().unwrap_or((line, String::new()));
        if !instruction.is_empty() && !body.is_empty() {
            instruction.push(' ');
        }
        instruction.push_str(body);

        if continued {
            current = Some((start, instruction));
        } else {
            instructions.push((start, instruction));
        }
    }

    // A trailing continuation still ends the instruction.
    if let Some(pending) = current {
        instructions.push(pending);
    }
    instructions
}
