//! Low level syntax of image references.
//!
//! This module only answers "does this text follow the grammar, and where are its parts";
//! defaulting and normalization live with [`crate::Reference`].
//!
//! The grammar follows the Docker distribution reference format:
//!
//! ```text
//! reference       := name [ ":" tag ] [ "@" digest ]
//! name            := [domain '/'] path-component ['/' path-component]*
//! domain          := host [':' port-number]
//! host            := domain-name | '[' ipv6 ']'
//! domain-name     := domain-component ['.' domain-component]*
//! domain-component:= /([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])/
//! path-component  := alpha-numeric [separator alpha-numeric]*
//! alpha-numeric   := /[a-z0-9]+/
//! separator       := /[_.]|__|[-]+/
//! tag             := /[\w][\w.-]{0,127}/
//! digest          := algorithm ":" hex
//! algorithm       := /[A-Za-z][A-Za-z0-9]*([-_+.][A-Za-z][A-Za-z0-9]*)*/
//! hex             := /[0-9a-fA-F]{32,}/
//! ```

use std::sync::LazyLock;

use regex::Regex;

const ALPHA_NUMERIC: &str = "[a-z0-9]+";
const SEPARATOR: &str = "(?:[._]|__|[-]+)";
const DOMAIN_COMPONENT: &str = "(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])";
const IPV6: &str = r"\[(?:[a-fA-F0-9:]+)\]";
const PORT: &str = "[0-9]+";
const TAG: &str = "[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}";
const DIGEST: &str = "[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*:[0-9a-fA-F]{32,}";

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let path_component = format!("{ALPHA_NUMERIC}(?:{SEPARATOR}{ALPHA_NUMERIC})*");
    let domain_name = format!("{DOMAIN_COMPONENT}(?:\\.{DOMAIN_COMPONENT})*");
    let domain = format!("(?:{domain_name}|{IPV6})(?::{PORT})?");
    let pattern = format!(
        "^(?:(?P<domain>{domain})/)?(?P<path>{path_component}(?:/{path_component})*)(?::(?P<tag>{TAG}))?(?:@(?P<digest>{DIGEST}))?$"
    );
    Regex::new(&pattern).expect("reference grammar is valid")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-f0-9]{64}$").expect("identifier grammar is valid"));

/// The parts of a reference that follows the grammar.
///
/// When the first path segment is also a syntactically valid host it is reported as the domain;
/// deciding whether it really is one is a normalization concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Components<'a> {
    pub domain: Option<&'a str>,
    pub path: &'a str,
    pub tag: Option<&'a str>,
    pub digest: Option<&'a str>,
}

/// Split a reference into its parts, or `None` if it doesn't follow the grammar.
///
/// The digest is only checked for shape here; see [`crate::Digest`] for algorithm validation.
pub fn parse(input: &str) -> Option<Components<'_>> {
    let captures = REFERENCE.captures(input)?;
    let path = captures.name("path")?.as_str();
    Some(Components {
        domain: captures.name("domain").map(|m| m.as_str()),
        path,
        tag: captures.name("tag").map(|m| m.as_str()),
        digest: captures.name("digest").map(|m| m.as_str()),
    })
}

/// Whether the input is a bare 64 character hex identifier, i.e. a sha256 digest without its algorithm.
pub fn is_identifier(input: &str) -> bool {
    IDENTIFIER.is_match(input)
}
