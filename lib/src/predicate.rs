//! Predicates classify references.

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::Reference;

static_assertions::assert_impl_all!(Predicate: Send, Sync);

/// A boolean classifier over a [`Reference`].
///
/// Leaf predicates test a single field of the reference against its normalized value;
/// they never re-derive defaults. For example, [`Predicate::Latest`] only matches references
/// that were explicitly tagged `latest`, while a reference without a tag matches [`Predicate::Untagged`].
///
/// ```
/// # use dockmoor_lib::{Predicate, Reference};
/// let nginx = Reference::parse("nginx:latest").expect("parse reference");
/// assert!(Predicate::Latest.matches(&nginx));
/// assert!(Predicate::Unpinned.matches(&nginx));
/// assert!(!Predicate::Untagged.matches(&nginx));
///
/// let both = Predicate::all(vec![Predicate::Latest, Predicate::Unpinned]);
/// assert!(both.matches(&nginx));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every reference.
    Any,

    /// Matches references without a tag, whether or not they have a digest.
    Untagged,

    /// Matches references whose tag is exactly `latest`.
    Latest,

    /// Matches references whose tag is one of the given tags.
    Tags(BTreeSet<String>),

    /// Matches references that aren't pinned to a digest.
    Unpinned,

    /// Matches references whose digest (as `algorithm:hex`) is one of the given digests.
    Digests(BTreeSet<String>),

    /// Matches references whose normalized domain is one of the given domains.
    Domains(BTreeSet<String>),

    /// Matches references whose fully qualified name is one of the given names.
    Names(BTreeSet<String>),

    /// Matches references that all child predicates match.
    ///
    /// Children are evaluated in order and evaluation stops at the first that doesn't match.
    And(Vec<Predicate>),
}

impl Predicate {
    /// Create a [`Predicate::Tags`] instance.
    pub fn tags(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Tags(collect(tags))
    }

    /// Create a [`Predicate::Digests`] instance.
    pub fn digests(digests: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Digests(collect(digests))
    }

    /// Create a [`Predicate::Domains`] instance.
    pub fn domains(domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Domains(collect(domains))
    }

    /// Create a [`Predicate::Names`] instance.
    pub fn names(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Names(collect(names))
    }

    /// Combine predicates so that all must match.
    ///
    /// No predicates means nothing is filtered, so this is [`Predicate::Any`];
    /// a single predicate is returned as-is.
    pub fn all(mut predicates: Vec<Predicate>) -> Self {
        match predicates.len() {
            0 => Self::Any,
            1 => predicates.remove(0),
            _ => Self::And(predicates),
        }
    }

    /// The children of a [`Predicate::And`]; empty for every other predicate.
    pub fn children(&self) -> &[Predicate] {
        match self {
            Self::And(children) => children,
            _ => &[],
        }
    }

    /// Whether the reference satisfies this predicate.
    pub fn matches(&self, reference: &Reference) -> bool {
        match self {
            Self::Any => true,
            Self::Untagged => !reference.has_tag(),
            Self::Latest => reference.is_latest(),
            Self::Tags(tags) => reference.tag().is_some_and(|tag| tags.contains(tag)),
            Self::Unpinned => !reference.has_digest(),
            Self::Digests(digests) => reference
                .digest()
                .is_some_and(|digest| digests.contains(&digest.to_string())),
            Self::Domains(domains) => reference.is_named() && domains.contains(reference.domain()),
            Self::Names(names) => reference.is_named() && names.contains(reference.name()),
            Self::And(children) => children.iter().all(|child| child.matches(reference)),
        }
    }
}

fn collect(values: impl IntoIterator<Item = impl Into<String>>) -> BTreeSet<String> {
    values.into_iter().map(Into::into).collect()
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Untagged => write!(f, "untagged"),
            Self::Latest => write!(f, "latest"),
            Self::Tags(tags) => write!(f, "tags({})", tags.iter().join(", ")),
            Self::Unpinned => write!(f, "unpinned"),
            Self::Digests(digests) => write!(f, "digests({})", digests.iter().join(", ")),
            Self::Domains(domains) => write!(f, "domains({})", domains.iter().join(", ")),
            Self::Names(names) => write!(f, "names({})", names.iter().join(", ")),
            Self::And(children) => write!(f, "and({})", children.iter().join(", ")),
        }
    }
}
