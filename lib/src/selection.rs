//! The options a user selects to filter references, and how they combine into a [`Predicate`].

use bon::Builder;
use derive_more::{Display, Error};
use itertools::Itertools;
use strum::{AsRefStr, EnumIter, IntoEnumIterator};
use tracing::debug;

use crate::Predicate;

/// A set of mutually exclusive predicate options.
///
/// At most one option in a group may be selected;
/// options from different groups are combined so that all must match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Group {
    /// Options testing the tag.
    Tag,

    /// Options testing the digest.
    Digest,

    /// Options testing the domain.
    Domain,

    /// Options testing the name.
    Name,
}

impl Group {
    /// The options in this group, in declaration order.
    pub fn options(self) -> impl Iterator<Item = PredicateOption> {
        PredicateOption::iter().filter(move |option| option.group() == self)
    }

    /// The command line flags of the options in this group, for help and error text.
    pub fn flags(self) -> String {
        self.options().map(PredicateOption::flag).join(", ")
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// A single option a user can select.
///
/// Declaration order is the order in which selected options become predicates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PredicateOption {
    Untagged,
    Latest,
    Outdated,
    Tags,
    Unpinned,
    Digests,
    Domains,
    Names,
}

impl PredicateOption {
    /// The group to which this option belongs.
    pub fn group(self) -> Group {
        match self {
            Self::Untagged | Self::Latest | Self::Outdated | Self::Tags => Group::Tag,
            Self::Unpinned | Self::Digests => Group::Digest,
            Self::Domains => Group::Domain,
            Self::Names => Group::Name,
        }
    }

    /// The command line flag for this option.
    pub fn flag(self) -> String {
        format!("--{}", self.as_ref())
    }
}

impl std::fmt::Display for PredicateOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// Errors in a [`Selection`].
///
/// These are configuration errors: they are reported before any input is read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, Error)]
pub enum SelectionError {
    /// More than one option of a group was selected.
    #[display("at most one {group} predicate may be selected (one of {})", group.flags())]
    AtMostOnePredicate { group: Group },

    /// The option is recognized but has no predicate.
    #[display("the {option} predicate is not supported")]
    Unsupported { option: PredicateOption },
}

/// Options in the [`Group::Tag`] group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct TagOptions {
    /// Select references without a tag.
    #[builder(default)]
    pub untagged: bool,

    /// Select references tagged `latest`.
    #[builder(default)]
    pub latest: bool,

    /// Select references with a newer tag available.
    ///
    /// This needs registry access, so selecting it is an error.
    #[builder(default)]
    pub outdated: bool,

    /// Select references with any of these tags.
    #[builder(default)]
    pub tags: Vec<String>,
}

/// Options in the [`Group::Digest`] group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct DigestOptions {
    /// Select references not pinned to a digest.
    #[builder(default)]
    pub unpinned: bool,

    /// Select references pinned to any of these digests.
    #[builder(default)]
    pub digests: Vec<String>,
}

/// Options in the [`Group::Domain`] group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct DomainOptions {
    /// Select references hosted on any of these domains.
    #[builder(default)]
    pub domains: Vec<String>,
}

/// Options in the [`Group::Name`] group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct NameOptions {
    /// Select references with any of these fully qualified names.
    #[builder(default)]
    pub names: Vec<String>,
}

/// Every option a user can select, grouped by [`Group`].
///
/// An empty selection matches every reference.
///
/// ```
/// # use dockmoor_lib::{Predicate, Selection, TagOptions, DigestOptions};
/// let selection = Selection::builder()
///     .tag(TagOptions::builder().latest(true).build())
///     .digest(DigestOptions::builder().unpinned(true).build())
///     .build();
///
/// let predicate = selection.predicate().expect("valid selection");
/// assert_eq!(predicate, Predicate::And(vec![Predicate::Latest, Predicate::Unpinned]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct Selection {
    #[builder(default)]
    pub tag: TagOptions,

    #[builder(default)]
    pub digest: DigestOptions,

    #[builder(default)]
    pub domain: DomainOptions,

    #[builder(default)]
    pub name: NameOptions,
}

impl Selection {
    /// Whether the option is selected: flags are set when true, lists when non-empty.
    pub fn is_set(&self, option: PredicateOption) -> bool {
        match option {
            PredicateOption::Untagged => self.tag.untagged,
            PredicateOption::Latest => self.tag.latest,
            PredicateOption::Outdated => self.tag.outdated,
            PredicateOption::Tags => !self.tag.tags.is_empty(),
            PredicateOption::Unpinned => self.digest.unpinned,
            PredicateOption::Digests => !self.digest.digests.is_empty(),
            PredicateOption::Domains => !self.domain.domains.is_empty(),
            PredicateOption::Names => !self.name.names.is_empty(),
        }
    }

    /// The selected options, in declaration order.
    pub fn active(&self) -> Vec<PredicateOption> {
        PredicateOption::iter()
            .filter(|option| self.is_set(*option))
            .collect()
    }

    /// Ensure no group has more than one option selected.
    pub fn validate(&self) -> Result<(), SelectionError> {
        for group in Group::iter() {
            let selected = group.options().filter(|option| self.is_set(*option));
            if selected.count() > 1 {
                return Err(SelectionError::AtMostOnePredicate { group });
            }
        }
        Ok(())
    }

    /// Validate the selection and combine the selected options into a single predicate.
    ///
    /// Predicates appear in the declaration order of their options.
    #[tracing::instrument]
    pub fn predicate(&self) -> Result<Predicate, SelectionError> {
        self.validate()?;

        let predicates = self
            .active()
            .into_iter()
            .map(|option| self.leaf(option))
            .collect::<Result<Vec<_>, _>>()?;

        let predicate = Predicate::all(predicates);
        debug!(%predicate, "built predicate");
        Ok(predicate)
    }

    fn leaf(&self, option: PredicateOption) -> Result<Predicate, SelectionError> {
        match option {
            PredicateOption::Untagged => Ok(Predicate::Untagged),
            PredicateOption::Latest => Ok(Predicate::Latest),
            PredicateOption::Outdated => Err(SelectionError::Unsupported { option }),
            PredicateOption::Tags => Ok(Predicate::tags(&self.tag.tags)),
            PredicateOption::Unpinned => Ok(Predicate::Unpinned),
            PredicateOption::Digests => Ok(Predicate::digests(&self.digest.digests)),
            PredicateOption::Domains => Ok(Predicate::domains(&self.domain.domains)),
            PredicateOption::Names => Ok(Predicate::names(&self.name.names)),
        }
    }
}
