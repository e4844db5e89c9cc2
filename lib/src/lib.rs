//! Core library for `dockmoor`, a tool for finding and classifying container image references.
//!
//! The two entry points are [`Reference::parse`], which turns a raw reference into a normalized value,
//! and [`Selection::predicate`], which turns a set of user-selected options into a [`Predicate`]
//! that can be applied to any number of references.

use derive_more::{Display, Error};
use serde::{ser::SerializeStruct, Serialize, Serializer};
use std::str::FromStr;
use tap::Pipe;

pub mod grammar;
mod predicate;
mod selection;

pub use predicate::Predicate;
pub use selection::{
    DigestOptions, DomainOptions, Group, NameOptions, PredicateOption, Selection, SelectionError,
    TagOptions,
};

static_assertions::assert_impl_all!(Reference: Send, Sync);
static_assertions::assert_impl_all!(Digest: Send, Sync);

#[doc(hidden)]
pub mod __private {
    pub use hex_magic::hex;
    pub use static_assertions::const_assert_ne;
}

/// Create a [`Digest`] from a hex string at compile time.
/// ```
/// let digest = dockmoor_lib::digest!("sha256", "d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240");
/// assert_eq!(digest.algorithm, "sha256");
/// assert_eq!(digest.as_hex(), "d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240");
/// ```
///
/// If algorithm is not provided, it defaults to [`Digest::SHA256`].
/// ```
/// let digest = dockmoor_lib::digest!("d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240");
/// assert_eq!(digest.to_string(), "sha256:d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240");
/// ```
///
/// The size of the hash defaults to 32 bytes; provide it as a third argument for other algorithms.
/// Providing a value of a different length than the size results in a compile-time error.
/// ```compile_fail
/// let digest = dockmoor_lib::digest!("d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240deadbeef");
/// ```
#[macro_export]
macro_rules! digest {
    ($hex:expr) => {{
        $crate::digest!($crate::Digest::SHA256, $hex, 32)
    }};
    ($algorithm:expr, $hex:expr) => {{
        $crate::digest!($algorithm, $hex, 32)
    }};
    ($algorithm:expr, $hex:expr, $size:expr) => {{
        const HASH: [u8; $size] = $crate::__private::hex!($hex);
        $crate::__private::const_assert_ne!(HASH.len(), 0);
        $crate::__private::const_assert_ne!($algorithm.len(), 0);
        $crate::Digest {
            algorithm: $algorithm.to_string(),
            hash: HASH.to_vec(),
        }
    }};
}

/// A content-addressable digest in the format `algorithm:hex`.
///
/// Only registered algorithms are accepted, and the hex portion must be lowercase
/// and exactly as long as the algorithm's output.
///
/// ```
/// # use std::str::FromStr;
/// let digest = dockmoor_lib::Digest::from_str("sha256:d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240").expect("parse digest");
/// assert_eq!(digest.algorithm, "sha256");
/// assert_eq!(digest.as_hex(), "d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    /// The hashing algorithm used (e.g. "sha256")
    pub algorithm: String,

    /// The raw hash bytes
    pub hash: Vec<u8>,
}

impl Digest {
    /// The SHA256 algorithm
    pub const SHA256: &'static str = "sha256";

    /// The SHA384 algorithm
    pub const SHA384: &'static str = "sha384";

    /// The SHA512 algorithm
    pub const SHA512: &'static str = "sha512";

    /// Returns the hash as a hex string
    pub fn as_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    /// The number of hex characters a digest of the given algorithm carries,
    /// or `None` if the algorithm isn't registered.
    pub fn hex_len(algorithm: &str) -> Option<usize> {
        match algorithm {
            Self::SHA256 => Some(64),
            Self::SHA384 => Some(96),
            Self::SHA512 => Some(128),
            _ => None,
        }
    }
}

/// Errors encountered validating a [`Digest`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum DigestError {
    /// The digest isn't in the `algorithm:hex` shape.
    #[display("invalid digest format: {input:?}")]
    Format { input: String },

    /// The algorithm isn't one of the registered algorithms.
    #[display("unsupported digest algorithm: {algorithm:?}")]
    UnsupportedAlgorithm { algorithm: String },

    /// The hex portion has the wrong length for the algorithm.
    #[display("invalid {algorithm} digest length: expected {expected} hex characters, got {actual}")]
    Length {
        algorithm: String,
        expected: usize,
        actual: usize,
    },
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = || DigestError::Format {
            input: s.to_string(),
        };

        let (algorithm, hex) = s.split_once(':').ok_or_else(format)?;
        if algorithm.is_empty() || hex.is_empty() {
            return Err(format());
        }

        let expected = Self::hex_len(algorithm).ok_or_else(|| DigestError::UnsupportedAlgorithm {
            algorithm: algorithm.to_string(),
        })?;

        if !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(format());
        }
        if hex.len() != expected {
            return Err(DigestError::Length {
                algorithm: algorithm.to_string(),
                expected,
                actual: hex.len(),
            });
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            hash: hex::decode(hex).map_err(|_| format())?,
        })
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.as_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maximum length of a fully qualified repository name.
pub const NAME_TOTAL_LENGTH_MAX: usize = 255;

/// Errors encountered parsing a [`Reference`].
///
/// These are always recoverable: a scanner reports the offending input and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ReferenceFormatError {
    /// The input was empty.
    #[display("invalid reference format: reference is empty")]
    Empty,

    /// The input doesn't follow the reference grammar.
    #[display("invalid reference format: {input:?}")]
    Format { input: String },

    /// The text in the domain position isn't a valid registry host.
    #[display("invalid reference format: {domain:?} is not a valid registry host in {input:?}")]
    Domain { input: String, domain: String },

    /// The repository name contains uppercase characters.
    #[display("invalid reference format: repository name {repository:?} must be lowercase in {input:?}")]
    Uppercase { input: String, repository: String },

    /// The fully qualified name is longer than [`NAME_TOTAL_LENGTH_MAX`].
    #[display(
        "invalid reference format: repository name {name:?} must not be longer than {} characters",
        NAME_TOTAL_LENGTH_MAX
    )]
    NameTooLong { input: String, name: String },

    /// The digest portion of the reference is malformed.
    #[display("invalid reference format: invalid digest in {input:?}")]
    Digest { input: String, source: DigestError },
}

/// A parsed and normalized container image reference.
///
/// References are immutable once parsed.
/// The input text is kept verbatim in [`Reference::original`] so that callers
/// can locate exactly the substring that was parsed; every other field is normalized.
///
/// ```
/// # use dockmoor_lib::Reference;
/// let reference = Reference::parse("nginx:1.25").expect("parse reference");
/// assert_eq!(reference.original(), "nginx:1.25");
/// assert_eq!(reference.domain(), "docker.io");
/// assert_eq!(reference.path(), "library/nginx");
/// assert_eq!(reference.name(), "docker.io/library/nginx");
/// assert_eq!(reference.tag(), Some("1.25"));
/// assert_eq!(reference.digest(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    original: String,
    name: Option<Name>,
    tag: Option<String>,
    digest: Option<Digest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Name {
    domain: String,
    path: String,
    full: String,
}

impl Name {
    fn new(domain: &str, path: &str) -> Self {
        Self {
            domain: domain.to_string(),
            path: path.to_string(),
            full: format!("{domain}/{path}"),
        }
    }
}

impl Reference {
    /// The registry host used when a reference doesn't name one.
    pub const DEFAULT_DOMAIN: &'static str = "docker.io";

    /// Legacy spelling of the default registry host; normalized to [`Reference::DEFAULT_DOMAIN`].
    pub const LEGACY_DEFAULT_DOMAIN: &'static str = "index.docker.io";

    /// Namespace for single-segment repositories on the default registry.
    pub const OFFICIAL_NAMESPACE: &'static str = "library";

    /// The tag conventionally pointing at the most recent image.
    pub const LATEST: &'static str = "latest";

    /// Parse a reference in any of the forms a Dockerfile may contain:
    /// a name with optional tag and digest, a bare digest, or a bare 64 character sha256 hex identifier.
    ///
    /// ```
    /// # use dockmoor_lib::Reference;
    /// let reference = Reference::parse("d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240").expect("parse reference");
    /// assert_eq!(reference.name(), "");
    /// assert_eq!(reference.digest().map(|d| d.to_string()).as_deref(), Some("sha256:d21b79794850b4b15d8d332b451d95351d14c951542942a816eea69c9e04b240"));
    /// ```
    pub fn parse(original: &str) -> Result<Self, ReferenceFormatError> {
        if original.is_empty() {
            return Err(ReferenceFormatError::Empty);
        }

        // A bare identifier is shorthand for a sha256 digest.
        if grammar::is_identifier(original) {
            let digest = format!("{}:{original}", Digest::SHA256)
                .parse::<Digest>()
                .map_err(|source| ReferenceFormatError::Digest {
                    input: original.to_string(),
                    source,
                })?;
            return Ok(Self::unnamed(original, digest));
        }

        if let Ok(digest) = Digest::from_str(original) {
            return Ok(Self::unnamed(original, digest));
        }

        Self::parse_named(original)
    }

    fn unnamed(original: &str, digest: Digest) -> Self {
        Self {
            original: original.to_string(),
            name: None,
            tag: None,
            digest: Some(digest),
        }
    }

    fn parse_named(original: &str) -> Result<Self, ReferenceFormatError> {
        let (domain, remainder) = split_domain(original);

        let repository = remainder
            .split([':', '@'])
            .next()
            .unwrap_or(remainder.as_str());
        if repository.to_lowercase() != repository {
            return Err(ReferenceFormatError::Uppercase {
                input: original.to_string(),
                repository: repository.to_string(),
            });
        }

        let normalized = format!("{domain}/{remainder}");
        let components =
            grammar::parse(&normalized).ok_or_else(|| ReferenceFormatError::Format {
                input: original.to_string(),
            })?;

        // The grammar reads a syntactically invalid host as part of the path;
        // since a domain was always prepended this means the host itself is invalid.
        if components.domain != Some(domain) {
            return Err(ReferenceFormatError::Domain {
                input: original.to_string(),
                domain: domain.to_string(),
            });
        }

        let name = Name::new(domain, components.path);
        if name.full.len() > NAME_TOTAL_LENGTH_MAX {
            return Err(ReferenceFormatError::NameTooLong {
                input: original.to_string(),
                name: name.full,
            });
        }

        let digest = components
            .digest
            .map(Digest::from_str)
            .transpose()
            .map_err(|source| ReferenceFormatError::Digest {
                input: original.to_string(),
                source,
            })?;

        Self {
            original: original.to_string(),
            name: Some(name),
            tag: components.tag.map(String::from),
            digest,
        }
        .pipe(Ok)
    }

    /// The exact text this reference was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The registry host, or an empty string if the reference is only a digest.
    pub fn domain(&self) -> &str {
        self.name.as_ref().map_or("", |name| name.domain.as_str())
    }

    /// The repository path below the domain, or an empty string if the reference is only a digest.
    pub fn path(&self) -> &str {
        self.name.as_ref().map_or("", |name| name.path.as_str())
    }

    /// The fully qualified repository name (`domain/path`),
    /// or an empty string if the reference is only a digest.
    pub fn name(&self) -> &str {
        self.name.as_ref().map_or("", |name| name.full.as_str())
    }

    /// The shortest name that refers to the same repository.
    ///
    /// ```
    /// # use dockmoor_lib::Reference;
    /// let reference = Reference::parse("docker.io/library/nginx:latest").expect("parse reference");
    /// assert_eq!(reference.familiar_name(), "nginx");
    /// ```
    pub fn familiar_name(&self) -> &str {
        let Some(name) = &self.name else {
            return "";
        };
        if name.domain != Self::DEFAULT_DOMAIN {
            return &name.full;
        }

        let official = name
            .path
            .strip_prefix(Self::OFFICIAL_NAMESPACE)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.contains('/'));
        official.unwrap_or(&name.path)
    }

    /// The tag, if one was given.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The digest, if one was given.
    pub fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }

    /// Whether the reference names a repository.
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// Whether the reference carries a tag.
    pub fn has_tag(&self) -> bool {
        self.tag.is_some()
    }

    /// Whether the reference is pinned to a digest.
    pub fn has_digest(&self) -> bool {
        self.digest.is_some()
    }

    /// Whether the reference is explicitly tagged [`Reference::LATEST`].
    ///
    /// A reference without a tag is not considered latest here,
    /// even though registries resolve it to that tag.
    pub fn is_latest(&self) -> bool {
        self.tag() == Some(Self::LATEST)
    }
}

/// Split the registry host from the rest of the reference,
/// applying the default domain and namespace rules.
fn split_domain(input: &str) -> (&str, String) {
    let (domain, remainder) = match input.split_once('/') {
        Some((first, rest)) if first.contains(['.', ':']) || first == "localhost" => (first, rest),
        _ => (Reference::DEFAULT_DOMAIN, input),
    };

    let domain = if domain == Reference::LEGACY_DEFAULT_DOMAIN {
        Reference::DEFAULT_DOMAIN
    } else {
        domain
    };

    if domain == Reference::DEFAULT_DOMAIN && !remainder.contains('/') {
        (domain, format!("{}/{remainder}", Reference::OFFICIAL_NAMESPACE))
    } else {
        (domain, remainder.to_string())
    }
}

impl FromStr for Reference {
    type Err = ReferenceFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders the normalized form of the reference, not the original text.
impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.name, &self.tag, &self.digest) {
            (None, _, Some(digest)) => write!(f, "{digest}"),
            (name, tag, digest) => {
                if let Some(name) = name {
                    write!(f, "{}", name.full)?;
                }
                if let Some(tag) = tag {
                    write!(f, ":{tag}")?;
                }
                if let Some(digest) = digest {
                    write!(f, "@{digest}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Reference", 6)?;
        state.serialize_field("original", self.original())?;
        state.serialize_field("domain", self.domain())?;
        state.serialize_field("path", self.path())?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("tag", &self.tag)?;
        state.serialize_field("digest", &self.digest)?;
        state.end()
    }
}
