mod parser;

use std::{fmt, str::FromStr};

use crate::{Digest, Options, ParseError, Repository, Tag};

pub use parser::{must_parse_reference, parse_reference};

/// Reference to an image in an OCI registry, either by tag or by digest.
///
/// The parser tries to be close to what `docker pull` does:
///
/// * If the reference does not include the hostname of the registry, it
///   uses the default one (Docker Hub, unless [`Options::default_registry`]
///   is set). Single-component repositories in Docker Hub get the `library`
///   namespace. For example:
///
///   * `debian` is parsed as `index.docker.io/library/debian:latest`.
///   * `nixos/nix` is parsed as `index.docker.io/nixos/nix:latest`.
/// * The first component is a hostname if it contains a `.` or a `:`,
///   or if it is `localhost`.
/// * A tag is the value after the last `:`, if it is not followed by a
///   `/`. If no tag is given, it uses `latest`.
/// * A digest is the value after a `@`. Only SHA256 and SHA512 are
///   accepted.
///
/// With [strict validation](Options::strict) nothing is taken from the
/// defaults.
///
/// # Examples
///
/// ```
/// # use oci_name::*;
/// const HASH: &str = "deadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33f";
///
/// let reference = Reference::try_from(format!("registry.example.com/foo/bar@sha256:{HASH}").as_str()).unwrap();
/// assert!(matches!(reference, Reference::Digest(_)));
/// assert_eq!(reference.context().registry().as_str(), "registry.example.com");
/// assert_eq!(reference.context().path(), "foo/bar");
/// assert_eq!(reference.identifier(), format!("sha256:{HASH}"));
/// ```
///
/// ```
/// # use oci_name::*;
/// let reference: Reference = "debian:stable".parse().unwrap();
///
/// assert_eq!(reference.context().path(), "library/debian");
/// assert_eq!(reference.identifier(), "stable");
/// assert_eq!(reference.to_string(), "index.docker.io/library/debian:stable");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum Reference {
    Tag(Tag),
    Digest(Digest),
}

impl Reference {
    /// Parse a reference. See [`parse_reference`].
    pub fn parse(reference: &str, options: &Options) -> Result<Self, ParseError> {
        parse_reference(reference, options)
    }

    /// Repository of the image.
    pub fn context(&self) -> &Repository {
        match self {
            Reference::Tag(tag) => tag.context(),
            Reference::Digest(digest) => digest.context(),
        }
    }

    /// Tag name or digest string.
    pub fn identifier(&self) -> &str {
        match self {
            Reference::Tag(tag) => tag.identifier(),
            Reference::Digest(digest) => digest.identifier(),
        }
    }

    /// Canonical form of the reference, with every component.
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn scope(&self, action: &str) -> String {
        self.context().scope(action)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Tag(tag) => fmt::Display::fmt(tag, f),
            Reference::Digest(digest) => fmt::Display::fmt(digest, f),
        }
    }
}

impl From<Tag> for Reference {
    fn from(tag: Tag) -> Self {
        Reference::Tag(tag)
    }
}

impl From<Digest> for Reference {
    fn from(digest: Digest) -> Self {
        Reference::Digest(digest)
    }
}

impl TryFrom<&str> for Reference {
    type Error = ParseError;

    fn try_from(reference: &str) -> Result<Self, Self::Error> {
        parse_reference(reference, &Options::default())
    }
}

impl TryFrom<String> for Reference {
    type Error = ParseError;

    fn try_from(reference: String) -> Result<Self, Self::Error> {
        Reference::try_from(reference.as_str())
    }
}

impl FromStr for Reference {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reference::try_from(s)
    }
}

impl serde::Serialize for Reference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[test]
fn reference_in_json() {
    #[derive(serde::Deserialize, serde::Serialize, Debug)]
    struct Example {
        image: Reference,
    }

    let example: Example = serde_json::from_str(r#"{"image": "nixos/nix"}"#).unwrap();
    assert_eq!(example.image.name(), "index.docker.io/nixos/nix:latest");

    assert_eq!(
        serde_json::to_string(&example).unwrap(),
        r#"{"image":"index.docker.io/nixos/nix:latest"}"#
    );

    assert!(serde_json::from_str::<Example>(r#"{"image": "Bad/Name"}"#).is_err());
}

#[test]
fn accessors() {
    let reference = Reference::try_from("gcr.io/foo/bar:v1").unwrap();
    assert_eq!(reference.scope("pull"), "repository:foo/bar:pull");
    assert_eq!(reference.context().name(), "gcr.io/foo/bar");

    let tag: Tag = "gcr.io/foo/bar:v1".parse().unwrap();
    assert_eq!(Reference::from(tag), reference);
}
