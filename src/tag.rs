use std::{fmt, str::FromStr};

use crate::{
    error::{ErrorKind, ParseError, Reason, ResultExt},
    grammar, Options, Repository,
};

/// Reference to an image by its tag, like `gcr.io/crossplane/provider-gcp:v0.14.0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    repository: Repository,
    tag: String,
}

impl Tag {
    /// Parse a reference with an optional tag.
    ///
    /// With weak validation, a missing (or empty) tag is replaced by the
    /// default tag in `options`. Strict validation requires it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oci_name::*;
    /// let tag = Tag::parse("localhost:5000/foo/bar", &Options::default()).unwrap();
    /// assert_eq!(tag.context().registry().as_str(), "localhost:5000");
    /// assert_eq!(tag.identifier(), "latest");
    ///
    /// let tag = Tag::parse("debian:stable", &Options::default()).unwrap();
    /// assert_eq!(tag.name(), "index.docker.io/library/debian:stable");
    /// ```
    pub fn parse(name: &str, options: &Options) -> Result<Self, ParseError> {
        let (base, tag) = split_tag(name);

        let repository = Repository::parse(base, options)?;

        let tag = match tag {
            Some(tag) if !tag.is_empty() => tag,

            _ if options.is_strict() => {
                return Err(ParseError::new(
                    ErrorKind::InvalidReference,
                    name,
                    Reason::MissingTag,
                ))
            }

            _ => {
                tracing::trace!("Using default tag {}", options.default_tag);
                options.default_tag.as_str()
            }
        };

        grammar::check_tag(tag).component(ErrorKind::InvalidTag, tag)?;

        Ok(Tag {
            repository,
            tag: tag.to_owned(),
        })
    }

    pub(crate) fn from_parts(repository: Repository, tag: String) -> Self {
        Tag { repository, tag }
    }

    pub fn context(&self) -> &Repository {
        &self.repository
    }

    /// Tag name, like `latest`.
    pub fn identifier(&self) -> &str {
        &self.tag
    }

    /// Full name, as `registry/path:tag`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn scope(&self, action: &str) -> String {
        self.repository.scope(action)
    }
}

/// Split the tag from a name, if any.
///
/// The last `:` is a tag separator only if no `/` follows it. In
/// `host:5000/repo` it belongs to the port of the registry.
pub(crate) fn split_tag(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once(':') {
        Some((base, tag)) if !tag.contains('/') => (base, Some(tag)),
        _ => (name, None),
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

impl FromStr for Tag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::parse(s, &Options::default())
    }
}

#[test]
fn split_tags() {
    assert_eq!(split_tag("foo"), ("foo", None));
    assert_eq!(split_tag("foo:bar"), ("foo", Some("bar")));
    assert_eq!(split_tag("foo:"), ("foo", Some("")));
    assert_eq!(split_tag("host:5000/foo"), ("host:5000/foo", None));
    assert_eq!(split_tag("host:5000/foo:v1"), ("host:5000/foo", Some("v1")));
    assert_eq!(split_tag("localhost:5000"), ("localhost", Some("5000")));
}

#[test]
fn parse_tags() {
    let options = Options::new().default_registry("registry.upbound.io").default_tag("stable");

    macro_rules! check {
        ($name:expr, $expected:expr) => {
            assert_eq!(Tag::parse($name, &options).unwrap().name(), $expected);
        };
    }

    check!("crossplane/provider-gcp", "registry.upbound.io/crossplane/provider-gcp:stable");
    check!("crossplane/provider-gcp:v0.14.0", "registry.upbound.io/crossplane/provider-gcp:v0.14.0");
    check!("ubuntu", "registry.upbound.io/ubuntu:stable");
    check!("ubuntu:", "registry.upbound.io/ubuntu:stable");
    check!("gcr.io/crossplane/provider-gcp:latest", "gcr.io/crossplane/provider-gcp:latest");
    check!("www.example.test:12345/repo/path", "www.example.test:12345/repo/path:stable");

    // Without a path, the port is a tag.
    check!("localhost:5000", "registry.upbound.io/localhost:5000");
}

#[test]
fn reject_invalid_tags() {
    let options = Options::default();

    macro_rules! check {
        ($name:expr, $kind:expr, $reason:expr) => {
            let err = Tag::parse($name, &options).unwrap_err();
            assert_eq!(err.kind(), $kind, "{}", $name);
            assert_eq!(err.reason(), $reason, "{}", $name);
        };
    }

    check!("gcr.io/project-id/wrong-length:white space", ErrorKind::InvalidTag, Reason::IllegalCharacter(' '));
    check!("gcr.io/project-id/dot:.hidden", ErrorKind::InvalidTag, Reason::MisplacedSeparator);
    check!(&format!("gcr.io/project-id/too-many-chars:{}", "a".repeat(129)), ErrorKind::InvalidTag, Reason::TooLong(128));

    // Repository errors shadow tag errors.
    check!("gcr.io/Project:white space", ErrorKind::InvalidRepository, Reason::IllegalCharacter('P'));

    // The default tag is validated when it is used.
    let err = Tag::parse("ubuntu", &Options::new().default_tag("not valid")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTag);
    assert_eq!(err.input(), "not valid");
}

#[test]
fn strict_tags() {
    let options = Options::new().strict();

    assert!(Tag::parse("gcr.io/project-id/with-nums:v2", &options).is_ok());
    assert!(Tag::parse("domain.with.port:9001/image:latest", &options).is_ok());

    for name in ["gcr.io/project-id/implicit-latest", "gcr.io/project-id/empty:"] {
        let err = Tag::parse(name, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
        assert_eq!(err.reason(), Reason::MissingTag);
    }

    let err = Tag::parse("project-id/image:v1", &options).unwrap_err();
    assert_eq!(err.reason(), Reason::MissingRegistry);
}
