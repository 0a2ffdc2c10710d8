use std::{fmt, str::FromStr};

use crate::{
    digest::{ContentDigest, Digest},
    error::{ErrorKind, ParseError, Reason, ResultExt},
    grammar, Options, Registry, Tag,
};

/// Namespace for single-component repositories in Docker Hub.
const DEFAULT_NAMESPACE: &str = "library";

/// A repository in a registry, like `gcr.io/crossplane/provider-gcp`.
///
/// Images in Docker Hub without a namespace get the `library` one, as
/// `docker pull` does:
///
/// ```
/// # use oci_name::*;
/// let repository = Repository::parse("debian", &Options::default()).unwrap();
/// assert_eq!(repository.registry().as_str(), "index.docker.io");
/// assert_eq!(repository.path(), "library/debian");
///
/// let repository = Repository::parse("gcr.io/distroless/static", &Options::default()).unwrap();
/// assert_eq!(repository.registry().as_str(), "gcr.io");
/// assert_eq!(repository.path(), "distroless/static");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Repository {
    registry: Registry,
    path: String,
}

impl Repository {
    /// Parse a repository name, with an optional registry prefix.
    ///
    /// The first component is the registry if it contains a `.` or a `:`,
    /// or if it is `localhost`. Otherwise, the registry comes from the
    /// `options`.
    pub fn parse(name: &str, options: &Options) -> Result<Self, ParseError> {
        if name.is_empty() {
            return Err(ParseError::new(
                ErrorKind::InvalidRepository,
                name,
                Reason::Empty,
            ));
        }

        let (registry, path) = match name.split_once('/') {
            Some((registry, path)) if grammar::looks_like_registry(registry) => (registry, path),
            _ => ("", name),
        };

        let registry = Registry::parse(registry, options)?;

        for component in path.split('/') {
            grammar::check_path_component(component)
                .component(ErrorKind::InvalidRepository, component)?;
        }

        let path = if registry.is_docker_hub() && !path.contains('/') {
            if options.is_strict() {
                return Err(ParseError::new(
                    ErrorKind::InvalidReference,
                    path,
                    Reason::ImplicitNamespace,
                ));
            }

            format!("{DEFAULT_NAMESPACE}/{path}")
        } else {
            path.to_owned()
        };

        let repository = Repository { registry, path };

        if repository.name().len() > grammar::NAME_MAX_LENGTH {
            return Err(ParseError::new(
                ErrorKind::InvalidRepository,
                repository.path,
                Reason::TooLong(grammar::NAME_MAX_LENGTH),
            ));
        }

        Ok(repository)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Path of the repository in its registry, like `library/debian`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return the namespace of this repository, or `None` if the path
    /// has a single component.
    pub fn namespace(&self) -> Option<&str> {
        self.path.rsplit_once('/').map(|(ns, _)| ns)
    }

    /// Last component of the path.
    pub fn image_name(&self) -> &str {
        self.path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.path)
    }

    /// Full name, as `registry/path`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Scope to request a token for `action` (like `pull` or `push`)
    /// in this repository.
    pub fn scope(&self, action: &str) -> String {
        format!("repository:{}:{action}", self.path)
    }

    /// Build a [`Tag`] in this repository.
    ///
    /// ```
    /// # use oci_name::*;
    /// let repository = Repository::parse("gcr.io/foo/bar", &Options::default()).unwrap();
    /// assert_eq!(repository.tag("v1").unwrap().name(), "gcr.io/foo/bar:v1");
    /// assert!(repository.tag("not valid").is_err());
    /// ```
    pub fn tag(&self, tag: &str) -> Result<Tag, ParseError> {
        grammar::check_tag(tag).component(ErrorKind::InvalidTag, tag)?;
        Ok(Tag::from_parts(self.clone(), tag.to_owned()))
    }

    /// Build a [`Digest`] in this repository.
    pub fn digest(&self, digest: &str) -> Result<Digest, ParseError> {
        let digest = ContentDigest::parse(digest)?;
        Ok(Digest::from_parts(self.clone(), digest))
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry, self.path)
    }
}

impl FromStr for Repository {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Repository::parse(s, &Options::default())
    }
}

#[test]
fn parse_valid_repositories() {
    macro_rules! check {
        ($name:expr, [ $registry:expr, $path:expr ]) => {
            let repository = Repository::parse($name, &Options::default()).unwrap();
            assert_eq!(repository.registry().as_str(), $registry);
            assert_eq!(repository.path(), $path);
        };
    }

    check!("foo", ["index.docker.io", "library/foo"]);
    check!("foo/bar", ["index.docker.io", "foo/bar"]);
    check!("docker.io/foo", ["index.docker.io", "library/foo"]);
    check!("localhost/foo", ["localhost", "foo"]);
    check!("localhost:5000/foo/bar", ["localhost:5000", "foo/bar"]);
    check!("example.com:5678/foo/bar/baz", ["example.com:5678", "foo/bar/baz"]);
    check!("[::1]:5000/foo", ["[::1]:5000", "foo"]);
    check!("gcr.io/google.com/project-id/hello-world", ["gcr.io", "google.com/project-id/hello-world"]);
}

#[test]
fn repository_components() {
    let repository = Repository::parse("gcr.io/a/b/c", &Options::default()).unwrap();
    assert_eq!(repository.namespace(), Some("a/b"));
    assert_eq!(repository.image_name(), "c");
    assert_eq!(repository.name(), "gcr.io/a/b/c");
    assert_eq!(repository.scope("pull"), "repository:a/b/c:pull");

    let repository = Repository::parse("gcr.io/single", &Options::default()).unwrap();
    assert_eq!(repository.namespace(), None);
    assert_eq!(repository.image_name(), "single");
}

#[test]
fn reject_invalid_repositories() {
    let options = Options::default();

    macro_rules! check {
        ($name:expr, $kind:expr, $input:expr, $reason:expr) => {
            let err = Repository::parse($name, &options).unwrap_err();
            assert_eq!(err.kind(), $kind, "{}", $name);
            assert_eq!(err.input(), $input, "{}", $name);
            assert_eq!(err.reason(), $reason, "{}", $name);
        };
    }

    check!("", ErrorKind::InvalidRepository, "", Reason::Empty);
    check!("gcr.io/", ErrorKind::InvalidRepository, "", Reason::Empty);
    check!("foo//bar", ErrorKind::InvalidRepository, "", Reason::Empty);
    check!("gcr.io/Foo", ErrorKind::InvalidRepository, "Foo", Reason::IllegalCharacter('F'));
    check!("foo/bar..baz", ErrorKind::InvalidRepository, "bar..baz", Reason::MisplacedSeparator);
    check!("bad_host:x/foo", ErrorKind::InvalidRegistry, "bad_host:x", Reason::IllegalCharacter('_'));

    // Registry errors shadow repository errors.
    check!("gcr..io/Foo", ErrorKind::InvalidRegistry, "gcr..io", Reason::MisplacedSeparator);

    let long = format!("gcr.io/{}", "a".repeat(255 - "gcr.io/".len()));
    assert!(Repository::parse(&long, &options).is_ok());

    let long = format!("{long}b");
    check!(&long, ErrorKind::InvalidRepository, &long["gcr.io/".len()..], Reason::TooLong(255));
}

#[test]
fn strict_repositories() {
    let options = Options::new().strict();

    assert!(Repository::parse("gcr.io/foo", &options).is_ok());
    assert!(Repository::parse("index.docker.io/library/foo", &options).is_ok());

    let err = Repository::parse("foo/bar", &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidReference);
    assert_eq!(err.reason(), Reason::MissingRegistry);

    let err = Repository::parse("index.docker.io/foo", &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidReference);
    assert_eq!(err.reason(), Reason::ImplicitNamespace);
}
