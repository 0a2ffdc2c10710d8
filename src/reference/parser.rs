//! Select the parser for a reference, by tag or by digest.

use super::Reference;
use crate::{
    error::{ErrorKind, Reason},
    Digest, Options, ParseError, Tag,
};

/// Parse a reference to an image.
///
/// If `reference` contains a `@`, it is parsed as a [`Digest`]. Otherwise,
/// it is parsed as a [`Tag`]. The returned error is the first problem
/// found, checking the registry, then the repository, and then the tag or
/// the digest.
///
/// # Examples
///
/// ```
/// # use oci_name::*;
/// let options = Options::new()
///     .default_registry("registry.upbound.io")
///     .default_tag("stable");
///
/// let reference = parse_reference("ubuntu", &options).unwrap();
/// assert_eq!(reference.name(), "registry.upbound.io/ubuntu:stable");
///
/// let err = parse_reference("alpine@sha256:abc", &options).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::InvalidDigest);
/// ```
pub fn parse_reference(reference: &str, options: &Options) -> Result<Reference, ParseError> {
    let result = if reference.is_empty() {
        Err(ParseError::new(
            ErrorKind::InvalidReference,
            reference,
            Reason::Empty,
        ))
    } else if reference.contains('@') {
        Digest::parse(reference, options).map(Reference::Digest)
    } else {
        Tag::parse(reference, options).map(Reference::Tag)
    };

    if let Err(err) = &result {
        tracing::debug!("Rejected image reference {reference:?}: {err}");
    }

    result
}

/// Parse a reference to an image, and panic if it is not valid.
///
/// Use it only with values known to be valid, like constants.
///
/// ```
/// # use oci_name::*;
/// let reference = must_parse_reference("gcr.io/distroless/static:nonroot", &Options::default());
/// assert_eq!(reference.identifier(), "nonroot");
/// ```
///
/// ```should_panic
/// # use oci_name::*;
/// must_parse_reference("gcr.io/distroless/static:not valid", &Options::default());
/// ```
pub fn must_parse_reference(reference: &str, options: &Options) -> Reference {
    match parse_reference(reference, options) {
        Ok(reference) => reference,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const VALID_DIGEST: &str =
        "sha256:deadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33f";

    #[test]
    fn parse_valid_references() {
        macro_rules! check {
            ($reference:expr, $variant:ident, [ $registry:expr, $path:expr, $identifier:expr ]) => {
                let reference = parse_reference(&$reference, &Options::default()).unwrap();
                assert!(matches!(reference, Reference::$variant(_)), "{}", $reference);
                assert_eq!(reference.context().registry().as_str(), $registry);
                assert_eq!(reference.context().path(), $path);
                assert_eq!(reference.identifier(), $identifier);
            };
        }

        check!("foo", Tag, ["index.docker.io", "library/foo", "latest"]);
        check!("foo/bar", Tag, ["index.docker.io", "foo/bar", "latest"]);
        check!("example.com:5678/foo/bar:1.2.3", Tag, ["example.com:5678", "foo/bar", "1.2.3"]);
        check!(format!("example.com/foo/bar:1.2.3@{VALID_DIGEST}"), Digest, ["example.com", "foo/bar", VALID_DIGEST]);
        check!(format!("alpine@{VALID_DIGEST}"), Digest, ["index.docker.io", "library/alpine", VALID_DIGEST]);
    }

    #[test]
    fn errors_by_priority() {
        let options = Options::default();
        let kind = |reference: &str| parse_reference(reference, &options).unwrap_err().kind();

        assert_eq!(kind(""), ErrorKind::InvalidReference);
        assert_eq!(kind("gcr..io/Foo:bad tag"), ErrorKind::InvalidRegistry);
        assert_eq!(kind("gcr.io/Foo:bad tag"), ErrorKind::InvalidRepository);
        assert_eq!(kind("gcr.io/foo:bad tag"), ErrorKind::InvalidTag);
        assert_eq!(kind("gcr.io/Foo@sha256:abc"), ErrorKind::InvalidRepository);
        assert_eq!(kind("alpine@sha256:abc"), ErrorKind::InvalidDigest);
        assert_eq!(kind("alpine@md5:abc"), ErrorKind::InvalidDigest);
        assert_eq!(kind("a@b@c"), ErrorKind::InvalidReference);
    }

    #[test]
    fn strict_references() {
        let options = Options::new().strict();
        let reason = |reference: &str| parse_reference(reference, &options).unwrap_err().reason();

        assert_eq!(reason("ubuntu:22.04"), Reason::MissingRegistry);
        assert_eq!(reason(&format!("library/ubuntu@{VALID_DIGEST}")), Reason::MissingRegistry);
        assert_eq!(reason("gcr.io/foo/bar"), Reason::MissingTag);
        assert_eq!(reason("docker.io/ubuntu:22.04"), Reason::ImplicitNamespace);

        // A digest does not need a tag.
        assert!(parse_reference(&format!("gcr.io/foo/bar@{VALID_DIGEST}"), &options).is_ok());
    }

    #[test]
    fn default_registry_must_be_recognized() {
        // `myregistry/ubuntu` would be read back as a path in the default registry.
        let options = Options::new().default_registry("myregistry");
        let err = parse_reference("ubuntu", &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRegistry);
        assert_eq!(err.input(), "myregistry");
        assert_eq!(err.reason(), Reason::NotAHostname);

        for registry in ["localhost", "localhost:5000", "myregistry:5000", "[::1]:5000"] {
            let options = Options::new().default_registry(registry);
            let reference = parse_reference("ubuntu", &options).unwrap();
            assert_eq!(reference.name(), format!("{registry}/ubuntu:latest"));

            let reparsed = parse_reference(&reference.to_string(), &options).unwrap();
            assert_eq!(reparsed, reference);
            assert!(parse_reference(&reference.to_string(), &options.clone().strict()).is_ok());
        }
    }

    #[test]
    #[should_panic(expected = "Invalid digest `sha256:abc`")]
    fn must_parse_panics() {
        must_parse_reference("alpine@sha256:abc", &Options::default());
    }

    fn reference_strategy() -> impl Strategy<Value = String> {
        let registry = prop::option::of("[a-z]{1,8}\\.(io|com)(:[0-9]{2,4})?");
        let path = "[a-z0-9]{1,6}(-[a-z0-9]{1,6})?(/[a-z0-9]{1,6}){0,2}";
        let identifier = prop::option::of(prop_oneof![
            "[A-Za-z0-9_][A-Za-z0-9_.-]{0,20}".prop_map(|tag| format!(":{tag}")),
            "[0-9a-f]{64}".prop_map(|hex| format!("@sha256:{hex}")),
        ]);

        (registry, path, identifier).prop_map(|(registry, path, identifier)| {
            let mut reference = String::new();
            if let Some(registry) = registry {
                reference.push_str(&registry);
                reference.push('/');
            }

            reference.push_str(&path);
            reference.push_str(identifier.as_deref().unwrap_or_default());
            reference
        })
    }

    proptest! {
        #[test]
        fn rendered_references_are_stable(
            s in reference_strategy(),
            default_registry in prop_oneof![
                Just("registry.upbound.io"),
                Just("localhost"),
                Just("localhost:5000"),
                Just("registry:5000"),
            ]
        ) {
            let options = Options::new().default_registry(default_registry).default_tag("stable");

            let reference = parse_reference(&s, &options).unwrap();
            let reparsed = parse_reference(&reference.to_string(), &options).unwrap();
            prop_assert_eq!(&reparsed, &reference);
            prop_assert_eq!(reparsed.name(), reference.name());

            // Everything is explicit after rendering.
            let strict = parse_reference(&reference.to_string(), &options.clone().strict()).unwrap();
            prop_assert_eq!(strict, reference);
        }

        #[test]
        fn defaults_fill_missing_components(path in "[a-z0-9]{1,8}/[a-z0-9]{1,8}") {
            let options = Options::new().default_registry("registry.example.com").default_tag("edge");

            let reference = parse_reference(&path, &options).unwrap();
            prop_assert_eq!(reference.context().registry().as_str(), "registry.example.com");
            prop_assert_eq!(reference.identifier(), "edge");
        }

        #[test]
        fn malformed_digests_always_fail(hex in "[0-9a-f]{0,63}", strict in any::<bool>()) {
            let options = Options::new().validation(if strict { crate::Validation::Strict } else { crate::Validation::Weak });
            let reference = format!("gcr.io/foo/bar@sha256:{hex}");
            prop_assert!(parse_reference(&reference, &options).is_err());
        }

        #[test]
        fn dispatch_agrees_with_parsers(s in reference_strategy()) {
            let options = Options::new().strict();

            let expected = Digest::parse(&s, &options)
                .map(Reference::Digest)
                .or_else(|_| Tag::parse(&s, &options).map(Reference::Tag))
                .ok();

            prop_assert_eq!(parse_reference(&s, &options).ok(), expected);
        }
    }
}
