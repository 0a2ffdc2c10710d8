use std::{fmt, str::FromStr};

use crate::{
    error::{ErrorKind, ParseError, Reason, ResultExt},
    grammar,
    tag::split_tag,
    Options, Repository,
};

/// Algorithm used to compute a content digest.
///
/// See [`ContentDigest`] for an example.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DigestAlgorithm {
    SHA256,
    SHA512,
}

impl DigestAlgorithm {
    /// Identifier of the algorithm in a digest string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::SHA256 => "sha256",
            DigestAlgorithm::SHA512 => "sha512",
        }
    }

    /// Number of hexadecimal digits in a hash value.
    pub fn hex_length(&self) -> usize {
        match self {
            DigestAlgorithm::SHA256 => 256 / 8 * 2,
            DigestAlgorithm::SHA512 => 512 / 8 * 2,
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Reason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(DigestAlgorithm::SHA256),
            "sha512" => Ok(DigestAlgorithm::SHA512),
            _ => Err(Reason::UnknownAlgorithm),
        }
    }
}

/// A content digest, as `algorithm:hash_value`.
///
/// # Examples
///
/// ```
/// # use oci_name::*;
/// const HASH: &str = "deadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33f";
///
/// let digest = ContentDigest::parse(&format!("sha256:{HASH}")).unwrap();
/// assert_eq!(digest.algorithm(), DigestAlgorithm::SHA256);
/// assert_eq!(digest.hash_value(), HASH);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct ContentDigest {
    value: String,
    algorithm: DigestAlgorithm,
}

impl ContentDigest {
    pub fn parse(digest: &str) -> Result<Self, ParseError> {
        let (algorithm, hash) = digest.split_once(':').unwrap_or((digest, ""));

        let algorithm = DigestAlgorithm::from_str(algorithm)
            .and_then(|algorithm| {
                grammar::check_hex(hash, algorithm.hex_length())?;
                Ok(algorithm)
            })
            .component(ErrorKind::InvalidDigest, digest)?;

        Ok(ContentDigest {
            value: digest.to_owned(),
            algorithm,
        })
    }

    /// Full digest string (`algorithm:hash_value`).
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn hash_value(&self) -> &str {
        self.value
            .split_once(':')
            .map(|(_, h)| h)
            .unwrap_or_default()
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for ContentDigest {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentDigest::parse(s)
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = ParseError;

    fn try_from(digest: String) -> Result<Self, Self::Error> {
        ContentDigest::parse(&digest)
    }
}

impl serde::Serialize for ContentDigest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

/// Reference to an image by its content digest, like
/// `gcr.io/distroless/static@sha256:…`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Digest {
    repository: Repository,
    digest: ContentDigest,
}

impl Digest {
    /// Parse a reference with a digest.
    ///
    /// The name must contain a single `@`. A tag before the `@` is
    /// validated, but it is not kept: the digest already identifies
    /// the image.
    ///
    /// Components are checked in order (registry, repository, tag,
    /// digest) and the first error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oci_name::*;
    /// const HASH: &str = "deadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33f";
    ///
    /// let digest = Digest::parse(&format!("nginx:1.27@sha256:{HASH}"), &Options::default()).unwrap();
    /// assert_eq!(digest.name(), format!("index.docker.io/library/nginx@sha256:{HASH}"));
    /// ```
    pub fn parse(name: &str, options: &Options) -> Result<Self, ParseError> {
        let (base, digest) = match name.split_once('@') {
            Some((base, digest)) if !digest.contains('@') => (base, digest),
            _ => {
                return Err(ParseError::new(
                    ErrorKind::InvalidReference,
                    name,
                    Reason::DigestSeparators,
                ))
            }
        };

        let (base, tag) = split_tag(base);

        let repository = Repository::parse(base, options)?;

        // An empty tag (`repo:@…`) is the same as no tag.
        if let Some(tag) = tag.filter(|tag| !tag.is_empty()) {
            grammar::check_tag(tag).component(ErrorKind::InvalidTag, tag)?;
        }

        let digest = ContentDigest::parse(digest)?;

        Ok(Digest { repository, digest })
    }

    pub(crate) fn from_parts(repository: Repository, digest: ContentDigest) -> Self {
        Digest { repository, digest }
    }

    pub fn context(&self) -> &Repository {
        &self.repository
    }

    pub fn content_digest(&self) -> &ContentDigest {
        &self.digest
    }

    /// Digest string, as `algorithm:hash_value`.
    pub fn identifier(&self) -> &str {
        self.digest.as_str()
    }

    /// Full name, as `registry/path@digest`.
    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn scope(&self, action: &str) -> String {
        self.repository.scope(action)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.repository, self.digest)
    }
}

impl FromStr for Digest {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::parse(s, &Options::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest as _, Sha256, Sha512};

    /// Encode a byte buffer as hex string.
    struct HexString<T>(T);

    impl<T: AsRef<[u8]>> fmt::Display for HexString<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0
                .as_ref()
                .iter()
                .try_for_each(|byte| write!(f, "{:02x}", byte))
        }
    }

    #[test]
    fn parse_content_digests() {
        let sha256 = HexString(Sha256::digest(b"\x00\x01")).to_string();
        let sha512 = HexString(Sha512::digest(b"\x01\x02")).to_string();

        let digest = ContentDigest::parse(&format!("sha256:{sha256}")).unwrap();
        assert_eq!(digest.algorithm(), DigestAlgorithm::SHA256);
        assert_eq!(digest.hash_value(), sha256);

        let digest = ContentDigest::parse(&format!("sha512:{sha512}")).unwrap();
        assert_eq!(digest.algorithm(), DigestAlgorithm::SHA512);
        assert_eq!(digest.hash_value(), sha512);
        assert_eq!(digest.to_string(), format!("sha512:{sha512}"));
    }

    #[test]
    fn reject_invalid_digests() {
        let sha256 = HexString(Sha256::digest(b"abc")).to_string();

        macro_rules! check {
            ($digest:expr, $reason:expr) => {
                let err = ContentDigest::parse(&$digest).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidDigest);
                assert_eq!(err.reason(), $reason);
            };
        }

        check!("md5:0000", Reason::UnknownAlgorithm);
        check!("unknown:abc123", Reason::UnknownAlgorithm);
        check!("", Reason::UnknownAlgorithm);
        check!("sha256", Reason::InvalidHex(64));
        check!("sha256:abc", Reason::InvalidHex(64));
        check!("sha256:d34db33fd34db33f", Reason::InvalidHex(64));
        check!(format!("sha256:{}", ":".repeat(64)), Reason::InvalidHex(64));
        check!(format!("sha256:{}", "sh".repeat(32)), Reason::InvalidHex(64));
        check!(format!("sha256:{}", sha256.to_uppercase()), Reason::InvalidHex(64));
        check!(format!("sha512:{sha256}"), Reason::InvalidHex(128));
    }

    #[test]
    fn digest_in_json() {
        let sha256 = HexString(Sha256::digest(b"abc")).to_string();
        let json = format!(r#""sha256:{sha256}""#);

        let digest: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest.hash_value(), sha256);
        assert_eq!(serde_json::to_string(&digest).unwrap(), json);

        assert!(serde_json::from_str::<ContentDigest>(r#""sha256:abc""#).is_err());
    }

    #[test]
    fn parse_digests() {
        let sha256 = HexString(Sha256::digest(b"abc")).to_string();
        let options = Options::default();

        let digest = Digest::parse(&format!("example.text/foo/bar@sha256:{sha256}"), &options).unwrap();
        assert_eq!(digest.context().registry().as_str(), "example.text");
        assert_eq!(digest.context().path(), "foo/bar");
        assert_eq!(digest.identifier(), format!("sha256:{sha256}"));
        assert_eq!(digest.scope("pull"), "repository:foo/bar:pull");

        // Tag is dropped.
        let digest = Digest::parse(&format!("example.text:8443/foo/bar:latest@sha256:{sha256}"), &options).unwrap();
        assert_eq!(digest.name(), format!("example.text:8443/foo/bar@sha256:{sha256}"));

        let err = Digest::parse(&format!("foo:white space@sha256:{sha256}"), &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTag);

        // Empty tag is ignored, as in a tag reference.
        for options in [Options::new().weak(), Options::new().strict()] {
            let digest = Digest::parse(&format!("gcr.io/foo:@sha256:{sha256}"), &options).unwrap();
            assert_eq!(digest.name(), format!("gcr.io/foo@sha256:{sha256}"));
        }

        let err = Digest::parse("gcr.io/project-id/missing-digest@", &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDigest);

        let err = Digest::parse(&format!("repo@sha256:{sha256}@sha256:{sha256}"), &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
        assert_eq!(err.reason(), Reason::DigestSeparators);

        let err = Digest::parse("no-digest", &options).unwrap_err();
        assert_eq!(err.reason(), Reason::DigestSeparators);

        // Repository errors shadow digest errors.
        let err = Digest::parse("Upper@sha256:abc", &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRepository);
    }

    #[test]
    fn repository_digest() {
        let sha256 = HexString(Sha256::digest(b"abc")).to_string();
        let repository = Repository::parse("gcr.io/foo", &Options::default()).unwrap();

        let digest = repository.digest(&format!("sha256:{sha256}")).unwrap();
        assert_eq!(digest.name(), format!("gcr.io/foo@sha256:{sha256}"));
        assert!(repository.digest("sha256:abc").is_err());
    }
}
