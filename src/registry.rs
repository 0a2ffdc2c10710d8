use std::{fmt, hash, net::Ipv4Addr, str::FromStr};

use crate::{
    error::{ErrorKind, ParseError, Reason, ResultExt},
    grammar, Options, DEFAULT_REGISTRY,
};

/// Alias of [`DEFAULT_REGISTRY`] accepted in references.
const DEFAULT_REGISTRY_ALIAS: &str = "docker.io";

/// Address of a registry server, like `gcr.io` or `localhost:5000`.
///
/// Two registries are equal if they have the same address, regardless
/// of the `insecure` flag.
#[derive(Clone, Debug, Eq)]
pub struct Registry {
    host: String,
    insecure: bool,
}

impl Registry {
    /// Parse a registry address.
    ///
    /// An empty `name` is replaced by the default registry in `options`,
    /// unless the validation is strict. `docker.io` is rewritten to
    /// [`DEFAULT_REGISTRY`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use oci_name::*;
    /// let registry = Registry::parse("docker.io", &Options::default()).unwrap();
    /// assert_eq!(registry.as_str(), "index.docker.io");
    ///
    /// let registry = Registry::parse("", &Options::new().default_registry("gcr.io")).unwrap();
    /// assert_eq!(registry.as_str(), "gcr.io");
    /// ```
    pub fn parse(name: &str, options: &Options) -> Result<Self, ParseError> {
        let host = if name.is_empty() {
            if options.is_strict() {
                return Err(ParseError::new(
                    ErrorKind::InvalidReference,
                    name,
                    Reason::MissingRegistry,
                ));
            }

            tracing::trace!("Using default registry {}", options.default_registry);
            options.default_registry.as_str()
        } else {
            name
        };

        grammar::check_registry(host).component(ErrorKind::InvalidRegistry, host)?;

        let host = match host {
            DEFAULT_REGISTRY_ALIAS => DEFAULT_REGISTRY,
            _ => host,
        };

        Ok(Registry {
            host: host.to_owned(),
            insecure: options.insecure,
        })
    }

    /// Address of the registry, as `host[:port]`.
    pub fn as_str(&self) -> &str {
        &self.host
    }

    /// Returns `true` if this is the Docker Hub registry.
    pub fn is_docker_hub(&self) -> bool {
        self.host == DEFAULT_REGISTRY
    }

    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    /// URL scheme to talk to this registry.
    ///
    /// It is `http` for insecure registries and for addresses that are
    /// only reachable in a local network (`localhost`, loopback, and
    /// private IPv4 ranges). Anything else uses `https`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oci_name::*;
    /// let options = Options::default();
    /// assert_eq!(Registry::parse("gcr.io", &options).unwrap().scheme(), "https");
    /// assert_eq!(Registry::parse("localhost:5000", &options).unwrap().scheme(), "http");
    /// assert_eq!(Registry::parse("10.0.0.1", &options).unwrap().scheme(), "http");
    /// ```
    pub fn scheme(&self) -> &'static str {
        if self.insecure || self.is_local() {
            "http"
        } else {
            "https"
        }
    }

    fn is_local(&self) -> bool {
        if self.host.starts_with("[::1]") {
            return true;
        }

        let host = self.host.split(':').next().unwrap_or_default();
        if host == "localhost" {
            return true;
        }

        match Ipv4Addr::from_str(host) {
            Ok(ip) => ip.is_loopback() || ip.is_private(),
            Err(_) => false,
        }
    }

    /// Scope to request a token to list the repositories.
    pub fn scope(&self) -> String {
        "registry:catalog:*".to_owned()
    }
}

impl PartialEq for Registry {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host
    }
}

impl hash::Hash for Registry {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.host.hash(state);
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

impl FromStr for Registry {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Registry::parse(s, &Options::default())
    }
}

#[test]
fn default_registry() {
    let registry = Registry::parse("", &Options::default()).unwrap();
    assert_eq!(registry.as_str(), DEFAULT_REGISTRY);
    assert!(registry.is_docker_hub());

    let err = Registry::parse("", &Options::new().strict()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidReference);
    assert_eq!(err.reason(), Reason::MissingRegistry);

    // The default is validated when it is used.
    let err = Registry::parse("", &Options::new().default_registry("bad host")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRegistry);
    assert_eq!(err.input(), "bad host");
}

#[test]
fn reject_invalid_registries() {
    let options = Options::default();

    for name in ["gcr.io:port", "gcr..io", "[::1", "white space.io"] {
        let err = Registry::parse(name, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRegistry, "{name}");
        assert_eq!(err.input(), name);
    }
}

#[test]
fn registry_schemes() {
    let options = Options::default();
    let scheme = |name: &str| Registry::parse(name, &options).unwrap().scheme();

    assert_eq!(scheme("gcr.io"), "https");
    assert_eq!(scheme("registry.example.com:5000"), "https");
    assert_eq!(scheme("localhost"), "http");
    assert_eq!(scheme("localhost:5000"), "http");
    assert_eq!(scheme("127.0.0.1:5000"), "http");
    assert_eq!(scheme("192.168.1.10"), "http");
    assert_eq!(scheme("172.16.0.1:443"), "http");
    assert_eq!(scheme("[::1]:5000"), "http");
    assert_eq!(scheme("8.8.8.8"), "https");

    let insecure = Options::new().insecure(true);
    let registry = Registry::parse("gcr.io", &insecure).unwrap();
    assert!(registry.is_insecure());
    assert_eq!(registry.scheme(), "http");

    // The flag does not change the identity of the registry.
    assert_eq!(registry, Registry::parse("gcr.io", &options).unwrap());
}
