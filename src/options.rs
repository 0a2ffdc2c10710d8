/// Registry used when a reference does not include one, like
/// `debian` or `nixos/nix`.
pub const DEFAULT_REGISTRY: &str = "index.docker.io";

/// Tag used when a reference has neither a tag nor a digest.
pub const DEFAULT_TAG: &str = "latest";

/// How much of a reference can be filled from defaults.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Validation {
    /// Missing registry, tag, or `library/` namespace are
    /// taken from the defaults.
    #[default]
    Weak,

    /// The reference must contain every component explicitly.
    Strict,
}

/// Settings for the parsers.
///
/// Every parse function receives its own `Options`; there is no global
/// state, so the same instance can be shared between threads.
///
/// # Examples
///
/// ```
/// # use oci_name::*;
/// let options = Options::new()
///     .default_registry("registry.upbound.io")
///     .default_tag("stable");
///
/// let reference = parse_reference("crossplane/provider-gcp", &options).unwrap();
/// assert_eq!(reference.name(), "registry.upbound.io/crossplane/provider-gcp:stable");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub(crate) validation: Validation,
    pub(crate) default_registry: String,
    pub(crate) default_tag: String,
    pub(crate) insecure: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            validation: Validation::Weak,
            default_registry: DEFAULT_REGISTRY.to_owned(),
            default_tag: DEFAULT_TAG.to_owned(),
            insecure: false,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    /// Accept references with missing components.
    pub fn weak(self) -> Self {
        self.validation(Validation::Weak)
    }

    /// Reject references that need a default to be complete.
    pub fn strict(self) -> Self {
        self.validation(Validation::Strict)
    }

    /// Registry for references without one.
    ///
    /// The value is validated when it is used.
    pub fn default_registry(mut self, registry: impl Into<String>) -> Self {
        self.default_registry = registry.into();
        self
    }

    /// Tag for references without tag or digest.
    ///
    /// The value is validated when it is used.
    pub fn default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = tag.into();
        self
    }

    /// Mark registries as reachable only through plain HTTP.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.validation == Validation::Strict
    }
}

#[test]
fn builder_overrides_defaults() {
    let options = Options::new()
        .strict()
        .default_registry("gcr.io")
        .default_tag("stable")
        .insecure(true);

    assert!(options.is_strict());
    assert_eq!(options.default_registry, "gcr.io");
    assert_eq!(options.default_tag, "stable");
    assert!(options.insecure);

    let options = options.weak();
    assert_eq!(options.validation, Validation::Weak);
    assert_eq!(Options::default().default_registry, DEFAULT_REGISTRY);
}
