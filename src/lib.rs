//! Parse and validate references to images in OCI registries, like
//! `ubuntu`, `gcr.io/crossplane/provider-gcp:latest`, or
//! `alpine@sha256:…`.
//!
//! ```
//! # use oci_name::*;
//! let reference = parse_reference("ubuntu", &Options::default()).unwrap();
//! assert_eq!(reference.name(), "index.docker.io/library/ubuntu:latest");
//! ```

mod digest;
mod error;
mod grammar;
mod options;
mod registry;
mod repository;
mod tag;

pub mod reference;

pub use digest::{ContentDigest, Digest, DigestAlgorithm};
pub use error::{ErrorKind, ParseError, Reason};
pub use options::{Options, Validation, DEFAULT_REGISTRY, DEFAULT_TAG};
pub use reference::{must_parse_reference, parse_reference, Reference};
pub use registry::Registry;
pub use repository::Repository;
pub use tag::Tag;
