//! Grammars for the components of a reference.
//!
//! Every check is an independent function over a `&str`. The parsers in
//! the other modules decide which piece of the reference goes to each
//! check, and wrap the [`Reason`] with the component that failed.

use std::net::Ipv6Addr;

use crate::error::Reason;

/// Maximum length of a tag.
pub(crate) const TAG_MAX_LENGTH: usize = 128;

/// Maximum length of the rendered `registry/repository` name.
pub(crate) const NAME_MAX_LENGTH: usize = 255;

/// Check a registry address: `host[:port]`.
///
/// `host` is a DNS name (like `localhost` or `gcr.io`) or an IPv6
/// address between brackets.
pub(crate) fn check_registry(registry: &str) -> Result<(), Reason> {
    if registry.is_empty() {
        return Err(Reason::Empty);
    }

    // Anything else would be read back as part of the repository path.
    if !looks_like_registry(registry) {
        return Err(Reason::NotAHostname);
    }

    let port = match registry.strip_prefix('[') {
        Some(rest) => {
            let (address, tail) = rest.split_once(']').ok_or(Reason::MisplacedSeparator)?;
            check_ipv6(address)?;

            match tail {
                "" => None,
                _ => Some(tail.strip_prefix(':').ok_or(Reason::MisplacedSeparator)?),
            }
        }

        None => {
            let (host, port) = match registry.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (registry, None),
            };

            check_domain(host)?;
            port
        }
    };

    match port {
        Some(port) => check_port(port),
        None => Ok(()),
    }
}

/// The first component of a name is a registry if it looks like a
/// hostname.
pub(crate) fn looks_like_registry(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}

fn check_domain(host: &str) -> Result<(), Reason> {
    if host.is_empty() {
        return Err(Reason::Empty);
    }

    for label in host.split('.') {
        if let Some(c) = label.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
            return Err(Reason::IllegalCharacter(c));
        }

        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return Err(Reason::MisplacedSeparator);
        }
    }

    Ok(())
}

fn check_ipv6(address: &str) -> Result<(), Reason> {
    if address.is_empty() {
        return Err(Reason::Empty);
    }

    if let Some(c) = address
        .chars()
        .find(|c| !c.is_ascii_hexdigit() && *c != ':' && *c != '.')
    {
        return Err(Reason::IllegalCharacter(c));
    }

    address
        .parse::<Ipv6Addr>()
        .map(drop)
        .map_err(|_| Reason::MisplacedSeparator)
}

fn check_port(port: &str) -> Result<(), Reason> {
    if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) && port.parse::<u16>().is_ok() {
        Ok(())
    } else {
        Err(Reason::InvalidPort)
    }
}

/// Check a single component of a repository path.
///
/// Components are lowercase alphanumeric runs joined by a separator: a
/// single `.`, one or two `_`, or any number of `-`. A component can't
/// start or end with a separator.
pub(crate) fn check_path_component(component: &str) -> Result<(), Reason> {
    if component.is_empty() {
        return Err(Reason::Empty);
    }

    // Start of the current run of separators.
    let mut separators: Option<usize> = None;

    for (index, c) in component.char_indices() {
        match c {
            'a'..='z' | '0'..='9' => {
                if let Some(start) = separators.take() {
                    if !is_separator(&component[start..index]) {
                        return Err(Reason::MisplacedSeparator);
                    }
                }
            }

            '.' | '_' | '-' => {
                if index == 0 {
                    return Err(Reason::MisplacedSeparator);
                }

                separators.get_or_insert(index);
            }

            c => return Err(Reason::IllegalCharacter(c)),
        }
    }

    match separators {
        Some(_) => Err(Reason::MisplacedSeparator),
        None => Ok(()),
    }
}

fn is_separator(run: &str) -> bool {
    matches!(run, "." | "_" | "__") || run.bytes().all(|b| b == b'-')
}

/// Check a tag: `[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}`.
pub(crate) fn check_tag(tag: &str) -> Result<(), Reason> {
    let first = tag.chars().next().ok_or(Reason::Empty)?;

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '.' | '-'))
    {
        return Err(Reason::IllegalCharacter(c));
    }

    if first == '.' || first == '-' {
        return Err(Reason::MisplacedSeparator);
    }

    if tag.len() > TAG_MAX_LENGTH {
        return Err(Reason::TooLong(TAG_MAX_LENGTH));
    }

    Ok(())
}

/// Check that `value` has exactly `length` lowercase hexadecimal digits.
pub(crate) fn check_hex(value: &str, length: usize) -> Result<(), Reason> {
    if value.len() == length && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        Ok(())
    } else {
        Err(Reason::InvalidHex(length))
    }
}
