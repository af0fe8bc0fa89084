/// Resolve link attribute values to target URIs.
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::uri::{self, DocumentContext, UriReference};

static PSEUDO_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*javascript:").expect("valid regex"));

static FRAGMENT_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#").expect("valid regex"));

/// `scheme://...` or any `file:` URI. These are taken literally.
static ABSOLUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*://|file:)").expect("valid regex"));

/// Outcome for a reference that is not filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A navigable absolute URI.
    Resolved(String),
    /// The reference is present but is not a valid URI reference.
    Unresolvable,
}

impl LinkTarget {
    pub fn into_target(self) -> Option<String> {
        match self {
            LinkTarget::Resolved(target) => Some(target),
            LinkTarget::Unresolvable => None,
        }
    }
}

/// Resolve a raw attribute value against `base`.
///
/// Returns `None` for references that never produce a link: empty values,
/// `javascript:` and in-document fragments. Everything else yields a
/// [`LinkTarget`]:
/// - `scheme://...` and `file:` references are returned as written (outer
///   whitespace trimmed, backslashes kept)
/// - `//host/path` takes the base's scheme, or `http` for `file:` bases
/// - anything else is handed to `context`
pub fn resolve(base: &str, raw: &str, context: &dyn DocumentContext) -> Option<LinkTarget> {
    let reference = raw.trim();
    if reference.is_empty()
        || PSEUDO_SCHEME.is_match(reference)
        || FRAGMENT_ONLY.is_match(reference)
    {
        debug!(reference = raw, "link_resolve: filtered reference");
        return None;
    }

    let resolved = if ABSOLUTE.is_match(reference) {
        Ok(reference.to_string())
    } else if reference.starts_with("//") {
        Ok(format!("{}:{reference}", network_path_scheme(base)))
    } else {
        context.resolve_reference(reference, base)
    };

    match resolved.and_then(|target| uri::validate_reference(&target).map(|()| target)) {
        Ok(target) => {
            debug!(reference, base, target = %target, "link_resolve: resolved");
            Some(LinkTarget::Resolved(target))
        }
        Err(e) => {
            debug!(reference, base, error = %e, "link_resolve: unresolvable reference");
            Some(LinkTarget::Unresolvable)
        }
    }
}

/// Scheme for a `//host/path` reference. A `file:` base has no host to
/// share, so those links go to the web.
fn network_path_scheme(base: &str) -> String {
    match UriReference::parse(base).scheme {
        Some(scheme) if !scheme.eq_ignore_ascii_case("file") => scheme.to_ascii_lowercase(),
        _ => "http".to_string(),
    }
}
