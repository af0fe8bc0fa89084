/// URI references (RFC 3986) and the document context that resolves them.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ReferenceError;

/// Appendix B of RFC 3986.
static URI_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?:([^:/?#]+):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
        .expect("valid regex")
});

/// Same split without the scheme, for inputs whose leading `x:` is not a scheme.
static RELATIVE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$").expect("valid regex")
});

/// Joins a reference found in a document with that document's base identifier.
///
/// Implementations must be pure. A failure means the reference is not a
/// usable URI; the link is then reported without a target.
pub trait DocumentContext {
    fn resolve_reference(&self, reference: &str, base: &str) -> Result<String, ReferenceError>;
}

impl<F> DocumentContext for F
where
    F: Fn(&str, &str) -> Result<String, ReferenceError>,
{
    fn resolve_reference(&self, reference: &str, base: &str) -> Result<String, ReferenceError> {
        self(reference, base)
    }
}

/// Default context: RFC 3986 section 5 resolution, purely on strings.
///
/// An empty base leaves the reference as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriResolver;

impl DocumentContext for UriResolver {
    fn resolve_reference(&self, reference: &str, base: &str) -> Result<String, ReferenceError> {
        validate_reference(reference)?;
        if base.is_empty() {
            return Ok(reference.to_string());
        }
        Ok(resolve_uri_reference(base, reference))
    }
}

/// The five components of a URI reference. Absent and empty are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UriReference<'a> {
    pub scheme: Option<&'a str>,
    pub authority: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl<'a> UriReference<'a> {
    pub fn parse(input: &'a str) -> Self {
        if let Some(caps) = URI_REFERENCE.captures(input) {
            let scheme = caps.get(1).map(|m| m.as_str());
            if scheme.map_or(true, is_scheme) {
                return Self {
                    scheme,
                    authority: group(&caps, 2),
                    path: group(&caps, 3).unwrap_or(""),
                    query: group(&caps, 4),
                    fragment: group(&caps, 5),
                };
            }
        }
        match RELATIVE_REFERENCE.captures(input) {
            Some(caps) => Self {
                scheme: None,
                authority: group(&caps, 1),
                path: group(&caps, 2).unwrap_or(""),
                query: group(&caps, 3),
                fragment: group(&caps, 4),
            },
            None => Self {
                path: input,
                ..Self::default()
            },
        }
    }
}

fn group<'a>(caps: &Captures<'a>, index: usize) -> Option<&'a str> {
    caps.get(index).map(|m| m.as_str())
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Reject references that no URI parser would accept: a `%` that does not
/// start a `%HH` escape, or an ASCII control character.
///
/// Tab, CR and LF are control characters too. They are rejected, not
/// stripped, so `a\tb.js` is reported without a target.
pub fn validate_reference(reference: &str) -> Result<(), ReferenceError> {
    let bytes = reference.as_bytes();
    for (offset, &byte) in bytes.iter().enumerate() {
        if byte == b'%' {
            let escaped = bytes
                .get(offset + 1..offset + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !escaped {
                return Err(ReferenceError::MalformedPercentEncoding {
                    reference: reference.to_string(),
                    offset,
                });
            }
        } else if byte.is_ascii_control() {
            return Err(ReferenceError::ControlCharacter {
                reference: reference.to_string(),
                offset,
            });
        }
    }
    Ok(())
}

/// Transform `reference` against `base` (RFC 3986, 5.2.2) and recompose.
///
/// Strict: a reference with a scheme is never merged with the base, even
/// when the schemes match.
pub fn resolve_uri_reference(base: &str, reference: &str) -> String {
    let r = UriReference::parse(reference);
    let b = UriReference::parse(base);

    let (scheme, authority, path, query) = if r.scheme.is_some() {
        (r.scheme, r.authority, remove_dot_segments(r.path), r.query)
    } else if r.authority.is_some() {
        (b.scheme, r.authority, remove_dot_segments(r.path), r.query)
    } else if r.path.is_empty() {
        (b.scheme, b.authority, b.path.to_string(), r.query.or(b.query))
    } else if r.path.starts_with('/') {
        (b.scheme, b.authority, remove_dot_segments(r.path), r.query)
    } else {
        let merged = merge_paths(&b, r.path);
        (b.scheme, b.authority, remove_dot_segments(&merged), r.query)
    };

    let mut out = String::with_capacity(base.len() + reference.len());
    if let Some(scheme) = scheme {
        out.push_str(scheme);
        out.push(':');
    }
    if let Some(authority) = authority {
        out.push_str("//");
        out.push_str(authority);
    }
    out.push_str(&path);
    if let Some(query) = query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = r.fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

fn merge_paths(base: &UriReference<'_>, path: &str) -> String {
    if base.authority.is_some() && base.path.is_empty() {
        return format!("/{path}");
    }
    match base.path.rfind('/') {
        Some(idx) => format!("{}{path}", &base.path[..=idx]),
        None => path.to_string(),
    }
}

/// RFC 3986, 5.2.4.
pub fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());

    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let skip = usize::from(input.starts_with('/'));
            let end = input[skip..].find('/').map_or(input.len(), |i| i + skip);
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }

    output
}

fn pop_segment(output: &mut String) {
    match output.rfind('/') {
        Some(idx) => output.truncate(idx),
        None => output.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // RFC 3986, 5.4.1 and 5.4.2.
    #[rstest]
    #[case("g:h", "g:h")]
    #[case("g", "http://a/b/c/g")]
    #[case("./g", "http://a/b/c/g")]
    #[case("g/", "http://a/b/c/g/")]
    #[case("/g", "http://a/g")]
    #[case("//g", "http://g")]
    #[case("?y", "http://a/b/c/d;p?y")]
    #[case("g?y", "http://a/b/c/g?y")]
    #[case("#s", "http://a/b/c/d;p?q#s")]
    #[case(";x", "http://a/b/c/;x")]
    #[case("", "http://a/b/c/d;p?q")]
    #[case(".", "http://a/b/c/")]
    #[case("..", "http://a/b/")]
    #[case("../g", "http://a/b/g")]
    #[case("../..", "http://a/")]
    #[case("../../../g", "http://a/g")]
    #[case("/./g", "http://a/g")]
    #[case("g.", "http://a/b/c/g.")]
    #[case("g/../h", "http://a/b/c/h")]
    fn rfc_examples(#[case] reference: &str, #[case] expected: &str) {
        assert_eq!(resolve_uri_reference("http://a/b/c/d;p?q", reference), expected);
    }

    #[test]
    fn parses_file_uri_with_drive_letter() {
        let parsed = UriReference::parse("file:///c:/Alex/test.html");
        assert_eq!(parsed.scheme, Some("file"));
        assert_eq!(parsed.authority, Some(""));
        assert_eq!(parsed.path, "/c:/Alex/test.html");
    }

    #[test]
    fn absolute_path_against_drive_letter_base() {
        let resolved = resolve_uri_reference("file:///c:/Alex/working_dir/test.html", "/class/class.js");
        assert_eq!(resolved, "file:///class/class.js");
    }

    #[test]
    fn invalid_scheme_is_a_path() {
        let parsed = UriReference::parse("a b:c");
        assert_eq!(parsed.scheme, None);
        assert_eq!(parsed.path, "a b:c");
    }

    #[test]
    fn rejects_lone_percent() {
        let err = validate_reference("%").unwrap_err();
        assert_eq!(
            err,
            ReferenceError::MalformedPercentEncoding {
                reference: "%".to_string(),
                offset: 0,
            }
        );
        assert!(validate_reference("a%2Fb").is_ok());
        assert!(validate_reference("a%2").is_err());
        assert!(validate_reference("a\u{7}b").is_err());
    }

    #[test]
    fn rejects_tab_and_line_breaks() {
        assert_eq!(
            UriResolver.resolve_reference("a\tb.js", "http://a/"),
            Err(ReferenceError::ControlCharacter {
                reference: "a\tb.js".to_string(),
                offset: 1,
            })
        );
        assert!(validate_reference("a\nb").is_err());
        assert!(validate_reference("a\r\nb").is_err());
    }

    #[test]
    fn resolver_keeps_reference_without_base() {
        assert_eq!(UriResolver.resolve_reference("a.js", "").unwrap(), "a.js");
    }

    #[test]
    fn closures_are_contexts() {
        let context =
            |reference: &str, _base: &str| Ok::<_, ReferenceError>(format!("x:{reference}"));
        assert_eq!(context.resolve_reference("a", "b").unwrap(), "x:a");
    }
}
