/// DocumentLink provider — finds link attribute values with their ranges and
/// resolved targets.
use serde::Serialize;
use tower_lsp::lsp_types::{self, Range, Url};
use tracing::debug;

use crate::config::LinkSettings;
use crate::document::TextDocument;
use crate::link_resolve::{self, LinkTarget};
use crate::scanner::{Scanner, Token, TokenKind};
use crate::state::BackendState;
use crate::uri::DocumentContext;

/// A link found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    /// Range of the attribute value, quotes excluded.
    pub range: Range,
    /// Resolved target; `None` when the reference is not a valid URI.
    pub target: Option<String>,
}

impl DocumentLink {
    /// Convert to the protocol type. Targets that `Url` rejects are dropped,
    /// keeping the range highlighted.
    pub fn to_lsp(&self, tooltip: Option<String>) -> lsp_types::DocumentLink {
        lsp_types::DocumentLink {
            range: self.range,
            target: self.target.as_deref().and_then(|t| Url::parse(t).ok()),
            tooltip,
            data: None,
        }
    }
}

/// Build the `textDocument/documentLink` response for an open document.
pub(crate) fn provide(state: &BackendState, uri: &Url) -> Option<Vec<lsp_types::DocumentLink>> {
    let links = state.document_links(uri)?;
    Some(
        links
            .iter()
            .map(|link| link.to_lsp(link.target.clone()))
            .collect(),
    )
}

/// Attribute value owned by a link-bearing attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LinkCandidate<'a> {
    value: &'a str,
    start: usize,
    end: usize,
}

impl<'a> LinkCandidate<'a> {
    /// Strip one pair of matching quotes from the token.
    fn from_token(source: &'a str, token: &Token) -> Self {
        let raw = token.text(source);
        let quoted = raw.len() >= 2
            && (raw.starts_with('"') && raw.ends_with('"')
                || raw.starts_with('\'') && raw.ends_with('\''));
        if quoted {
            LinkCandidate {
                value: &raw[1..raw.len() - 1],
                start: token.start + 1,
                end: token.end - 1,
            }
        } else {
            LinkCandidate {
                value: raw,
                start: token.start,
                end: token.end,
            }
        }
    }
}

/// Find all links in `document` with default settings.
pub fn find_document_links(
    document: &TextDocument,
    context: &dyn DocumentContext,
) -> Vec<DocumentLink> {
    find_document_links_with(document, context, &LinkSettings::default())
}

pub fn find_document_links_with(
    document: &TextDocument,
    context: &dyn DocumentContext,
    settings: &LinkSettings,
) -> Vec<DocumentLink> {
    collect_links(document, Scanner::new(document.text()), context, settings)
}

/// Walk a token stream over `document` and build links in document order.
///
/// Empty, `javascript:` and fragment-only values produce nothing. Values that
/// fail to resolve still produce a link without a target.
pub fn collect_links<I>(
    document: &TextDocument,
    tokens: I,
    context: &dyn DocumentContext,
    settings: &LinkSettings,
) -> Vec<DocumentLink>
where
    I: IntoIterator<Item = Token>,
{
    let source = document.text();
    let mut links = Vec::new();
    let mut tag = String::new();
    let mut attribute: Option<String> = None;
    let mut base_override: Option<String> = None;

    for token in tokens {
        match token.kind {
            TokenKind::StartTag => {
                tag = token.text(source).to_ascii_lowercase();
                attribute = None;
            }
            TokenKind::AttributeName => {
                attribute = Some(token.text(source).to_ascii_lowercase());
            }
            TokenKind::AttributeValue => {
                let Some(name) = attribute.take() else {
                    continue;
                };
                if !settings.is_link_attribute(&name) {
                    continue;
                }
                let candidate = LinkCandidate::from_token(source, &token);
                let base = base_override.as_deref().unwrap_or(document.uri());
                let Some(target) = link_resolve::resolve(base, candidate.value, context) else {
                    continue;
                };

                if settings.honor_base_element
                    && base_override.is_none()
                    && tag == "base"
                    && name == "href"
                {
                    if let LinkTarget::Resolved(uri) = &target {
                        debug!(base = %uri, "document_links: using <base href>");
                        base_override = Some(uri.clone());
                    }
                }

                links.push(DocumentLink {
                    range: document.range(candidate.start, candidate.end),
                    target: target.into_target(),
                });
            }
            TokenKind::StartTagClose
            | TokenKind::StartTagSelfClose
            | TokenKind::EndTagOpen
            | TokenKind::StartTagOpen => {
                tag.clear();
                attribute = None;
            }
            _ => {}
        }
    }

    debug!(uri = document.uri(), count = links.len(), "document_links: scanned");
    links
}
