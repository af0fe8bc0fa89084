//! html-link-lsp: document links for HTML.
//!
//! Finds every `href`/`src` attribute value in a markup document, computes
//! its range in LSP coordinates, and resolves it against the document's URI.
//!
//! - [`scanner`]: HTML token stream
//! - [`document_links`]: walks tokens and emits [`DocumentLink`]s
//! - [`link_resolve`]: filtering rules and scheme handling
//! - [`uri`]: RFC 3986 resolution behind the [`DocumentContext`] trait
//! - [`server`]: tower-lsp host serving `textDocument/documentLink`
//!
//! ```
//! use html_link_lsp::{find_document_links, TextDocument, UriResolver};
//!
//! let doc = TextDocument::new("http://model/x/1", "html", 0, r#"<img src="a.png">"#);
//! let links = find_document_links(&doc, &UriResolver);
//! assert_eq!(links[0].target.as_deref(), Some("http://model/x/a.png"));
//! ```

pub mod config;
pub mod document;
pub mod document_links;
pub mod error;
pub mod link_resolve;
pub mod scanner;
pub mod server;
pub mod state;
pub mod uri;

pub use config::LinkSettings;
pub use document::TextDocument;
pub use document_links::{collect_links, find_document_links, find_document_links_with, DocumentLink};
pub use error::ReferenceError;
pub use link_resolve::LinkTarget;
pub use uri::{DocumentContext, UriResolver};
