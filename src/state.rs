use dashmap::DashMap;
use tower_lsp::lsp_types::{Range, Url};
use tracing::debug;

use std::sync::{Mutex, PoisonError, RwLock};

use crate::config::LinkSettings;
use crate::document::TextDocument;
use crate::document_links::{self, DocumentLink};
use crate::uri::UriResolver;

/// Per-document state: text + cached links.
pub struct DocumentState {
    pub document: TextDocument,
    cached_links: Mutex<Option<Vec<DocumentLink>>>,
}

impl DocumentState {
    pub fn new(document: TextDocument) -> Self {
        Self {
            document,
            cached_links: Mutex::new(None),
        }
    }

    /// Get cached links, scanning lazily if needed.
    pub fn links(&self, settings: &LinkSettings) -> Vec<DocumentLink> {
        let mut cache = self
            .cached_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(ref cached) = *cache {
            return cached.clone();
        }
        let links = document_links::find_document_links_with(&self.document, &UriResolver, settings);
        *cache = Some(links.clone());
        links
    }

    /// Invalidate cached links (call after edits or settings changes).
    pub fn invalidate_links(&self) {
        *self
            .cached_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Shared backend state for the LSP server.
pub struct BackendState {
    /// Open documents, keyed by URI.
    pub documents: DashMap<Url, DocumentState>,

    /// Current link settings.
    pub settings: RwLock<LinkSettings>,
}

impl BackendState {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            settings: RwLock::new(LinkSettings::default()),
        }
    }

    pub fn settings(&self) -> LinkSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the settings and drop every cached scan.
    pub fn update_settings(&self, settings: LinkSettings) {
        debug!(?settings, "state: settings updated");
        *self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = settings;
        for doc in self.documents.iter() {
            doc.invalidate_links();
        }
    }

    /// Apply settings from an `initializationOptions` or
    /// `didChangeConfiguration` payload. Payloads without link settings leave
    /// the current ones in place.
    pub fn apply_client_settings(&self, payload: &serde_json::Value) -> bool {
        match LinkSettings::from_json(payload) {
            Some(settings) => {
                self.update_settings(settings);
                true
            }
            None => false,
        }
    }

    pub fn open(&self, uri: Url, language_id: String, version: i32, text: String) {
        let document = TextDocument::new(uri.as_str(), language_id, version, text);
        debug!(
            uri = %uri,
            language = document.language_id(),
            version = document.version(),
            "state: document opened"
        );
        self.documents.insert(uri, DocumentState::new(document));
    }

    /// Apply content changes in order. Unknown documents are ignored.
    pub fn change<'a>(
        &self,
        uri: &Url,
        version: i32,
        changes: impl IntoIterator<Item = (Option<Range>, &'a str)>,
    ) -> bool {
        let Some(mut state) = self.documents.get_mut(uri) else {
            return false;
        };
        for (range, text) in changes {
            state.document.apply_change(range, text);
        }
        state.document.set_version(version);
        state.invalidate_links();
        debug!(uri = %uri, version = state.document.version(), "state: document changed");
        true
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn document_links(&self, uri: &Url) -> Option<Vec<DocumentLink>> {
        let settings = self.settings();
        self.documents.get(uri).map(|doc| doc.links(&settings))
    }

    pub fn document_text(&self, uri: &Url) -> Option<String> {
        self.documents
            .get(uri)
            .map(|doc| doc.document.text().to_string())
    }
}

impl Default for BackendState {
    fn default() -> Self {
        Self::new()
    }
}
