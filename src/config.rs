use serde::Deserialize;
use tracing::{debug, warn};

/// Configuration section read from a whole client configuration.
const SECTION: &str = "htmlLinks";

/// Keys accepted at the top level of a payload.
const KEYS: [&str; 2] = ["linkAttributes", "honorBaseElement"];

/// Settings for link discovery.
///
/// Read from `initializationOptions` and `workspace/didChangeConfiguration`,
/// either at the top level or nested under `htmlLinks`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkSettings {
    /// Attribute names whose values are references. Matched case-insensitively.
    pub link_attributes: Vec<String>,
    /// Resolve references after `<base href>` against that URI instead of the
    /// document's own.
    pub honor_base_element: bool,
}

impl Default for LinkSettings {
    fn default() -> Self {
        LinkSettings {
            link_attributes: vec!["href".to_string(), "src".to_string()],
            honor_base_element: false,
        }
    }
}

impl LinkSettings {
    pub fn is_link_attribute(&self, name: &str) -> bool {
        self.link_attributes
            .iter()
            .any(|attr| attr.eq_ignore_ascii_case(name))
    }

    /// Pick link settings out of a client payload and parse them.
    ///
    /// The payload may be the whole client configuration, in which case only
    /// the `htmlLinks` section is read. A top-level object counts as settings
    /// only when it names one of our keys. Returns `None` (and logs) when the
    /// payload carries no settings or invalid ones.
    pub fn from_json(value: &serde_json::Value) -> Option<LinkSettings> {
        let section = match value.get(SECTION) {
            Some(section) => section,
            None if Self::names_a_setting(value) => value,
            None => {
                debug!("config: payload carries no link settings");
                return None;
            }
        };
        if section.is_null() {
            return None;
        }
        match serde_json::from_value(section.clone()) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(error = %e, "config: ignoring invalid link settings");
                None
            }
        }
    }

    fn names_a_setting(value: &serde_json::Value) -> bool {
        value
            .as_object()
            .is_some_and(|map| KEYS.iter().any(|key| map.contains_key(*key)))
    }
}
