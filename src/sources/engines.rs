//! Electron to Chromium version lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Source, SourceError, get_json};
use crate::state::UNKNOWN_BROWSER_VERSION;

/// Default lookup table location.
pub const DEFAULT_ENGINE_MAP_URL: &str =
    "https://raw.githubusercontent.com/Kilian/electron-to-chromium/master/full-versions.json";

/// Flat Electron version to Chromium version table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineMap(HashMap<String, String>);

impl EngineMap {
    /// What: Look up the Chromium version bundled with an Electron version.
    ///
    /// Output:
    /// - The mapped version, or `Unknown` when the table has no entry.
    #[must_use]
    pub fn resolve(&self, engine_version: &str) -> &str {
        self.0
            .get(engine_version)
            .map_or(UNKNOWN_BROWSER_VERSION, String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for EngineMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Engine-map adapter configuration.
#[derive(Clone, Debug)]
pub struct EngineMapSource {
    /// JSON table URL.
    pub url: String,
}

impl Default for EngineMapSource {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_MAP_URL.to_string(),
        }
    }
}

impl Source for EngineMapSource {
    type Output = EngineMap;
    const NAME: &'static str = "engine-map";
    const SNAPSHOT_FILE: &'static str = "engine_map.json";

    async fn fetch_remote(&self, client: &reqwest::Client) -> Result<EngineMap, SourceError> {
        get_json(client, &self.url, Self::NAME).await
    }

    fn item_count(data: &EngineMap) -> usize {
        data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: The table deserializes from a flat JSON object and resolves lookups
    ///
    /// - Input: Two-entry JSON object
    /// - Output: Known keys map through, unknown keys resolve to `Unknown`
    fn resolves_from_flat_json() {
        let map: EngineMap =
            serde_json::from_str(r#"{"28.1.0": "120.0.6099.56", "25.8.1": "114.0.5735.289"}"#)
                .expect("map");
        assert_eq!(map.len(), 2);
        assert_eq!(map.resolve("28.1.0"), "120.0.6099.56");
        assert_eq!(map.resolve("1.0.0"), "Unknown");
        assert!(EngineMap::default().is_empty());
    }
}
