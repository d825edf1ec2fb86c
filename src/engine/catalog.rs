use std::collections::HashSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::error::{GameError, Result};

/// A matchable kind. Two tiles of a deal share one item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    #[serde(rename = "displayRef", alias = "display_ref", alias = "image")]
    pub display_ref: String,
}

impl Item {
    pub fn new(id: u32, display_ref: impl Into<String>) -> Self {
        Item {
            id,
            display_ref: display_ref.into(),
        }
    }

    fn is_usable(&self) -> bool {
        self.id > 0 && !self.display_ref.trim().is_empty()
    }
}

/// Source of the full list of items a deck may be dealt from.
pub trait CatalogProvider {
    fn fetch_catalog(&self) -> Result<Vec<Item>>;
}

/// Built-in catalog of emoji glyphs, referenced as `emoji:<glyph>`.
#[derive(Clone, Debug, Default)]
pub struct EmojiCatalog;

pub const EMOJI_PREFIX: &str = "emoji:";

const EMOJI: [&str; 48] = [
    // Animals
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵",
    "🦄", "🐝", "🦋", "🐢", "🐙",
    // Fruits
    "🍍", "🍎", "🍐", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🍒", "🥝", "🥑",
    // Food
    "🍔", "🍕", "🌮", "🍦", "🎂", "🍿",
    // Objects
    "🎨", "🎧", "🎮", "🎯", "🎲", "🚀", "🚂", "⛵", "🚲", "🪐",
];

impl CatalogProvider for EmojiCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Item>> {
        Ok(EMOJI
            .iter()
            .enumerate()
            .map(|(idx, glyph)| Item::new(idx as u32 + 1, format!("{EMOJI_PREFIX}{glyph}")))
            .collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Bare(Vec<Item>),
    Envelope { results: Vec<Item> },
}

/// Catalog parsed from a JSON document, either a bare array of
/// `{ "id", "displayRef" }` records or an object wrapping them in `results`.
#[derive(Clone, Debug)]
pub struct JsonCatalog {
    raw: String,
}

impl JsonCatalog {
    pub fn new(raw: impl Into<String>) -> Self {
        JsonCatalog { raw: raw.into() }
    }

    pub fn parse(raw: &str) -> Result<Vec<Item>> {
        let document: CatalogDocument = serde_json::from_str(raw)
            .map_err(|err| GameError::catalog_with_source("malformed catalog document", err))?;
        let records = match document {
            CatalogDocument::Bare(items) => items,
            CatalogDocument::Envelope { results } => results,
        };

        let total = records.len();
        let mut seen = HashSet::new();
        let items: Vec<Item> = records
            .into_iter()
            .filter(Item::is_usable)
            .filter(|item| seen.insert(item.id))
            .collect();
        if items.len() < total {
            debug!(
                "dropped {} unusable or duplicate catalog records",
                total - items.len()
            );
        }
        Ok(items)
    }
}

impl CatalogProvider for JsonCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Item>> {
        Self::parse(&self.raw)
    }
}

/// Process-lifetime cache in front of a provider.
///
/// Filled by the first successful non-empty fetch and never expired. A failed
/// fetch leaves the cache empty so the next game start retries.
pub struct CatalogCache {
    provider: Box<dyn CatalogProvider>,
    items: Option<Vec<Item>>,
    fetches: u32,
}

impl CatalogCache {
    pub fn new(provider: Box<dyn CatalogProvider>) -> Self {
        CatalogCache {
            provider,
            items: None,
            fetches: 0,
        }
    }

    pub fn items(&mut self) -> Result<&[Item]> {
        if self.items.is_none() {
            self.fetches += 1;
            let fetched = self.provider.fetch_catalog().inspect_err(|err| {
                warn!("catalog fetch failed: {err}");
            })?;
            if fetched.is_empty() {
                warn!("catalog fetch returned no usable items");
                return Err(GameError::catalog("catalog contains no usable items"));
            }
            debug!("cached catalog of {} items", fetched.len());
            self.items = Some(fetched);
        }
        Ok(self.items.as_deref().unwrap_or_default())
    }

    pub fn is_cached(&self) -> bool {
        self.items.is_some()
    }

    /// Number of times the provider has been asked for the catalog.
    pub fn fetch_count(&self) -> u32 {
        self.fetches
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        CatalogCache::new(Box::new(EmojiCatalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Flaky {
        calls: Rc<Cell<u32>>,
        fail_first: bool,
    }

    impl CatalogProvider for Flaky {
        fn fetch_catalog(&self) -> Result<Vec<Item>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_first && self.calls.get() == 1 {
                return Err(GameError::catalog("connection reset"));
            }
            Ok(vec![Item::new(1, "a.png"), Item::new(2, "b.png")])
        }
    }

    #[test]
    fn emoji_catalog_has_unique_positive_ids() {
        let items = EmojiCatalog.fetch_catalog().unwrap();
        assert_eq!(items.len(), EMOJI.len());
        let ids: HashSet<u32> = items.iter().map(|item| item.id).collect();
        assert_eq!(ids.len(), items.len());
        assert!(items.iter().all(|item| item.id > 0));
        assert!(items[0].display_ref.starts_with(EMOJI_PREFIX));
    }

    #[test]
    fn json_catalog_accepts_bare_and_envelope() {
        let bare = r#"[{"id": 1, "displayRef": "one.png"}, {"id": 2, "displayRef": "two.png"}]"#;
        assert_eq!(JsonCatalog::parse(bare).unwrap().len(), 2);

        let wrapped = r#"{"count": 1, "results": [{"id": 7, "image": "seven.png"}]}"#;
        let items = JsonCatalog::parse(wrapped).unwrap();
        assert_eq!(items, vec![Item::new(7, "seven.png")]);
    }

    #[test]
    fn json_catalog_drops_unusable_and_duplicate_records() {
        let raw = r#"[
            {"id": 0, "displayRef": "zero.png"},
            {"id": 3, "displayRef": "  "},
            {"id": 4, "displayRef": "four.png"},
            {"id": 4, "displayRef": "four-again.png"}
        ]"#;
        let items = JsonCatalog::parse(raw).unwrap();
        assert_eq!(items, vec![Item::new(4, "four.png")]);
    }

    #[test]
    fn json_catalog_reports_malformed_documents() {
        let err = JsonCatalog::parse("{not json").unwrap_err();
        assert!(matches!(err, GameError::CatalogUnavailable { .. }));
    }

    #[test]
    fn cache_fetches_once() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = CatalogCache::new(Box::new(Flaky {
            calls: calls.clone(),
            fail_first: false,
        }));
        assert_eq!(cache.items().unwrap().len(), 2);
        assert_eq!(cache.items().unwrap().len(), 2);
        assert_eq!(calls.get(), 1);
        assert!(cache.is_cached());
    }

    #[test]
    fn cache_retries_after_failure() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = CatalogCache::new(Box::new(Flaky {
            calls: calls.clone(),
            fail_first: true,
        }));
        assert!(cache.items().is_err());
        assert!(!cache.is_cached());
        assert_eq!(cache.items().unwrap().len(), 2);
        assert_eq!(cache.fetch_count(), 2);
    }

    #[test]
    fn empty_catalog_is_unavailable() {
        let mut cache = CatalogCache::new(Box::new(JsonCatalog::new("[]")));
        assert!(matches!(
            cache.items(),
            Err(GameError::CatalogUnavailable { .. })
        ));
    }
}
