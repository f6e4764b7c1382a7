//! Vocabulary catalog and item identity keys.
//!
//! # Format
//! ```json
//! [
//!   { "character": "你好", "pinyin": "nǐ hǎo", "meaning": "hello", "hskLevel": 1 },
//!   { "character": "学习", "pinyin": "xué xí", "meaning": "to study", "hskLevel": 1 }
//! ]
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Stable identity key for a character/pinyin pair.
pub fn item_key(character: &str, pinyin: &str) -> String {
    format!("{}_{}", character, pinyin)
}

/// One vocabulary entry. Read-only to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub character: String,
    pub pinyin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsk_level: Option<u8>,
}

impl VocabularyItem {
    pub fn new(character: impl Into<String>, pinyin: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            pinyin: pinyin.into(),
            meaning: None,
            hsk_level: None,
        }
    }

    pub fn key(&self) -> String {
        item_key(&self.character, &self.pinyin)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(alias = "hanzi")]
    character: Option<String>,
    pinyin: Option<String>,
    #[serde(alias = "english")]
    meaning: Option<String>,
    #[serde(alias = "level")]
    hsk_level: Option<u8>,
}

impl RawItem {
    fn build(self, index: usize) -> Result<VocabularyItem, CatalogError> {
        let character = non_empty(self.character).ok_or(CatalogError::MissingField {
            index,
            field: "character",
        })?;
        let pinyin = non_empty(self.pinyin).ok_or(CatalogError::MissingField {
            index,
            field: "pinyin",
        })?;

        Ok(VocabularyItem {
            character,
            pinyin,
            meaning: non_empty(self.meaning),
            hsk_level: self.hsk_level,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Ordered collection of vocabulary items with unique keys.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<VocabularyItem>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Parse a JSON array of items.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawItem> = serde_json::from_str(content)?;
        if raw.is_empty() {
            return Err(CatalogError::Empty);
        }

        let items = raw
            .into_iter()
            .enumerate()
            .map(|(index, item)| item.build(index))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_items(items)
    }

    /// Build from already constructed items, rejecting duplicate keys.
    pub fn from_items(items: Vec<VocabularyItem>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let key = item.key();
            if index.insert(key.clone(), position).is_some() {
                return Err(CatalogError::DuplicateKey {
                    key,
                    index: position,
                });
            }
        }
        Ok(Self { items, index })
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&VocabularyItem> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.items.iter().map(VocabularyItem::key)
    }

    /// Items tagged with the given HSK level, in catalog order.
    pub fn by_level(&self, level: u8) -> Vec<&VocabularyItem> {
        self.items
            .iter()
            .filter(|item| item.hsk_level == Some(level))
            .collect()
    }
}
