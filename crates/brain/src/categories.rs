//! Named lists of string items, kept in a single `GLOBAL/categories` document.
//!
//! A plugin registers default items for a category (say, reaction gifs), users
//! add or remove items at runtime, and the plugin picks a random one when it
//! fires. Items are opaque strings: phrases, links, or serialized objects.

use std::collections::BTreeMap;

use {rand::seq::IndexedRandom, serde_json::Value, tracing::debug};

use crate::{Brain, Error, Namespace, Result};

const CATEGORY_KEY: &str = "categories";

type CategoryMap = BTreeMap<String, Vec<String>>;

fn categories_path() -> String {
    Namespace::Global.physical_key(CATEGORY_KEY)
}

fn decode(value: Option<Value>) -> Result<CategoryMap> {
    match value {
        None | Some(Value::Null) => Ok(CategoryMap::new()),
        Some(value) => {
            serde_json::from_value(value).map_err(|e| Error::malformed(categories_path(), e))
        },
    }
}

fn encode(categories: &CategoryMap) -> Result<Value> {
    Ok(serde_json::to_value(categories)?)
}

impl Brain {
    async fn categories(&self) -> Result<CategoryMap> {
        let current = self
            .get(&Namespace::Global, CATEGORY_KEY)
            .await?
            .map(|fetched| fetched.into_value());
        decode(current)
    }

    /// Names of every category, sorted.
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        Ok(self.categories().await?.into_keys().collect())
    }

    /// Items of `category` in insertion order; empty if it does not exist.
    pub async fn list_items_in_category(&self, category: &str) -> Result<Vec<String>> {
        Ok(self
            .categories()
            .await?
            .remove(category)
            .unwrap_or_default())
    }

    /// Append `item`, creating the category if needed.
    pub async fn add_item_to_category(&self, category: &str, item: &str) -> Result<()> {
        self.mutate(&Namespace::Global, CATEGORY_KEY, |current| {
            let mut categories = decode(current)?;
            categories
                .entry(category.to_string())
                .or_default()
                .push(item.to_string());
            encode(&categories).map(Some)
        })
        .await?;
        Ok(())
    }

    /// Remove the item at `index`, shifting later items down.
    ///
    /// Negative indices are rejected with [`Error::NegativeIndex`]. An index
    /// past the end, or an unknown category, changes nothing. Returns the
    /// removed item.
    pub async fn remove_item_at_index_in_category(
        &self,
        category: &str,
        index: i64,
    ) -> Result<Option<String>> {
        let Ok(index) = usize::try_from(index) else {
            return Err(Error::NegativeIndex { index });
        };
        let mut removed = None;
        self.mutate(&Namespace::Global, CATEGORY_KEY, |current| {
            removed = None;
            let mut categories = decode(current)?;
            let Some(items) = categories.get_mut(category) else {
                return Ok(None);
            };
            if index >= items.len() {
                return Ok(None);
            }
            removed = Some(items.remove(index));
            encode(&categories).map(Some)
        })
        .await?;
        Ok(removed)
    }

    /// A uniformly random item, or `None` for an empty or unknown category.
    pub async fn get_random_item_from_category(&self, category: &str) -> Result<Option<String>> {
        let items = self.list_items_in_category(category).await?;
        Ok(items.choose(&mut rand::rng()).cloned())
    }

    /// Seed `category` with `items` unless it already holds at least one item.
    ///
    /// Safe to call on every start. Returns whether the defaults were written.
    pub async fn register_defaults_for_category(
        &self,
        category: &str,
        items: &[&str],
    ) -> Result<bool> {
        let seeded = self
            .mutate(&Namespace::Global, CATEGORY_KEY, |current| {
                let mut categories = decode(current)?;
                if categories.get(category).is_some_and(|v| !v.is_empty()) {
                    return Ok(None);
                }
                categories.insert(
                    category.to_string(),
                    items.iter().map(|s| (*s).to_string()).collect(),
                );
                encode(&categories).map(Some)
            })
            .await?;
        if seeded {
            debug!(category, count = items.len(), "loaded category defaults");
        }
        Ok(seeded)
    }
}
