use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, Result};

/// Category used when the caller does not name one.
pub const DEFAULT_CATEGORY: &str = "general";

/// One key/value fact.  Keys are unique within their category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A named, ordered group of entries (oldest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub entries: Vec<Entry>,
}

/// Category name → ordered entries, iterated in first-seen category order.
///
/// Backed by a `Vec` rather than a hash map: iteration order is part of the
/// contract (`categories()`, index tie-breaks, file layout) and the number of
/// categories stays small.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMap {
    categories: Vec<Category>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[Entry]> {
        self.categories
            .iter()
            .find(|category| category.name == name)
            .map(|category| category.entries.as_slice())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Entry>> {
        self.categories
            .iter_mut()
            .find(|category| category.name == name)
            .map(|category| &mut category.entries)
    }

    /// Entries of `name`, creating the category at the end when absent.
    pub fn entries_mut(&mut self, name: &str) -> &mut Vec<Entry> {
        let pos = match self.categories.iter().position(|c| c.name == name) {
            Some(pos) => pos,
            None => {
                self.categories.push(Category {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        &mut self.categories[pos].entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Entry])> {
        self.categories
            .iter()
            .map(|category| (category.name.as_str(), category.entries.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<Entry>)> {
        self.categories
            .iter_mut()
            .map(|category| (category.name.as_str(), &mut category.entries))
    }

    /// Flattened `(category, entry)` pairs in category order, then entry order.
    pub fn triples(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.categories.iter().flat_map(|category| {
            category
                .entries
                .iter()
                .map(move |entry| (category.name.as_str(), entry))
        })
    }

    /// Number of categories, empty ones included.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }
}

/// A ranked answer to a recall query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallHit {
    pub category: String,
    pub key: String,
    pub value: String,
    /// Blended relevance in `[0, 1]`.
    pub score: f64,
}

/// A timestamped note in a daily log.  Logs are append-only and never indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub text: String,
}

/// Lower-cased, trimmed category name.
pub fn normalize_category(category: &str) -> Result<String> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(MemoryError::invalid("category must not be blank"));
    }
    if trimmed.contains(['\n', '\r']) {
        return Err(MemoryError::invalid("category must be a single line"));
    }
    Ok(trimmed.to_lowercase())
}

/// Reject keys and values the Markdown store cannot represent on one line.
pub fn validate_entry(key: &str, value: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(MemoryError::invalid("key must not be blank"));
    }
    if key.contains(['\n', '\r']) {
        return Err(MemoryError::invalid("key must be a single line"));
    }
    if key.contains("**") {
        return Err(MemoryError::invalid("key must not contain `**`"));
    }
    if value.trim().is_empty() {
        return Err(MemoryError::invalid(format!("value for `{key}` must not be blank")));
    }
    if value.contains(['\n', '\r']) {
        return Err(MemoryError::invalid(format!("value for `{key}` must be a single line")));
    }
    Ok(())
}

/// Truncate `s` to at most `max_chars` Unicode scalar values, returning a
/// sub-slice.
pub fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_mut_appends_new_categories_in_order() {
        let mut map = CategoryMap::new();
        map.entries_mut("profile").push(Entry::new("name", "Alice"));
        map.entries_mut("config").push(Entry::new("host", "db"));
        map.entries_mut("profile").push(Entry::new("lang", "Rust"));

        assert_eq!(map.names().collect::<Vec<_>>(), vec!["profile", "config"]);
        assert_eq!(map.get("profile").map(<[Entry]>::len), Some(2));
        assert_eq!(map.total_entries(), 3);
    }

    #[test]
    fn triples_follow_category_then_entry_order() {
        let mut map = CategoryMap::new();
        map.entries_mut("b").push(Entry::new("k1", "v1"));
        map.entries_mut("a").push(Entry::new("k2", "v2"));
        map.entries_mut("b").push(Entry::new("k3", "v3"));

        let keys: Vec<_> = map.triples().map(|(cat, e)| (cat, e.key.as_str())).collect();
        assert_eq!(keys, vec![("b", "k1"), ("b", "k3"), ("a", "k2")]);
    }

    #[test]
    fn normalize_category_lowercases_and_trims() {
        assert_eq!(normalize_category("  Config ").unwrap(), "config");
        assert!(normalize_category("   ").unwrap_err().is_invalid_input());
        assert!(normalize_category("a\nb").is_err());
    }

    #[test]
    fn validate_entry_rejects_unrepresentable_text() {
        assert!(validate_entry("host", "localhost").is_ok());
        assert!(validate_entry("", "x").is_err());
        assert!(validate_entry("a**b", "x").is_err());
        assert!(validate_entry("k", "line one\nline two").is_err());
        assert!(validate_entry("k", "  ").is_err());
    }

    #[test]
    fn recall_hit_serializes_with_flat_fields() {
        let hit = RecallHit {
            category: "config".to_string(),
            key: "database_host".to_string(),
            value: "localhost:5432".to_string(),
            score: 0.75,
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["key"], "database_host");
        assert_eq!(json["category"], "config");
        assert_eq!(json["score"], 0.75);
    }

    #[test]
    fn truncate_str_counts_chars_not_bytes() {
        assert_eq!(truncate_str("héllo", 2), "hé");
        assert_eq!(truncate_str("abc", 10), "abc");
    }
}
