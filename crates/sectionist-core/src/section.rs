use std::collections::HashMap;

use serde::{Serialize, Serializer};

/// A titled span of document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// Ordered title → content mapping with last-write-wins on title collision.
///
/// Iteration follows first insertion of each title. Re-inserting an existing
/// title replaces its content in place; it does not move the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<Section>,
    index: HashMap<String, usize>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `title`. Returns the content it replaced, if any.
    pub fn insert(&mut self, title: impl Into<String>, content: impl Into<String>) -> Option<String> {
        let title = title.into();
        let content = content.into();
        match self.index.get(&title) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].content, content)),
            None => {
                self.index.insert(title.clone(), self.entries.len());
                self.entries.push(Section { title, content });
                None
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.index
            .get(title)
            .map(|&pos| self.entries[pos].content.as_str())
    }

    pub fn contains_key(&self, title: &str) -> bool {
        self.index.contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(title, content)` pairs in reading order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|s| (s.title.as_str(), s.content.as_str()))
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.title.as_str())
    }

    pub fn sections(&self) -> &[Section] {
        &self.entries
    }

    /// A new map holding only the entries for which `keep` returns true,
    /// order preserved.
    pub fn filter(&self, mut keep: impl FnMut(&str, &str) -> bool) -> SectionMap {
        self.iter()
            .filter(|(title, content)| keep(title, content))
            .map(|(t, c)| (t.to_string(), c.to_string()))
            .collect()
    }
}

impl<T: Into<String>, C: Into<String>> FromIterator<(T, C)> for SectionMap {
    fn from_iter<I: IntoIterator<Item = (T, C)>>(iter: I) -> Self {
        let mut map = SectionMap::new();
        for (title, content) in iter {
            map.insert(title, content);
        }
        map
    }
}

impl IntoIterator for SectionMap {
    type Item = Section;
    type IntoIter = std::vec::IntoIter<Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}
