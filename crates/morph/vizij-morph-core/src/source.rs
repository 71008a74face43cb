//! Document retrieval collaborators.
//!
//! The engine never performs I/O itself; a [`DocumentSource`] hands it raw
//! document text by path, or `None` when nothing lives there.

use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use log::debug;

/// Host-supplied document retrieval. Must not panic on missing paths.
pub trait DocumentSource {
    fn load_text(&self, path: &str) -> Option<String>;
}

impl<F> DocumentSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn load_text(&self, path: &str) -> Option<String> {
        self(path)
    }
}

/// In-memory documents keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    docs: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Insert or replace the text stored at `path`. Returns the previous text.
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.docs.insert(path.into(), text.into())
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.docs.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.docs.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentSource for MemorySource {
    fn load_text(&self, path: &str) -> Option<String> {
        self.docs.get(path).cloned()
    }
}

/// Reads `<root>/<path>.json`; document paths carry no extension.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a document path.
    pub fn file_path(&self, path: &str) -> PathBuf {
        self.root
            .join(format!("{}.json", path.trim_start_matches('/')))
    }
}

impl DocumentSource for DirectorySource {
    fn load_text(&self, path: &str) -> Option<String> {
        if path.trim().is_empty() {
            return None;
        }
        let file = self.file_path(path);
        match fs::read_to_string(&file) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("morph document '{path}' unreadable at {}: {e}", file.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_round_trips_text() {
        let mut src = MemorySource::new().with("a", "{}");
        assert_eq!(src.load_text("a").as_deref(), Some("{}"));
        assert_eq!(src.insert("a", "[]").as_deref(), Some("{}"));
        assert!(src.load_text("b").is_none());
        assert_eq!(src.len(), 1);
    }

    #[test]
    fn closures_are_sources() {
        let src = |path: &str| (path == "x").then(|| "{}".to_string());
        assert!(src.load_text("x").is_some());
        assert!(src.load_text("y").is_none());
    }

    #[test]
    fn directory_source_appends_json_extension() {
        let src = DirectorySource::new("/data/morphs");
        assert_eq!(
            src.file_path("heads/base"),
            PathBuf::from("/data/morphs/heads/base.json")
        );
        assert!(src.load_text("").is_none());
        assert!(src.load_text("definitely/not/here").is_none());
    }
}
