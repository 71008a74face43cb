use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    /// Directory (relative to the fixtures root) that document paths resolve against.
    #[serde(rename = "morph-root")]
    morph_root: String,
    #[serde(rename = "morph-documents")]
    morph_documents: HashMap<String, MorphEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MorphEntry {
    Document(String),
    Detailed {
        document: String,
        #[serde(default)]
        effective: Option<String>,
    },
}

impl MorphEntry {
    fn document(&self) -> &str {
        match self {
            MorphEntry::Document(document) => document,
            MorphEntry::Detailed { document, .. } => document,
        }
    }

    fn effective(&self) -> Option<&str> {
        match self {
            MorphEntry::Document(_) => None,
            MorphEntry::Detailed { effective, .. } => effective.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Morph documents laid out by document path under the morph root, so a
/// directory-backed document source can follow their `Prototype` fields.
pub mod morphs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.morph_documents.keys().cloned().collect()
    }

    /// Directory that document paths (e.g. `heads/base`) resolve against.
    pub fn root() -> PathBuf {
        resolve_path(&MANIFEST.morph_root)
    }

    /// Extension-less document path, as written in `Prototype` fields.
    pub fn document_path(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.morph_documents, "morph document", name)?;
        Ok(entry.document().to_string())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let document = document_path(name)?;
        Ok(root().join(format!("{document}.json")))
    }

    pub fn json(name: &str) -> Result<String> {
        let path = path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read fixture at {}", path.display()))
    }

    /// Expected effective document, when the fixture records one.
    pub fn effective<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        let entry = lookup(&MANIFEST.morph_documents, "morph document", name)?;
        match entry.effective() {
            Some(rel) => super::load_json(rel).map(Some),
            None => Ok(None),
        }
    }

    /// Every fixture document as `(document path, text)` pairs.
    pub fn all() -> Result<Vec<(String, String)>> {
        let mut out = Vec::with_capacity(MANIFEST.morph_documents.len());
        for name in keys() {
            out.push((document_path(&name)?, json(&name)?));
        }
        Ok(out)
    }
}
