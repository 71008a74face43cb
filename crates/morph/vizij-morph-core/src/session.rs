//! Edit session: one loaded document, its origin, and save rules.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::apply::MorphTarget;
use crate::category::CategoryTree;
use crate::config::Config;
use crate::encode::encode_with;
use crate::error::{EncodeError, ResolveError};
use crate::model::{Change, MorphDocument, Vec3};
use crate::resolve::Resolver;
use crate::source::DocumentSource;

/// Which ancestor a save is written against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// Standalone snapshot with no prototype.
    Absolute,
    /// Child of the loaded document; only changes are written.
    Derivative,
    /// Shares the loaded document's prototype; only changes are written.
    Sibling,
}

impl fmt::Display for SaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SaveMode::Absolute => "absolute",
            SaveMode::Derivative => "derivative",
            SaveMode::Sibling => "sibling",
        })
    }
}

#[derive(Clone, Debug)]
pub struct EditSession {
    datafile_path: String,
    prototype_path: String,
    document: MorphDocument,
    modified: bool,
    config: Config,
}

impl EditSession {
    /// Resolve `path` and clamp every morph into range. A blank path yields
    /// an empty session without touching the source.
    pub fn open<S: DocumentSource + ?Sized>(
        source: &S,
        path: &str,
        config: Config,
    ) -> Result<Self, ResolveError> {
        if path.trim().is_empty() {
            debug!("ignoring blank morph document path");
            return Ok(Self::from_document(String::new(), MorphDocument::empty(), config));
        }
        debug!("loading morph document '{path}'");
        let document = Resolver::new(source, config.clone()).resolve(path)?;
        Ok(Self::from_document(path.to_string(), document, config))
    }

    /// Wrap an already resolved document loaded from `datafile_path`.
    pub fn from_document(
        datafile_path: impl Into<String>,
        mut document: MorphDocument,
        config: Config,
    ) -> Self {
        document.clamp_values();
        Self {
            datafile_path: datafile_path.into(),
            prototype_path: document.prototype_path.clone(),
            document,
            modified: false,
            config,
        }
    }

    pub fn datafile_path(&self) -> &str {
        &self.datafile_path
    }

    pub fn prototype_path(&self) -> &str {
        &self.prototype_path
    }

    pub fn document(&self) -> &MorphDocument {
        &self.document
    }

    pub fn into_document(self) -> MorphDocument {
        self.document
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether anything was edited since the document was opened.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name != self.document.name {
            self.document.name = name;
            self.modified = true;
        }
    }

    pub fn morph_value(&self, index: usize) -> Option<f64> {
        self.document.morphs.get(index).map(|m| m.value)
    }

    pub fn categories(&self) -> CategoryTree {
        CategoryTree::build(&self.document, self.config.category_delimiter)
    }

    /// Push every morph weight and peripheral state to `target`.
    pub fn apply_all(&self, target: &mut dyn MorphTarget) {
        for m in &self.document.morphs {
            target.apply_morph_weight(&m.internal_name, m.value);
        }
        for p in &self.document.peripherals {
            target.set_peripheral_active(p);
        }
    }

    pub fn set_morph_value(
        &mut self,
        index: usize,
        value: f64,
        target: &mut dyn MorphTarget,
    ) -> Option<Change<f64>> {
        let change = self.document.set_morph_value(index, value)?;
        self.modified = true;
        let m = &self.document.morphs[index];
        target.apply_morph_weight(&m.internal_name, change.new);
        Some(change)
    }

    pub fn set_peripheral_enabled(
        &mut self,
        index: usize,
        enabled: bool,
        target: &mut dyn MorphTarget,
    ) -> Option<Change<bool>> {
        let change = self.document.set_peripheral_enabled(index, enabled)?;
        self.peripheral_changed(index, target);
        Some(change)
    }

    pub fn set_peripheral_offset(
        &mut self,
        index: usize,
        offset: Vec3,
        target: &mut dyn MorphTarget,
    ) -> Option<Change<Vec3>> {
        let change = self.document.set_peripheral_offset(index, offset)?;
        self.peripheral_changed(index, target);
        Some(change)
    }

    pub fn set_peripheral_scale(
        &mut self,
        index: usize,
        scale: Vec3,
        target: &mut dyn MorphTarget,
    ) -> Option<Change<Vec3>> {
        let change = self.document.set_peripheral_scale(index, scale)?;
        self.peripheral_changed(index, target);
        Some(change)
    }

    fn peripheral_changed(&mut self, index: usize, target: &mut dyn MorphTarget) {
        self.modified = true;
        target.set_peripheral_active(&self.document.peripherals[index]);
    }

    /// Parent path a save in `mode` is written against.
    pub fn parent_path(&self, mode: SaveMode) -> &str {
        match mode {
            SaveMode::Absolute => "",
            SaveMode::Derivative => &self.datafile_path,
            SaveMode::Sibling => &self.prototype_path,
        }
    }

    /// Encode the current document against the parent picked by `mode`.
    pub fn save<S: DocumentSource + ?Sized>(
        &self,
        mode: SaveMode,
        source: &S,
    ) -> Result<String, EncodeError> {
        let parent = self.parent_path(mode);
        let mut resolver = Resolver::new(source, self.config.clone());
        encode_with(&mut resolver, &self.document, parent)
    }

    /// Check that a document saved in `mode` at `target_path` would not
    /// name itself as its prototype.
    pub fn check_save_target(&self, mode: SaveMode, target_path: &str) -> Result<(), EncodeError> {
        let invalid = |reason| {
            Err(EncodeError::InvalidSaveTarget {
                mode,
                target: target_path.to_string(),
                reason,
            })
        };
        if target_path.trim().is_empty() {
            return invalid("save path is empty");
        }
        match mode {
            SaveMode::Absolute => Ok(()),
            SaveMode::Derivative if self.datafile_path.is_empty() => {
                invalid("no document is loaded")
            }
            SaveMode::Derivative if target_path == self.datafile_path => {
                invalid("a derivative cannot overwrite its own prototype")
            }
            SaveMode::Sibling if self.prototype_path.is_empty() => {
                invalid("the loaded document has no prototype")
            }
            SaveMode::Sibling if target_path == self.prototype_path => {
                invalid("a sibling cannot overwrite its own prototype")
            }
            SaveMode::Derivative | SaveMode::Sibling => Ok(()),
        }
    }

    /// [`check_save_target`](Self::check_save_target) followed by
    /// [`save`](Self::save). The caller writes the text to `target_path`.
    pub fn save_as<S: DocumentSource + ?Sized>(
        &self,
        mode: SaveMode,
        target_path: &str,
        source: &S,
    ) -> Result<String, EncodeError> {
        self.check_save_target(mode, target_path)?;
        self.save(mode, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::NullTarget;
    use crate::source::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new()
            .with(
                "base",
                r#"{ "Name": "Base", "Morphs": [
                    { "NameInternal": "a", "Value": 1.5 },
                    { "NameInternal": "b", "HasNegativeValues": true, "Value": -0.5 },
                    { "NameInternal": "c", "Value": -0.5 } ] }"#,
            )
            .with(
                "child",
                r#"{ "Prototype": "base", "Morphs": [
                    { "NameInternal": "a", "Value": 0.5 }, { "NameInternal": "b" } ] }"#,
            )
    }

    #[test]
    fn open_clamps_loaded_values() {
        let s = EditSession::open(&source(), "base", Config::default()).unwrap();
        assert_eq!(s.morph_value(0), Some(1.0));
        assert_eq!(s.morph_value(1), Some(-0.5));
        assert_eq!(s.morph_value(2), Some(0.0));
        assert!(!s.is_modified());
        assert_eq!(s.prototype_path(), "");
    }

    #[test]
    fn blank_path_is_an_empty_session() {
        let s = EditSession::open(&source(), "  ", Config::default()).unwrap();
        assert!(s.document().is_empty());
        assert_eq!(s.datafile_path(), "");
    }

    #[test]
    fn setters_mark_modified_only_on_change() {
        let mut s = EditSession::open(&source(), "child", Config::default()).unwrap();
        assert_eq!(s.set_morph_value(0, 0.5, &mut NullTarget), None);
        assert!(!s.is_modified());
        assert_eq!(s.set_morph_value(0, -0.2, &mut NullTarget), None);
        assert!(!s.is_modified());
        s.set_morph_value(0, 0.9, &mut NullTarget).unwrap();
        assert!(s.is_modified());
    }

    #[test]
    fn parent_paths_follow_save_mode() {
        let s = EditSession::open(&source(), "child", Config::default()).unwrap();
        assert_eq!(s.parent_path(SaveMode::Absolute), "");
        assert_eq!(s.parent_path(SaveMode::Derivative), "child");
        assert_eq!(s.parent_path(SaveMode::Sibling), "base");
    }

    #[test]
    fn save_targets_that_would_self_reference_are_rejected() {
        let root = EditSession::open(&source(), "base", Config::default()).unwrap();
        assert!(root.check_save_target(SaveMode::Sibling, "other").is_err());
        assert!(root.check_save_target(SaveMode::Derivative, "base").is_err());
        assert!(root.check_save_target(SaveMode::Derivative, "other").is_ok());
        assert!(root.check_save_target(SaveMode::Absolute, "base").is_ok());
        assert!(root.check_save_target(SaveMode::Absolute, "").is_err());

        let child = EditSession::open(&source(), "child", Config::default()).unwrap();
        let err = child
            .save_as(SaveMode::Sibling, "base", &source())
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::InvalidSaveTarget {
                mode: SaveMode::Sibling,
                ..
            }
        ));
        assert!(child.save_as(SaveMode::Sibling, "child2", &source()).is_ok());
    }

    #[test]
    fn save_mode_round_trips_through_serde() {
        let mode: SaveMode = serde_json::from_str("\"sibling\"").unwrap();
        assert_eq!(mode, SaveMode::Sibling);
        assert_eq!(mode.to_string(), "sibling");
    }
}
