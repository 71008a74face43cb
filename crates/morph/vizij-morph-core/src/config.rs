//! Core configuration for vizij-morph-core.

use serde::{Deserialize, Serialize};

use crate::model::CATEGORY_DELIMITER;

/// What the resolver does when a document is missing or fails to decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingDocumentPolicy {
    /// Treat the document as empty and log a warning.
    #[default]
    Empty,
    /// Fail resolution with `ResolveError::NotFound` / `ResolveError::Decode`.
    Error,
}

/// Options for [`crate::randomize`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RandomizeOptions {
    /// Morphs whose internal name starts with one of these are left alone.
    pub excluded_prefixes: Vec<String>,
}

impl Default for RandomizeOptions {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec!["hairline".to_string()],
        }
    }
}

/// Resolution and editing configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Keep ancestor morphs/peripherals that a derived document does not name.
    pub include_unmatched: bool,
    /// Longest prototype chain accepted before resolution fails.
    pub max_depth: usize,
    pub missing_documents: MissingDocumentPolicy,
    /// Separator between nested category names.
    pub category_delimiter: char,
    pub randomize: RandomizeOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_unmatched: false,
            max_depth: 64,
            missing_documents: MissingDocumentPolicy::Empty,
            category_delimiter: CATEGORY_DELIMITER,
            randomize: RandomizeOptions::default(),
        }
    }
}

impl Config {
    pub fn with_include_unmatched(mut self, include_unmatched: bool) -> Self {
        self.include_unmatched = include_unmatched;
        self
    }
}
