//! Prototype chain resolution.
//!
//! A document names at most one prototype. Resolving a path loads the raw
//! document, resolves its prototype first, then lays the raw document's
//! elements over the ancestor's effective elements. Only ancestor elements
//! survive: a derived document can change inherited morphs and peripherals
//! but never introduce new ones, and by default an ancestor element the
//! derived document does not name is dropped as well.

use hashbrown::HashMap;
use log::{debug, warn};

use crate::config::{Config, MissingDocumentPolicy};
use crate::decode::decode_record;
use crate::element::merge;
use crate::error::ResolveError;
use crate::model::MorphDocument;
use crate::source::DocumentSource;
use crate::wire::DocumentRecord;

/// Resolve `path` against `source` with default settings.
pub fn resolve<S: DocumentSource + ?Sized>(
    source: &S,
    path: &str,
    include_unmatched: bool,
) -> Result<MorphDocument, ResolveError> {
    Resolver::new(source, Config::default().with_include_unmatched(include_unmatched))
        .resolve(path)
}

/// Resolves prototype chains, memoizing effective documents by path.
///
/// The memo lives as long as the resolver, so reuse one resolver for the
/// documents of one operation and drop it afterwards; edits to the source
/// are not observed by an existing resolver.
pub struct Resolver<'s, S: DocumentSource + ?Sized> {
    source: &'s S,
    config: Config,
    resolved: HashMap<String, MorphDocument>,
    in_progress: Vec<String>,
}

impl<'s, S: DocumentSource + ?Sized> Resolver<'s, S> {
    pub fn new(source: &'s S, config: Config) -> Self {
        Self {
            source,
            config,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Effective document at `path`. An empty path is the empty document.
    pub fn resolve(&mut self, path: &str) -> Result<MorphDocument, ResolveError> {
        if path.is_empty() {
            return Ok(MorphDocument::empty());
        }
        if let Some(doc) = self.resolved.get(path) {
            return Ok(doc.clone());
        }
        if self.in_progress.iter().any(|p| p == path) {
            let mut chain = self.in_progress.clone();
            chain.push(path.to_string());
            self.in_progress.clear();
            return Err(ResolveError::CyclicPrototype {
                path: path.to_string(),
                chain,
            });
        }
        if self.in_progress.len() >= self.config.max_depth {
            let start = self.in_progress.first().cloned().unwrap_or_default();
            self.in_progress.clear();
            return Err(ResolveError::DepthExceeded {
                path: start,
                max_depth: self.config.max_depth,
            });
        }

        self.in_progress.push(path.to_string());
        let result = self.resolve_uncached(path);
        // A failure further down the chain has already cleared the stack.
        if result.is_ok() {
            self.in_progress.pop();
        }
        let doc = result?;
        self.resolved.insert(path.to_string(), doc.clone());
        Ok(doc)
    }

    fn resolve_uncached(&mut self, path: &str) -> Result<MorphDocument, ResolveError> {
        let Some(raw) = self.load(path)? else {
            return Ok(MorphDocument::empty());
        };

        let prototype = raw.prototype_path().to_string();
        if prototype.is_empty() {
            debug!("resolved root morph document '{path}'");
            return Ok(raw.into_document());
        }

        let ancestor = self.resolve(&prototype)?;
        let include = self.config.include_unmatched;
        let doc = MorphDocument {
            name: match raw.name {
                Some(name) if !name.is_empty() => name,
                _ => ancestor.name.clone(),
            },
            prototype_path: prototype,
            morphs: merge(&ancestor.morphs, &raw.morphs, include),
            peripherals: merge(&ancestor.peripherals, &raw.peripherals, include),
        };
        debug!(
            "resolved morph document '{path}' over '{}': {} of {} morphs, {} of {} peripherals",
            doc.prototype_path,
            doc.morphs.len(),
            ancestor.morphs.len(),
            doc.peripherals.len(),
            ancestor.peripherals.len()
        );
        Ok(doc)
    }

    /// Raw record at `path`, or `None` when the missing-document policy turns
    /// a missing or broken document into the empty document.
    fn load(&mut self, path: &str) -> Result<Option<DocumentRecord>, ResolveError> {
        let strict = self.config.missing_documents == MissingDocumentPolicy::Error;
        let Some(text) = self.source.load_text(path) else {
            if strict {
                self.in_progress.clear();
                return Err(ResolveError::NotFound {
                    path: path.to_string(),
                });
            }
            warn!("morph document '{path}' not found; using an empty document");
            return Ok(None);
        };
        match decode_record(&text) {
            Ok(raw) => Ok(Some(raw)),
            Err(source) if strict => {
                self.in_progress.clear();
                Err(ResolveError::Decode {
                    path: path.to_string(),
                    source,
                })
            }
            Err(e) => {
                warn!("morph document '{path}' failed to decode ({e}); using an empty document");
                Ok(None)
            }
        }
    }
}
