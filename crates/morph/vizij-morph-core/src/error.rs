//! Error types for decoding, resolving and encoding morph documents.

use std::fmt;

use thiserror::Error;

/// JSON token kinds, used to report what the decoder found versus what a
/// recognized key requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    ObjectStart,
    ArrayStart,
    String,
    Int,
    Double,
    Boolean,
    Null,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::ObjectStart => "ObjectStart",
            TokenKind::ArrayStart => "ArrayStart",
            TokenKind::String => "String",
            TokenKind::Int => "Int",
            TokenKind::Double => "Double",
            TokenKind::Boolean => "Boolean",
            TokenKind::Null => "Null",
        };
        f.write_str(s)
    }
}

/// Decoding failures. A failed decode never yields a partial document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("malformed json at line {line} column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("every value in a morph document must be a named property (found {found})")]
    UnnamedProperty { found: TokenKind },
    #[error("incorrect data type for property \"{key}\": {found} (expected {expected})")]
    TypeMismatch {
        key: String,
        expected: TokenKind,
        found: TokenKind,
    },
    #[error("\"{key}\" array must only contain objects (found {found} at index {index})")]
    ElementNotObject {
        key: String,
        index: usize,
        found: TokenKind,
    },
}

impl DecodeError {
    /// The offending key, when the failure is tied to one.
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodeError::TypeMismatch { key, .. } | DecodeError::ElementNotObject { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Syntax {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        }
    }
}

/// Prototype chain resolution failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("cyclic prototype chain at '{path}': {}", chain.join(" -> "))]
    CyclicPrototype { path: String, chain: Vec<String> },
    #[error("prototype chain starting at '{path}' is deeper than {max_depth}")]
    DepthExceeded { path: String, max_depth: usize },
    #[error("morph document not found: '{path}'")]
    NotFound { path: String },
    #[error("morph document '{path}' failed to decode: {source}")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },
}

impl ResolveError {
    /// Path of the document where resolution stopped.
    pub fn path(&self) -> &str {
        match self {
            ResolveError::CyclicPrototype { path, .. }
            | ResolveError::DepthExceeded { path, .. }
            | ResolveError::NotFound { path }
            | ResolveError::Decode { path, .. } => path,
        }
    }
}

/// Differential encoding failures. Encoding produces the whole text or
/// nothing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("failed to resolve parent '{parent}': {source}")]
    Resolve {
        parent: String,
        #[source]
        source: ResolveError,
    },
    #[error("cannot write non-finite {field} for '{key}'")]
    NonFinite { key: String, field: &'static str },
    #[error("cannot save {mode} to '{target}': {reason}")]
    InvalidSaveTarget {
        mode: crate::session::SaveMode,
        target: String,
        reason: &'static str,
    },
    #[error("serialize morph document: {0}")]
    Serialize(String),
}
