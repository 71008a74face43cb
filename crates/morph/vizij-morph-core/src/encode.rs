//! Differential encoder.
//!
//! Writes an effective document relative to a parent path: elements the
//! parent does not have are written whole, elements it has are written as
//! their identity key plus the fields whose value differs.

use log::debug;

use crate::config::Config;
use crate::element::{diff, Element};
use crate::error::EncodeError;
use crate::model::MorphDocument;
use crate::resolve::Resolver;
use crate::source::DocumentSource;
use crate::wire::DocumentRecord;

/// Encode `effective` relative to `parent_path` with default settings.
/// An empty parent path writes a full standalone snapshot.
pub fn encode<S: DocumentSource + ?Sized>(
    source: &S,
    effective: &MorphDocument,
    parent_path: &str,
) -> Result<String, EncodeError> {
    encode_with(&mut Resolver::new(source, Config::default()), effective, parent_path)
}

/// Encode using an existing resolver, sharing its configuration and memo.
pub fn encode_with<S: DocumentSource + ?Sized>(
    resolver: &mut Resolver<'_, S>,
    effective: &MorphDocument,
    parent_path: &str,
) -> Result<String, EncodeError> {
    let parent = resolver
        .resolve(parent_path)
        .map_err(|source| EncodeError::Resolve {
            parent: parent_path.to_string(),
            source,
        })?;
    let record = diff_document(effective, &parent, parent_path)?;
    debug!(
        "encoded '{}' over '{parent_path}': {} morphs, {} peripherals",
        effective.name,
        record.morphs.len(),
        record.peripherals.len()
    );
    serde_json::to_string_pretty(&record).map_err(|e| EncodeError::Serialize(e.to_string()))
}

/// Build the wire record for `effective` against an already resolved parent.
pub fn diff_document(
    effective: &MorphDocument,
    parent: &MorphDocument,
    parent_path: &str,
) -> Result<DocumentRecord, EncodeError> {
    check_finite(&effective.morphs, |m| &m.internal_name)?;
    check_finite(&effective.peripherals, |p| &p.resource_path)?;
    Ok(DocumentRecord {
        name: Some(effective.name.clone()),
        prototype: Some(parent_path.to_string()),
        morphs: diff(&effective.morphs, &parent.morphs),
        peripherals: diff(&effective.peripherals, &parent.peripherals),
    })
}

fn check_finite<E: Element>(items: &[E], key: impl Fn(&E) -> &String) -> Result<(), EncodeError> {
    for item in items {
        if let Some(field) = item.non_finite_field() {
            return Err(EncodeError::NonFinite {
                key: key(item).clone(),
                field,
            });
        }
    }
    Ok(())
}
