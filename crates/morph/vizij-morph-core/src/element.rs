//! Identity-keyed element strategies shared by the resolver and the encoder.
//!
//! Morphs and peripherals are both lists of records matched across documents
//! by an identity key. [`Element`] describes one such record type; the generic
//! [`merge`] and [`diff`] functions do the list work once for both.

use std::borrow::Cow;

use hashbrown::HashMap;

use crate::model::{Morph, Peripheral};
use crate::wire::{MorphRecord, PeripheralRecord};

pub trait Element: Clone {
    /// Wire form of the element, with optional non-identity fields.
    type Record;

    /// Normalized identity key of an element.
    fn identity(&self) -> Cow<'_, str>;

    /// Normalized identity key of a record.
    fn record_identity(record: &Self::Record) -> Cow<'_, str>;

    /// Override the fields present in `record`.
    fn inherit(&mut self, record: &Self::Record);

    /// Record carrying every field.
    fn full_record(&self) -> Self::Record;

    /// Record carrying the identity key plus the fields that differ from
    /// `parent`.
    fn diff_record(&self, parent: &Self) -> Self::Record;

    /// Name of the first numeric field that cannot be written as JSON.
    fn non_finite_field(&self) -> Option<&'static str>;
}

/// Index of the first occurrence of each identity key.
fn index_by_key<'a, T>(
    items: &'a [T],
    key: impl Fn(&'a T) -> Cow<'a, str>,
) -> HashMap<Cow<'a, str>, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        index.entry(key(item)).or_insert(i);
    }
    index
}

/// Walk `ancestors` in order, overriding each element with the matching
/// record from `overrides`. Unmatched ancestors are kept only when
/// `include_unmatched` is set. Records with no ancestor are never added.
pub fn merge<E: Element>(
    ancestors: &[E],
    overrides: &[E::Record],
    include_unmatched: bool,
) -> Vec<E> {
    let index = index_by_key(overrides, |r| E::record_identity(r));
    let mut out = Vec::with_capacity(ancestors.len());
    for ancestor in ancestors {
        match index.get(ancestor.identity().as_ref()) {
            Some(&i) => {
                let mut merged = ancestor.clone();
                merged.inherit(&overrides[i]);
                out.push(merged);
            }
            None if include_unmatched => out.push(ancestor.clone()),
            None => {}
        }
    }
    out
}

/// Diff each element of `current` against its match in `parent`.
pub fn diff<E: Element>(current: &[E], parent: &[E]) -> Vec<E::Record> {
    let index = index_by_key(parent, |p| p.identity());
    current
        .iter()
        .map(|item| match index.get(item.identity().as_ref()) {
            Some(&i) => item.diff_record(&parent[i]),
            None => item.full_record(),
        })
        .collect()
}

fn changed<T: PartialEq + Clone>(cur: &T, par: &T) -> Option<T> {
    (cur != par).then(|| cur.clone())
}

impl Element for Morph {
    type Record = MorphRecord;

    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.internal_name)
    }

    fn record_identity(record: &MorphRecord) -> Cow<'_, str> {
        Cow::Borrowed(&record.internal_name)
    }

    fn inherit(&mut self, r: &MorphRecord) {
        if let Some(name) = &r.name {
            self.name = name.clone();
        }
        if let Some(category) = &r.category {
            self.category = category.clone();
        }
        if let Some(neg) = r.has_negative_values {
            self.has_negative_values = neg;
        }
        if let Some(value) = r.value {
            self.value = value;
        }
    }

    fn full_record(&self) -> MorphRecord {
        MorphRecord {
            internal_name: self.internal_name.clone(),
            name: Some(self.name.clone()),
            has_negative_values: Some(self.has_negative_values),
            category: Some(self.category.clone()),
            value: Some(self.value),
        }
    }

    fn diff_record(&self, parent: &Morph) -> MorphRecord {
        MorphRecord {
            internal_name: self.internal_name.clone(),
            name: changed(&self.name, &parent.name),
            has_negative_values: changed(&self.has_negative_values, &parent.has_negative_values),
            category: changed(&self.category, &parent.category),
            // Exact comparison: values are stored as f64 and round-trip exactly.
            value: changed(&self.value, &parent.value),
        }
    }

    fn non_finite_field(&self) -> Option<&'static str> {
        (!self.value.is_finite()).then_some("Value")
    }
}

impl Element for Peripheral {
    type Record = PeripheralRecord;

    fn identity(&self) -> Cow<'_, str> {
        Cow::Owned(self.resource_path.to_lowercase())
    }

    fn record_identity(record: &PeripheralRecord) -> Cow<'_, str> {
        Cow::Owned(record.resource_path.to_lowercase())
    }

    fn inherit(&mut self, r: &PeripheralRecord) {
        if let Some(name) = &r.name {
            self.name = name.clone();
        }
        if let Some(bone) = &r.bone {
            self.bone = bone.clone();
        }
        if let Some(enabled) = r.enabled {
            self.enabled = enabled;
        }
        let axes = [
            (r.offset_x, &mut self.offset.x),
            (r.offset_y, &mut self.offset.y),
            (r.offset_z, &mut self.offset.z),
            (r.scale_x, &mut self.scale.x),
            (r.scale_y, &mut self.scale.y),
            (r.scale_z, &mut self.scale.z),
        ];
        for (src, dst) in axes {
            if let Some(v) = src {
                *dst = v;
            }
        }
    }

    fn full_record(&self) -> PeripheralRecord {
        let mut r = PeripheralRecord {
            resource_path: self.resource_path.clone(),
            name: Some(self.name.clone()),
            bone: Some(self.bone.clone()),
            enabled: Some(self.enabled),
            ..Default::default()
        };
        r.set_offset(self.offset);
        r.set_scale(self.scale);
        r
    }

    fn diff_record(&self, parent: &Peripheral) -> PeripheralRecord {
        PeripheralRecord {
            resource_path: self.resource_path.clone(),
            name: changed(&self.name, &parent.name),
            bone: changed(&self.bone, &parent.bone),
            enabled: changed(&self.enabled, &parent.enabled),
            offset_x: changed(&self.offset.x, &parent.offset.x),
            offset_y: changed(&self.offset.y, &parent.offset.y),
            offset_z: changed(&self.offset.z, &parent.offset.z),
            scale_x: changed(&self.scale.x, &parent.scale.x),
            scale_y: changed(&self.scale.y, &parent.scale.y),
            scale_z: changed(&self.scale.z, &parent.scale.z),
        }
    }

    fn non_finite_field(&self) -> Option<&'static str> {
        if !self.offset.is_finite() {
            Some("Offset")
        } else if !self.scale.is_finite() {
            Some("Scale")
        } else {
            None
        }
    }
}
