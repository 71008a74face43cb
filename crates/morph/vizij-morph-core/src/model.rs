//! In-memory morph document model.
//!
//! A [`MorphDocument`] is either a raw decoded document or the effective
//! result of resolving a prototype chain. Mutations go through the setter
//! methods, which return a [`Change`] so callers decide whether to push the
//! new value to a render target.

use serde::{Deserialize, Serialize};

/// Default delimiter between nested category segments (`"Nose>Tip"`).
pub const CATEGORY_DELIMITER: char = '>';

/// Three component vector used for peripheral offsets and scales.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(a: [f64; 3]) -> Self {
        Vec3::new(a[0], a[1], a[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// One named scalar blend parameter.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Morph {
    /// Display label.
    pub name: String,
    /// Identity key across documents and the blend-shape channel stem.
    pub internal_name: String,
    /// `>`-delimited group path; empty means the root group.
    pub category: String,
    /// Range is [-1,1] when set, [0,1] otherwise.
    pub has_negative_values: bool,
    pub value: f64,
}

impl Morph {
    pub fn new(internal_name: impl Into<String>, value: f64) -> Self {
        Self {
            internal_name: internal_name.into(),
            value,
            ..Default::default()
        }
    }

    /// Lower bound of the effective range.
    pub fn min_value(&self) -> f64 {
        if self.has_negative_values {
            -1.0
        } else {
            0.0
        }
    }

    /// Clamp `value` into this morph's effective range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_value(), 1.0)
    }
}

/// One attachable accessory bound to a skeletal joint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Peripheral {
    pub name: String,
    /// Joint name, resolved by the host.
    pub bone: String,
    /// Asset locator; identity key compared case-insensitively.
    pub resource_path: String,
    pub enabled: bool,
    pub offset: Vec3,
    pub scale: Vec3,
}

impl Peripheral {
    pub fn new(resource_path: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            ..Default::default()
        }
    }
}

/// Old and new value reported by a setter that changed something.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Change<T> {
    pub old: T,
    pub new: T,
}

impl<T: PartialEq> Change<T> {
    fn between(old: T, new: T) -> Option<Self> {
        if old == new {
            None
        } else {
            Some(Change { old, new })
        }
    }
}

/// A raw or effective morph document.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MorphDocument {
    pub name: String,
    /// Path of the ancestor document; empty for a root document.
    pub prototype_path: String,
    pub morphs: Vec<Morph>,
    pub peripherals: Vec<Peripheral>,
}

impl MorphDocument {
    /// The "no document" value produced for missing paths.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.prototype_path.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.morphs.is_empty() && self.peripherals.is_empty()
    }

    /// Index of the morph whose `internal_name` equals `internal_name`.
    pub fn morph_index(&self, internal_name: &str) -> Option<usize> {
        self.morphs
            .iter()
            .position(|m| m.internal_name == internal_name)
    }

    pub fn morph(&self, internal_name: &str) -> Option<&Morph> {
        self.morph_index(internal_name).map(|i| &self.morphs[i])
    }

    /// Index of the peripheral whose resource path matches, ignoring case.
    pub fn peripheral_index(&self, resource_path: &str) -> Option<usize> {
        let key = resource_path.to_lowercase();
        self.peripherals
            .iter()
            .position(|p| p.resource_path.to_lowercase() == key)
    }

    pub fn peripheral(&self, resource_path: &str) -> Option<&Peripheral> {
        self.peripheral_index(resource_path)
            .map(|i| &self.peripherals[i])
    }

    /// Set a morph weight.
    ///
    /// Negative input on a morph without negative values is ignored, as is
    /// non-finite input. Everything else is clamped to [-1,1].
    pub fn set_morph_value(&mut self, index: usize, value: f64) -> Option<Change<f64>> {
        let morph = self.morphs.get_mut(index)?;
        if !value.is_finite() || (!morph.has_negative_values && value < 0.0) {
            return None;
        }
        let new = value.clamp(-1.0, 1.0);
        let old = std::mem::replace(&mut morph.value, new);
        Change::between(old, new)
    }

    pub fn set_peripheral_enabled(&mut self, index: usize, enabled: bool) -> Option<Change<bool>> {
        let p = self.peripherals.get_mut(index)?;
        let old = std::mem::replace(&mut p.enabled, enabled);
        Change::between(old, enabled)
    }

    pub fn set_peripheral_offset(&mut self, index: usize, offset: Vec3) -> Option<Change<Vec3>> {
        if !offset.is_finite() {
            return None;
        }
        let p = self.peripherals.get_mut(index)?;
        let old = std::mem::replace(&mut p.offset, offset);
        Change::between(old, offset)
    }

    pub fn set_peripheral_scale(&mut self, index: usize, scale: Vec3) -> Option<Change<Vec3>> {
        if !scale.is_finite() {
            return None;
        }
        let p = self.peripherals.get_mut(index)?;
        let old = std::mem::replace(&mut p.scale, scale);
        Change::between(old, scale)
    }

    /// Clamp every stored morph value into its effective range. Returns the
    /// indexes whose value moved.
    pub fn clamp_values(&mut self) -> Vec<usize> {
        let mut moved = Vec::new();
        for (i, m) in self.morphs.iter_mut().enumerate() {
            let clamped = if m.value.is_nan() { 0.0 } else { m.clamp(m.value) };
            if clamped != m.value {
                m.value = clamped;
                moved.push(i);
            }
        }
        moved
    }
}
