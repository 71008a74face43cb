//! Mesh application seam.
//!
//! Hosts (renderers, editors) implement [`MorphTarget`] to receive morph
//! weights and peripheral state. Nothing in the engine depends on a target
//! being present.

use serde::Serialize;

use crate::model::{Morph, Peripheral};

/// Host-side receiver of resolved morph values.
pub trait MorphTarget {
    fn apply_morph_weight(&mut self, internal_name: &str, signed_value: f64);
    fn set_peripheral_active(&mut self, peripheral: &Peripheral);
}

/// Target that ignores everything; used when a session has no host attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTarget;

impl MorphTarget for NullTarget {
    fn apply_morph_weight(&mut self, _internal_name: &str, _signed_value: f64) {}
    fn set_peripheral_active(&mut self, _peripheral: &Peripheral) {}
}

/// A blend-shape channel name and its weight in percent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BlendShapeWeight {
    pub channel: String,
    pub weight: f64,
}

/// Map a morph onto the mesh convention used by the head assets: signed
/// morphs are split into `<name>_pos` / `<name>_neg` shapes, and weights
/// are `|value| * 100`.
pub fn blend_shape_weight(morph: &Morph) -> BlendShapeWeight {
    let value = morph.clamp(morph.value);
    let channel = if !morph.has_negative_values {
        morph.internal_name.clone()
    } else if value > 0.0 {
        format!("{}_pos", morph.internal_name)
    } else {
        format!("{}_neg", morph.internal_name)
    };
    BlendShapeWeight {
        channel,
        weight: value.abs() * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morph(neg: bool, value: f64) -> Morph {
        Morph {
            internal_name: "brow_height".into(),
            has_negative_values: neg,
            value,
            ..Default::default()
        }
    }

    #[test]
    fn unsigned_morph_uses_internal_name() {
        let w = blend_shape_weight(&morph(false, 0.25));
        assert_eq!(w.channel, "brow_height");
        assert_eq!(w.weight, 25.0);
    }

    #[test]
    fn signed_morph_picks_side_by_sign() {
        assert_eq!(blend_shape_weight(&morph(true, 0.5)).channel, "brow_height_pos");
        let neg = blend_shape_weight(&morph(true, -0.5));
        assert_eq!(neg.channel, "brow_height_neg");
        assert_eq!(neg.weight, 50.0);
        assert_eq!(blend_shape_weight(&morph(true, 0.0)).channel, "brow_height_neg");
    }

    #[test]
    fn weights_are_clamped() {
        assert_eq!(blend_shape_weight(&morph(false, 3.0)).weight, 100.0);
        assert_eq!(blend_shape_weight(&morph(false, -3.0)).weight, 0.0);
    }
}
