//! Wire records for the morph document JSON format.
//!
//! Records keep track of which keys a document actually carried: a decoded
//! child document only overrides the fields it names, and the differential
//! encoder only fills the fields that differ from the parent. Serialization
//! writes keys case-exact in this order:
//!
//! ```json
//! { "Name": "", "Prototype": "",
//!   "Morphs": [{ "NameInternal": "", "Name": "", "HasNegativeValues": false,
//!                "Category": "", "Value": 0.0 }],
//!   "Peripherals": [{ "ResourcePath": "", "Name": "", "Bone": "", "Enabled": false,
//!                     "Offset_X": 0.0, "Offset_Y": 0.0, "Offset_Z": 0.0,
//!                     "Scale_X": 0.0, "Scale_Y": 0.0, "Scale_Z": 0.0 }] }
//! ```

use serde::Serialize;

use crate::model::{Morph, MorphDocument, Peripheral, Vec3};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MorphRecord {
    #[serde(rename = "NameInternal")]
    pub internal_name: String,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "HasNegativeValues", skip_serializing_if = "Option::is_none")]
    pub has_negative_values: Option<bool>,
    #[serde(rename = "Category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PeripheralRecord {
    #[serde(rename = "ResourcePath")]
    pub resource_path: String,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Bone", skip_serializing_if = "Option::is_none")]
    pub bone: Option<String>,
    #[serde(rename = "Enabled", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "Offset_X", skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(rename = "Offset_Y", skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
    #[serde(rename = "Offset_Z", skip_serializing_if = "Option::is_none")]
    pub offset_z: Option<f64>,
    #[serde(rename = "Scale_X", skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(rename = "Scale_Y", skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    #[serde(rename = "Scale_Z", skip_serializing_if = "Option::is_none")]
    pub scale_z: Option<f64>,
}

impl PeripheralRecord {
    pub(crate) fn set_offset(&mut self, v: Vec3) {
        self.offset_x = Some(v.x);
        self.offset_y = Some(v.y);
        self.offset_z = Some(v.z);
    }

    pub(crate) fn set_scale(&mut self, v: Vec3) {
        self.scale_x = Some(v.x);
        self.scale_y = Some(v.y);
        self.scale_z = Some(v.z);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DocumentRecord {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Prototype", skip_serializing_if = "Option::is_none")]
    pub prototype: Option<String>,
    #[serde(rename = "Morphs")]
    pub morphs: Vec<MorphRecord>,
    #[serde(rename = "Peripherals")]
    pub peripherals: Vec<PeripheralRecord>,
}

impl DocumentRecord {
    /// The declared prototype path; omitted means no ancestor.
    pub fn prototype_path(&self) -> &str {
        self.prototype.as_deref().unwrap_or_default()
    }

    /// Fill absent keys with their defaults.
    pub fn into_document(self) -> MorphDocument {
        MorphDocument {
            name: self.name.unwrap_or_default(),
            prototype_path: self.prototype.unwrap_or_default(),
            morphs: self.morphs.iter().map(Morph::from).collect(),
            peripherals: self.peripherals.iter().map(Peripheral::from).collect(),
        }
    }
}

impl From<&MorphRecord> for Morph {
    fn from(r: &MorphRecord) -> Self {
        Morph {
            name: r.name.clone().unwrap_or_default(),
            internal_name: r.internal_name.clone(),
            category: r.category.clone().unwrap_or_default(),
            has_negative_values: r.has_negative_values.unwrap_or_default(),
            value: r.value.unwrap_or_default(),
        }
    }
}

impl From<&PeripheralRecord> for Peripheral {
    fn from(r: &PeripheralRecord) -> Self {
        Peripheral {
            name: r.name.clone().unwrap_or_default(),
            bone: r.bone.clone().unwrap_or_default(),
            resource_path: r.resource_path.clone(),
            enabled: r.enabled.unwrap_or_default(),
            offset: Vec3::new(
                r.offset_x.unwrap_or_default(),
                r.offset_y.unwrap_or_default(),
                r.offset_z.unwrap_or_default(),
            ),
            scale: Vec3::new(
                r.scale_x.unwrap_or_default(),
                r.scale_y.unwrap_or_default(),
                r.scale_z.unwrap_or_default(),
            ),
        }
    }
}
