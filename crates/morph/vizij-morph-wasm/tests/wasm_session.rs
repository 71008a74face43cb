#![cfg(target_arch = "wasm32")]
use js_sys::Function;
use serde_wasm_bindgen as swb;
use vizij_morph_core::MorphDocument;
use vizij_morph_wasm::{abi_version, decode_document, encode_document, resolve_document, VizijMorph};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn loader() -> Function {
    Function::new_with_args(
        "path",
        r#"
        const docs = {
          "base": JSON.stringify({
            Name: "Base",
            Morphs: [
              { NameInternal: "nose_depth", Name: "Nose Depth", Category: "Nose", Value: 0.2 },
              { NameInternal: "jaw_width", HasNegativeValues: true, Category: "Jaw", Value: -0.5 }
            ],
            Peripherals: [ { ResourcePath: "Hats/Cap", Bone: "head", Scale_X: 1, Scale_Y: 1, Scale_Z: 1 } ]
          }),
          "child": JSON.stringify({
            Name: "Child",
            Prototype: "base",
            Morphs: [ { NameInternal: "nose_depth", Value: 0.6 }, { NameInternal: "jaw_width" } ],
            Peripherals: [ { ResourcePath: "hats/cap", Enabled: true } ]
          })
        };
        return docs[path];
        "#,
    )
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(VizijMorph::new(JsValue::UNDEFINED).is_ok());
}

#[wasm_bindgen_test]
fn bad_config_is_an_error() {
    let cfg = swb::to_value(&serde_json::json!({ "max_depth": "deep" })).unwrap();
    assert!(VizijMorph::new(cfg).is_err());
}

#[wasm_bindgen_test]
fn resolve_through_js_loader() {
    let doc = resolve_document("child".into(), loader(), JsValue::NULL).unwrap();
    let doc: MorphDocument = swb::from_value(doc).unwrap();
    assert_eq!(doc.name, "Child");
    assert_eq!(doc.morph("nose_depth").unwrap().value, 0.6);
    assert!(doc.peripherals[0].enabled);
}

#[wasm_bindgen_test]
fn decode_rejects_wrong_types() {
    assert!(decode_document(r#"{ "Name": 3 }"#.into()).is_err());
    assert!(decode_document(r#"{ "Name": "ok" }"#.into()).is_ok());
}

#[wasm_bindgen_test]
fn session_edit_and_derivative_save() {
    let mut morph = VizijMorph::new(JsValue::NULL).unwrap();
    morph.open("child".into(), loader()).unwrap();
    assert_eq!(morph.prototype_path(), "base");
    assert!(morph.set_morph_value(1, 0.25).unwrap());
    assert!(!morph.set_morph_value(0, -0.5).unwrap());
    assert!(morph.is_modified());

    let text = morph.save("derivative".into(), loader()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["Prototype"], "child");
    assert_eq!(
        json["Morphs"],
        serde_json::json!([
            { "NameInternal": "nose_depth" },
            { "NameInternal": "jaw_width", "Value": 0.25 }
        ])
    );
    assert!(morph.save_as("sibling".into(), "base".into(), loader()).is_err());
    assert!(morph.save("sideways".into(), loader()).is_err());
}

#[wasm_bindgen_test]
fn encode_standalone_snapshot() {
    let doc = resolve_document("base".into(), loader(), JsValue::NULL).unwrap();
    let text = encode_document(doc, String::new(), loader(), JsValue::NULL).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["Prototype"], "");
    assert_eq!(json["Morphs"][1]["HasNegativeValues"], true);
}

fn throwing_loader() -> Function {
    Function::new_with_args("path", "throw new Error('disk offline: ' + path);")
}

#[wasm_bindgen_test]
fn throwing_loader_is_reported_not_treated_as_missing() {
    let err = resolve_document("base".into(), throwing_loader(), JsValue::NULL).unwrap_err();
    let message = JsValue::from(err)
        .dyn_into::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap();
    assert!(message.contains("disk offline: base"), "{message}");

    let strict = swb::to_value(&serde_json::json!({ "missing_documents": "error" })).unwrap();
    assert!(resolve_document("base".into(), throwing_loader(), strict).is_err());

    let mut morph = VizijMorph::new(JsValue::NULL).unwrap();
    assert!(morph.open("base".into(), throwing_loader()).is_err());
}

#[wasm_bindgen_test]
fn missing_document_is_still_empty_by_default() {
    let empty = Function::new_no_args("return null;");
    let doc = resolve_document("nowhere".into(), empty, JsValue::NULL).unwrap();
    let doc: MorphDocument = swb::from_value(doc).unwrap();
    assert!(doc.is_empty());
}

#[wasm_bindgen_test]
fn throwing_weight_callback_fails_the_setter_after_storing() {
    let mut morph = VizijMorph::new(JsValue::NULL).unwrap();
    morph.open("child".into(), loader()).unwrap();
    let on_weight = Function::new_with_args("name, value", "throw new Error('renderer gone');");
    morph.set_target(on_weight.into(), JsValue::NULL);

    assert!(morph.set_morph_value(0, 0.9).is_err());
    let doc: MorphDocument = swb::from_value(morph.document().unwrap()).unwrap();
    assert_eq!(doc.morphs[0].value, 0.9);

    // Unchanged values never reach the callback.
    assert!(!morph.set_morph_value(0, 0.9).unwrap());
}

#[wasm_bindgen_test]
fn throwing_peripheral_callback_fails_the_setter() {
    let mut morph = VizijMorph::new(JsValue::NULL).unwrap();
    morph.open("child".into(), loader()).unwrap();
    let on_peripheral = Function::new_with_args("p", "throw new Error('no mount point');");
    morph.set_target(JsValue::NULL, on_peripheral.into());
    assert!(morph.set_peripheral_enabled(0, false).is_err());
    assert!(!morph.set_peripheral_offset(0, 0.0, 0.0, 0.0).unwrap());
}
