use serde_json::Value as JsonValue;
use vizij_morph_core::{
    config::Config, resolve, DirectorySource, DocumentSource, EditSession, MemorySource,
    MorphDocument, NullTarget, SaveMode, Vec3,
};
use vizij_test_fixtures::morphs;

/// Fixture directory with saved documents layered on top.
struct Workspace {
    saved: MemorySource,
    fixtures: DirectorySource,
}

impl Workspace {
    fn new() -> Self {
        Self {
            saved: MemorySource::new(),
            fixtures: DirectorySource::new(morphs::root()),
        }
    }
}

impl DocumentSource for Workspace {
    fn load_text(&self, path: &str) -> Option<String> {
        self.saved
            .load_text(path)
            .or_else(|| self.fixtures.load_text(path))
    }
}

fn open(ws: &Workspace, name: &str) -> EditSession {
    let path = morphs::document_path(name).unwrap();
    EditSession::open(ws, &path, Config::default()).unwrap()
}

fn edit(session: &mut EditSession) {
    let mut target = NullTarget;
    let jaw = session.document().morph_index("jaw_width").unwrap();
    session.set_morph_value(jaw, 0.65, &mut target).unwrap();
    let hat = session.document().peripheral_index("hats/fedora").unwrap();
    session.set_peripheral_enabled(hat, true, &mut target).unwrap();
    session
        .set_peripheral_scale(hat, Vec3::new(1.1, 1.0, 1.1), &mut target)
        .unwrap();
}

fn same_content(a: &MorphDocument, b: &MorphDocument) {
    assert_eq!(a.name, b.name);
    assert_eq!(a.morphs, b.morphs);
    assert_eq!(a.peripherals, b.peripherals);
}

fn save_and_reload(mode: SaveMode, target: &str) -> (EditSession, MorphDocument, JsonValue) {
    let mut ws = Workspace::new();
    let mut session = open(&ws, "round-face");
    edit(&mut session);
    let text = session.save_as(mode, target, &ws).unwrap();
    ws.saved.insert(target, text.clone());
    let reloaded = resolve(&ws, target, false).unwrap();
    (session, reloaded, serde_json::from_str(&text).unwrap())
}

#[test]
fn derivative_save_resolves_back_to_the_edited_document() {
    let (session, reloaded, json) = save_and_reload(SaveMode::Derivative, "heads/round_edit");
    same_content(session.document(), &reloaded);
    assert_eq!(json["Prototype"], "heads/round");
    assert_eq!(reloaded.prototype_path, "heads/round");
}

#[test]
fn sibling_save_resolves_back_to_the_edited_document() {
    let (session, reloaded, json) = save_and_reload(SaveMode::Sibling, "heads/round_twin");
    same_content(session.document(), &reloaded);
    assert_eq!(json["Prototype"], "heads/base");
}

#[test]
fn absolute_save_resolves_back_to_the_edited_document() {
    let (session, reloaded, json) = save_and_reload(SaveMode::Absolute, "heads/snapshot");
    same_content(session.document(), &reloaded);
    assert_eq!(json["Prototype"], "");
    assert!(reloaded.is_root());
}

#[test]
fn derivative_save_only_writes_what_changed() {
    let (_, _, json) = save_and_reload(SaveMode::Derivative, "heads/round_edit");
    let morphs = json["Morphs"].as_array().unwrap();
    assert_eq!(morphs.len(), 6);
    for m in morphs {
        let obj = m.as_object().unwrap();
        if m["NameInternal"] == "jaw_width" {
            assert_eq!(obj.len(), 2);
            assert_eq!(m["Value"], 0.65);
        } else {
            assert_eq!(obj.len(), 1, "unexpected fields in {m}");
        }
    }
    assert_eq!(
        json["Peripherals"],
        serde_json::json!([
            { "ResourcePath": "Glasses/Round" },
            {
                "ResourcePath": "Hats/Fedora", "Enabled": true,
                "Scale_X": 1.1, "Scale_Y": 1.0, "Scale_Z": 1.1
            }
        ])
    );
}

#[test]
fn sibling_save_carries_the_loaded_overrides() {
    let (_, _, json) = save_and_reload(SaveMode::Sibling, "heads/round_twin");
    let cheeks = json["Morphs"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["NameInternal"] == "cheek_fullness")
        .unwrap();
    assert_eq!(
        *cheeks,
        serde_json::json!({ "NameInternal": "cheek_fullness", "Name": "Cheeks", "Value": 0.9 })
    );
}

#[test]
fn unedited_derivative_is_identity_keys_only() {
    let ws = Workspace::new();
    let session = open(&ws, "round-narrow");
    let text = session
        .save_as(SaveMode::Derivative, "heads/round_narrow_copy", &ws)
        .unwrap();
    let json: JsonValue = serde_json::from_str(&text).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "Name": "Round Face",
            "Prototype": "heads/round_narrow",
            "Morphs": [ { "NameInternal": "nose_tip_width" } ],
            "Peripherals": []
        })
    );
}

#[test]
fn self_referencing_targets_are_refused() {
    let ws = Workspace::new();
    let session = open(&ws, "round-face");
    assert!(session
        .save_as(SaveMode::Derivative, "heads/round", &ws)
        .is_err());
    assert!(session
        .save_as(SaveMode::Sibling, "heads/base", &ws)
        .is_err());
    assert!(session.save_as(SaveMode::Absolute, "heads/round", &ws).is_ok());
}

#[test]
fn single_offset_component_is_written_alone() {
    let mut ws = Workspace::new();
    let mut session = open(&ws, "round-face");
    let glasses = session.document().peripheral_index("glasses/round").unwrap();
    session
        .set_peripheral_offset(glasses, Vec3::new(0.0, 0.05, 0.09), &mut NullTarget)
        .unwrap();
    let text = session
        .save_as(SaveMode::Derivative, "heads/round_lifted", &ws)
        .unwrap();
    let json: JsonValue = serde_json::from_str(&text).unwrap();
    assert_eq!(
        json["Peripherals"][0],
        serde_json::json!({ "ResourcePath": "Glasses/Round", "Offset_Y": 0.05 })
    );

    ws.saved.insert("heads/round_lifted", text);
    let reloaded = resolve(&ws, "heads/round_lifted", false).unwrap();
    same_content(session.document(), &reloaded);
}
