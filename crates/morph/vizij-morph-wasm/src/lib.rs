use std::cell::RefCell;
use std::fmt::Display;

use js_sys::Function;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_morph_core::{
    blend_shape_weight, decode, encode_with, randomize, CategoryNode, Config, DocumentSource,
    EditSession, MorphDocument, MorphTarget, Peripheral, Resolver, SaveMode, Vec3,
};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn parse_config(config: JsValue) -> Result<Config, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(Config::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

fn parse_mode(mode: &str) -> Result<SaveMode, JsError> {
    match mode.to_ascii_lowercase().as_str() {
        "absolute" => Ok(SaveMode::Absolute),
        "derivative" => Ok(SaveMode::Derivative),
        "sibling" => Ok(SaveMode::Sibling),
        other => Err(JsError::new(&format!("unknown save mode '{other}'"))),
    }
}

/// Message of a thrown JS value (`Error.message` when it is an `Error`).
fn describe_js_error(e: &JsValue) -> String {
    if let Some(err) = e.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn to_js<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<JsValue, JsError> {
    swb::to_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

/// Document loader backed by a JS callback `loader(path: string) -> string | null/undefined`.
///
/// A loader that throws is not a missing document: the first exception is
/// kept and reported by [`JsDocumentSource::finish`] once the core call
/// returns.
struct JsDocumentSource {
    f: Function,
    failure: RefCell<Option<String>>,
}

impl JsDocumentSource {
    fn new(f: Function) -> Self {
        Self {
            f,
            failure: RefCell::new(None),
        }
    }

    /// Turn a core result into a JS result, preferring a loader exception
    /// over whatever the core made of the missing text.
    fn finish<T, E: Display>(self, result: Result<T, E>, what: &str) -> Result<T, JsError> {
        if let Some(failure) = self.failure.into_inner() {
            return Err(JsError::new(&format!("{what} error: {failure}")));
        }
        result.map_err(|e| JsError::new(&format!("{what} error: {e}")))
    }
}

impl DocumentSource for JsDocumentSource {
    fn load_text(&self, path: &str) -> Option<String> {
        let arg = JsValue::from_str(path);
        match self.f.call1(&JsValue::UNDEFINED, &arg) {
            Ok(val) if jsvalue_is_undefined_or_null(&val) => None,
            Ok(val) => val.as_string(),
            Err(e) => {
                let mut failure = self.failure.borrow_mut();
                if failure.is_none() {
                    *failure = Some(format!(
                        "loader threw for '{path}': {}",
                        describe_js_error(&e)
                    ));
                }
                None
            }
        }
    }
}

/// Forwards morph weights and peripheral state to optional JS callbacks:
/// `on_weight(internal_name, value)` and `on_peripheral(peripheral)`.
///
/// The first callback failure is kept until [`JsMorphTarget::take_failure`]
/// hands it to the setter that triggered it.
struct JsMorphTarget {
    on_weight: Option<Function>,
    on_peripheral: Option<Function>,
    failure: Option<String>,
}

impl JsMorphTarget {
    fn new(on_weight: JsValue, on_peripheral: JsValue) -> Self {
        Self {
            on_weight: on_weight.dyn_into().ok(),
            on_peripheral: on_peripheral.dyn_into().ok(),
            failure: None,
        }
    }

    fn none() -> Self {
        Self {
            on_weight: None,
            on_peripheral: None,
            failure: None,
        }
    }

    fn fail(&mut self, message: String) {
        if self.failure.is_none() {
            self.failure = Some(message);
        }
    }

    fn take_failure(&mut self) -> Result<(), JsError> {
        match self.failure.take() {
            Some(message) => Err(JsError::new(&format!("target error: {message}"))),
            None => Ok(()),
        }
    }
}

impl MorphTarget for JsMorphTarget {
    fn apply_morph_weight(&mut self, internal_name: &str, signed_value: f64) {
        let Some(f) = &self.on_weight else {
            return;
        };
        let result = f.call2(
            &JsValue::UNDEFINED,
            &JsValue::from_str(internal_name),
            &JsValue::from_f64(signed_value),
        );
        if let Err(e) = result {
            self.fail(format!(
                "on_weight threw for '{internal_name}': {}",
                describe_js_error(&e)
            ));
        }
    }

    fn set_peripheral_active(&mut self, peripheral: &Peripheral) {
        let Some(f) = &self.on_peripheral else {
            return;
        };
        let failure = match swb::to_value(peripheral) {
            Ok(value) => f
                .call1(&JsValue::UNDEFINED, &value)
                .err()
                .map(|e| format!("on_peripheral threw: {}", describe_js_error(&e))),
            Err(e) => Some(format!("peripheral conversion failed: {e}")),
        };
        if let Some(message) = failure {
            self.fail(format!("'{}': {message}", peripheral.resource_path));
        }
    }
}

/// Category node as handed to JS: morph indexes plus nested children.
#[derive(Serialize)]
struct CategoryView {
    name: String,
    path: String,
    morphs: Vec<usize>,
    children: Vec<CategoryView>,
}

impl From<&CategoryNode> for CategoryView {
    fn from(node: &CategoryNode) -> Self {
        Self {
            name: node.name().to_string(),
            path: node.path().to_string(),
            morphs: node.morphs().to_vec(),
            children: node.children().iter().map(CategoryView::from).collect(),
        }
    }
}

/// One editing session over a morph document.
#[wasm_bindgen]
pub struct VizijMorph {
    session: EditSession,
    config: Config,
    target: JsMorphTarget,
}

#[wasm_bindgen]
impl VizijMorph {
    /// Create an empty session. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new VizijMorph({ include_unmatched: true, missing_documents: "error" })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VizijMorph, JsError> {
        console_error_panic_hook::set_once();
        let config = parse_config(config)?;
        Ok(VizijMorph {
            session: EditSession::from_document(
                String::new(),
                MorphDocument::empty(),
                config.clone(),
            ),
            config,
            target: JsMorphTarget::none(),
        })
    }

    /// Register callbacks that receive every weight or peripheral change.
    /// Either may be undefined/null.
    #[wasm_bindgen(js_name = set_target)]
    pub fn set_target(&mut self, on_weight: JsValue, on_peripheral: JsValue) {
        self.target = JsMorphTarget::new(on_weight, on_peripheral);
    }

    /// Resolve and load `path` through `loader(path) -> string | null`, then
    /// push every weight to the registered target.
    #[wasm_bindgen]
    pub fn open(&mut self, path: String, loader: Function) -> Result<(), JsError> {
        let source = JsDocumentSource::new(loader);
        let opened = EditSession::open(&source, &path, self.config.clone());
        self.session = source.finish(opened, "open")?;
        self.session.apply_all(&mut self.target);
        self.target.take_failure()
    }

    /// Effective document of the session.
    #[wasm_bindgen]
    pub fn document(&self) -> Result<JsValue, JsError> {
        to_js(self.session.document(), "document")
    }

    #[wasm_bindgen(js_name = datafile_path)]
    pub fn datafile_path(&self) -> String {
        self.session.datafile_path().to_string()
    }

    #[wasm_bindgen(js_name = prototype_path)]
    pub fn prototype_path(&self) -> String {
        self.session.prototype_path().to_string()
    }

    #[wasm_bindgen(js_name = is_modified)]
    pub fn is_modified(&self) -> bool {
        self.session.is_modified()
    }

    #[wasm_bindgen(js_name = set_name)]
    pub fn set_name(&mut self, name: String) {
        self.session.set_name(name);
    }

    /// Set a morph weight by index. Returns whether the value changed; a
    /// throwing target callback is reported after the value is stored.
    #[wasm_bindgen(js_name = set_morph_value)]
    pub fn set_morph_value(&mut self, index: usize, value: f64) -> Result<bool, JsError> {
        let changed = self.session.set_morph_value(index, value, &mut self.target).is_some();
        self.target.take_failure()?;
        Ok(changed)
    }

    #[wasm_bindgen(js_name = set_peripheral_enabled)]
    pub fn set_peripheral_enabled(&mut self, index: usize, enabled: bool) -> Result<bool, JsError> {
        let changed = self.session.set_peripheral_enabled(index, enabled, &mut self.target).is_some();
        self.target.take_failure()?;
        Ok(changed)
    }

    #[wasm_bindgen(js_name = set_peripheral_offset)]
    pub fn set_peripheral_offset(&mut self, index: usize, x: f64, y: f64, z: f64) -> Result<bool, JsError> {
        let changed = self.session.set_peripheral_offset(index, Vec3::new(x, y, z), &mut self.target).is_some();
        self.target.take_failure()?;
        Ok(changed)
    }

    #[wasm_bindgen(js_name = set_peripheral_scale)]
    pub fn set_peripheral_scale(&mut self, index: usize, x: f64, y: f64, z: f64) -> Result<bool, JsError> {
        let changed = self.session.set_peripheral_scale(index, Vec3::new(x, y, z), &mut self.target).is_some();
        self.target.take_failure()?;
        Ok(changed)
    }

    /// Randomize every non-excluded morph with a seeded generator.
    /// Returns how many morphs changed.
    #[wasm_bindgen]
    pub fn randomize(&mut self, seed: u32) -> Result<usize, JsError> {
        let mut rng = StdRng::seed_from_u64(u64::from(seed));
        let options = self.config.randomize.clone();
        let changed = randomize(&mut self.session, &mut rng, &options, &mut self.target);
        self.target.take_failure()?;
        Ok(changed)
    }

    /// Blend-shape channels and percent weights for every morph, as
    /// `[{ channel, weight }]`.
    #[wasm_bindgen(js_name = blend_shapes)]
    pub fn blend_shapes(&self) -> Result<JsValue, JsError> {
        let shapes: Vec<_> = self
            .session
            .document()
            .morphs
            .iter()
            .map(blend_shape_weight)
            .collect();
        to_js(&shapes, "blend shapes")
    }

    /// Category tree of the session's morphs as nested `{ name, path, morphs, children }`.
    #[wasm_bindgen]
    pub fn categories(&self) -> Result<JsValue, JsError> {
        let tree = self.session.categories();
        to_js(&CategoryView::from(tree.root()), "categories")
    }

    /// Encode the session against the parent picked by `mode`
    /// (`"absolute" | "derivative" | "sibling"`). Returns JSON text.
    #[wasm_bindgen]
    pub fn save(&self, mode: String, loader: Function) -> Result<String, JsError> {
        let mode = parse_mode(&mode)?;
        let source = JsDocumentSource::new(loader);
        let saved = self.session.save(mode, &source);
        source.finish(saved, "save")
    }

    /// Like `save`, after checking that `target_path` would not reference itself.
    #[wasm_bindgen(js_name = save_as)]
    pub fn save_as(
        &self,
        mode: String,
        target_path: String,
        loader: Function,
    ) -> Result<String, JsError> {
        let mode = parse_mode(&mode)?;
        let source = JsDocumentSource::new(loader);
        let saved = self.session.save_as(mode, &target_path, &source);
        source.finish(saved, "save")
    }
}

/// Decode one document's JSON text without following its prototype.
#[wasm_bindgen(js_name = decode_document)]
pub fn decode_document(text: String) -> Result<JsValue, JsError> {
    let doc = decode(&text).map_err(|e| JsError::new(&format!("decode error: {e}")))?;
    to_js(&doc, "document")
}

/// Resolve the effective document at `path`.
#[wasm_bindgen(js_name = resolve_document)]
pub fn resolve_document(
    path: String,
    loader: Function,
    config: JsValue,
) -> Result<JsValue, JsError> {
    let config = parse_config(config)?;
    let source = JsDocumentSource::new(loader);
    let resolved = Resolver::new(&source, config).resolve(&path);
    let doc = source.finish(resolved, "resolve")?;
    to_js(&doc, "document")
}

/// Encode an effective document (as returned by `resolve_document`) relative
/// to `parent_path`. An empty parent path writes a standalone snapshot.
#[wasm_bindgen(js_name = encode_document)]
pub fn encode_document(
    document: JsValue,
    parent_path: String,
    loader: Function,
    config: JsValue,
) -> Result<String, JsError> {
    let doc: MorphDocument = swb::from_value(document)
        .map_err(|e| JsError::new(&format!("document parse error: {e}")))?;
    let config = parse_config(config)?;
    let source = JsDocumentSource::new(loader);
    let encoded = encode_with(&mut Resolver::new(&source, config), &doc, &parent_path);
    source.finish(encoded, "encode")
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
