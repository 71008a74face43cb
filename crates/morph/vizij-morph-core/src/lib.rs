//! Vizij Morph Core (engine-agnostic)
//!
//! Morph documents describe facial blend parameters ("morphs") and attachable
//! peripherals as JSON. A document may name a `Prototype` document it derives
//! from; this crate decodes documents, resolves prototype chains into one
//! effective document, and writes edited documents back out as a minimal diff
//! against a chosen ancestor.
//!
//! I/O and rendering stay with the host: documents are fetched through a
//! [`DocumentSource`] and morph weights are pushed to a [`MorphTarget`].

pub mod apply;
pub mod category;
pub mod config;
pub mod decode;
pub mod element;
pub mod encode;
pub mod error;
pub mod model;
pub mod randomize;
pub mod resolve;
pub mod session;
pub mod source;
pub mod wire;

// Re-exports for consumers (adapters)
pub use apply::{blend_shape_weight, BlendShapeWeight, MorphTarget, NullTarget};
pub use category::{CategoryNode, CategoryTree};
pub use config::{Config, MissingDocumentPolicy, RandomizeOptions};
pub use decode::{decode, decode_record};
pub use element::Element;
pub use encode::{encode, encode_with};
pub use error::{DecodeError, EncodeError, ResolveError, TokenKind};
pub use model::{Change, Morph, MorphDocument, Peripheral, Vec3, CATEGORY_DELIMITER};
pub use randomize::randomize;
pub use resolve::{resolve, Resolver};
pub use session::{EditSession, SaveMode};
pub use source::{DirectorySource, DocumentSource, MemorySource};
pub use wire::{DocumentRecord, MorphRecord, PeripheralRecord};
