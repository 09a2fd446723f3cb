//! yangcodec – schema-directed XML/JSON codec for YANG normalized node trees
//!
//! Encode: [`NormalizedNodeWriter`](node::NormalizedNodeWriter) treibt einen
//! [`NormalizedNodeStreamWriter`](writer::NormalizedNodeStreamWriter)
//! (XML oder JSON), der jedes Event gegen das Schema prueft.
//! Decode: der [`NodeParser`](parser::NodeParser) baut aus einer Folge
//! benannter Elemente (XML-DOM oder JSON) wieder einen Knotenbaum.
//!
//! # Beispiel
//!
//! ```
//! use std::sync::Arc;
//! use yangcodec::codec::CodecRegistry;
//! use yangcodec::node::{ContainerNodeBuilder, LeafNode, NormalizedNode};
//! use yangcodec::options::{JsonOptions, XmlOptions};
//! use yangcodec::qname::{QName, QNameModule};
//! use yangcodec::schema::{BuiltinType, ContainerSchema, LeafSchema, Module, SchemaContext, TypeDefinition};
//!
//! let ns = "urn:example:system";
//! let q = |local: &str| QName::new(ns, local);
//! let system = ContainerSchema::new(q("system"))
//!     .with_child(LeafSchema::new(q("hostname"), TypeDefinition::builtin(BuiltinType::String)).build())
//!     .build();
//! let context = SchemaContext::builder()
//!     .module(Module::new("system", QNameModule::new(ns, None)))
//!     .child(system)
//!     .build();
//! let codecs = Arc::new(CodecRegistry::new(context));
//!
//! let tree: NormalizedNode = ContainerNodeBuilder::new(q("system"))
//!     .child(LeafNode::new(q("hostname"), "router1"))
//!     .build()
//!     .into();
//!
//! // Encode
//! let xml = yangcodec::node_to_xml(&codecs, &tree, &XmlOptions::default()).unwrap();
//! assert_eq!(xml, r#"<system xmlns="urn:example:system"><hostname>router1</hostname></system>"#);
//! let json = yangcodec::node_to_json(&codecs, &tree, &JsonOptions::default()).unwrap();
//! assert_eq!(json, r#"{"system:system":{"hostname":"router1"}}"#);
//!
//! // Decode
//! assert_eq!(yangcodec::parse_xml_str(&codecs, &xml).unwrap(), tree);
//! assert_eq!(yangcodec::parse_json_str(&codecs, &json).unwrap(), tree);
//! ```

use std::sync::Arc;

pub mod codec;
pub mod decimal;
pub mod error;
pub mod node;
pub mod options;
pub mod parser;
pub mod qname;
pub mod schema;
pub mod writer;

pub use error::{Error, Result};

/// HashMap mit ahash (schneller, nicht DoS-resistent; fuer interne Datenstrukturen).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API: Typen
pub use codec::CodecRegistry;
pub use decimal::Decimal64;
pub use node::{NormalizedNode, NormalizedNodeWriter, PathArgument, Value};
pub use options::{JsonOptions, XmlOptions};
pub use parser::{DataElement, NodeParser};
pub use qname::{QName, QNameModule};
pub use schema::{SchemaContext, SchemaScope};
pub use writer::{JsonStreamWriter, NormalizedNodeStreamWriter, XmlSink, XmlStreamWriter};

// ============================================================================
// Convenience-Funktionen
// ============================================================================

/// Serialisiert `node` (und seinen Teilbaum) als XML.
pub fn node_to_xml(codecs: &Arc<CodecRegistry>, node: &NormalizedNode, options: &XmlOptions) -> Result<String> {
    let sink = XmlSink::with_options(Vec::new(), options)?;
    let mut writer = XmlStreamWriter::new(sink, Arc::clone(codecs));
    NormalizedNodeWriter::new(&mut writer).write(node)?;
    writer.close()?;
    let bytes = writer.into_sink().into_inner();
    String::from_utf8(bytes).map_err(Error::write_failure)
}

/// Serialisiert `node` als JSON-Dokument.
pub fn node_to_json(codecs: &Arc<CodecRegistry>, node: &NormalizedNode, options: &JsonOptions) -> Result<String> {
    let mut writer = JsonStreamWriter::new(Vec::new(), Arc::clone(codecs), *options);
    NormalizedNodeWriter::new(&mut writer).write(node)?;
    writer.close()?;
    String::from_utf8(writer.into_inner()).map_err(Error::write_failure)
}

/// Parst ein XML-Dokument; das Root-Element wird gegen den Schema Context aufgeloest.
pub fn parse_xml_str(codecs: &CodecRegistry, xml: &str) -> Result<NormalizedNode> {
    let document = roxmltree::Document::parse(xml).map_err(|e| Error::XmlParseError(e.to_string()))?;
    let context = codecs.schema_context();
    let root = parser::XmlElement::new(document.root_element(), context);
    NodeParser::new(codecs).parse_document(root)
}

/// Parst ein JSON-Dokument mit genau einem (modul-qualifizierten) Top-Level-Member.
pub fn parse_json_str(codecs: &CodecRegistry, json: &str) -> Result<NormalizedNode> {
    let document: serde_json::Value =
        serde_json::from_str(json).map_err(|e| Error::JsonParseError(e.to_string()))?;
    let context = codecs.schema_context();
    let elements = parser::JsonElement::from_document(&document, context)?;
    if elements.is_empty() {
        return Err(Error::JsonParseError("document without a top-level member".into()));
    }
    NodeParser::new(codecs).parse_top_level(elements)
}
