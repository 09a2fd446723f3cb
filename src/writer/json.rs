//! JSON stream writer (RFC 7951 style).
//!
//! Abbildung:
//! - Container, List-Entry: Objekt
//! - Liste, Leaf-List: Array der Entries; leere Listen entfallen ganz
//! - Choice, Augmentierung: transparent
//! - Member-Namen: `modul:name`, wenn sich der Namespace gegenueber dem
//!   umgebenden Objekt aendert (auf oberster Ebene immer)
//! - int8..int32/uint8..uint32 und boolean als JSON-Werte, `empty` als
//!   `[null]`, alles andere als String in der Codec-Darstellung
//! - Attribute: `"@"` im Objekt, `"@name"` als Geschwister eines Leafs
//!
//! Das Dokument wird im Speicher aufgebaut und bei `close` geschrieben.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use super::{Frame, NormalizedNodeStreamWriter, SchemaTracker};
use crate::codec::CodecRegistry;
use crate::node::{AnyXmlContent, AnyXmlElement, Attributes, PathArgument, Value};
use crate::options::JsonOptions;
use crate::qname::QName;
use crate::schema::{DataSchemaNode, SchemaContext};
use crate::{Error, Result};

/// Offene Struktur im Ausgabe-Baum.
#[derive(Debug)]
enum JsonFrame {
    /// Objekt; `member` ist `None` fuer Array-Eintraege.
    Object {
        member: Option<String>,
        namespace: Arc<str>,
        fields: Map<String, JsonValue>,
    },
    Array {
        member: String,
        items: Vec<JsonValue>,
    },
    Transparent,
}

/// [`NormalizedNodeStreamWriter`] producing one JSON document.
pub struct JsonStreamWriter<W: Write> {
    out: W,
    tracker: SchemaTracker,
    codecs: Arc<CodecRegistry>,
    options: JsonOptions,
    stack: Vec<JsonFrame>,
    root: Map<String, JsonValue>,
    closed: bool,
}

impl<W: Write> JsonStreamWriter<W> {
    pub fn new(out: W, codecs: Arc<CodecRegistry>, options: JsonOptions) -> Self {
        let tracker = SchemaTracker::new(Arc::clone(codecs.schema_context()));
        Self {
            out,
            tracker,
            codecs,
            options,
            stack: Vec::new(),
            root: Map::new(),
            closed: false,
        }
    }

    /// Writer, dessen Root der Knoten am Ende von `path` ist.
    pub fn with_root(
        out: W,
        codecs: Arc<CodecRegistry>,
        options: JsonOptions,
        path: &[QName],
    ) -> Result<Self> {
        let tracker = SchemaTracker::with_root(Arc::clone(codecs.schema_context()), path)?;
        let mut writer = Self::new(out, codecs, options);
        writer.tracker = tracker;
        Ok(writer)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn context(&self) -> &SchemaContext {
        self.codecs.schema_context()
    }

    /// Namespace des naechsten umschliessenden Objekts.
    fn enclosing_namespace(&self) -> Option<&str> {
        self.stack.iter().rev().find_map(|frame| match frame {
            JsonFrame::Object { namespace, .. } => Some(&**namespace),
            _ => None,
        })
    }

    fn member_name(&self, name: &QName) -> Result<String> {
        if self.enclosing_namespace() == Some(&*name.namespace) {
            return Ok(name.local_name.to_string());
        }
        let module = self
            .context()
            .module_by_namespace(&name.namespace)
            .ok_or_else(|| Error::write_failure(format!("no module for namespace {}", name.namespace)))?;
        Ok(format!("{}:{}", module.name, name.local_name))
    }

    /// Attribut-Name: lokal ohne Namespace, `modul:name` bei bekanntem
    /// Modul, sonst Clark-Notation.
    fn attribute_name(&self, name: &QName) -> String {
        if name.namespace.is_empty() {
            return name.local_name.to_string();
        }
        match self.context().module_by_namespace(&name.namespace) {
            Some(module) => format!("{}:{}", module.name, name.local_name),
            None => name.to_string(),
        }
    }

    fn attributes_object(&self, attributes: &Attributes) -> JsonValue {
        let fields = attributes
            .iter()
            .map(|(name, value)| (self.attribute_name(name), JsonValue::String(value.clone())))
            .collect();
        JsonValue::Object(fields)
    }

    /// Felder des naechsten Objekts (oder der Dokument-Wurzel).
    fn fields_mut(&mut self) -> Result<&mut Map<String, JsonValue>> {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                JsonFrame::Transparent => continue,
                JsonFrame::Object { fields, .. } => return Ok(fields),
                JsonFrame::Array { member, .. } => {
                    return Err(Error::write_failure(format!("member inside array {member}")));
                }
            }
        }
        Ok(&mut self.root)
    }

    fn insert(&mut self, member: String, value: JsonValue) -> Result<()> {
        self.fields_mut()?.insert(member, value);
        Ok(())
    }

    fn push_item(&mut self, value: JsonValue) -> Result<()> {
        match self.stack.last_mut() {
            Some(JsonFrame::Array { items, .. }) => {
                items.push(value);
                Ok(())
            }
            _ => Err(Error::write_failure("array item outside of an array")),
        }
    }

    fn encode_value(&self, schema: &DataSchemaNode, value: Option<&Value>) -> Result<JsonValue> {
        let Some(value) = value else {
            return Ok(JsonValue::Null);
        };
        let text = self.codecs.codec_for_leaf(schema)?.serialize(value)?;
        Ok(match value {
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Empty => JsonValue::Array(vec![JsonValue::Null]),
            Value::Int8(v) => JsonValue::from(*v),
            Value::Int16(v) => JsonValue::from(*v),
            Value::Int32(v) => JsonValue::from(*v),
            Value::Uint8(v) => JsonValue::from(*v),
            Value::Uint16(v) => JsonValue::from(*v),
            Value::Uint32(v) => JsonValue::from(*v),
            _ => JsonValue::String(text),
        })
    }

    fn open_object(&mut self, member: Option<String>, name: &QName, attributes: &Attributes) {
        let mut fields = Map::new();
        if !attributes.is_empty() {
            fields.insert("@".to_owned(), self.attributes_object(attributes));
        }
        self.stack.push(JsonFrame::Object {
            member,
            namespace: Arc::clone(&name.namespace),
            fields,
        });
    }

    fn write_document(&mut self) -> Result<()> {
        let document = JsonValue::Object(std::mem::take(&mut self.root));
        let result = if self.options.pretty {
            serde_json::to_writer_pretty(&mut self.out, &document)
        } else {
            serde_json::to_writer(&mut self.out, &document)
        };
        result.map_err(Error::write_failure)
    }
}

/// anyxml: reiner Text als String, sonst ein Objekt nach lokalen Namen.
fn anyxml_to_json(element: &AnyXmlElement) -> JsonValue {
    let mut fields: Map<String, JsonValue> = Map::new();
    for child in element.elements() {
        let value = anyxml_to_json(child);
        let key = child.name.local_name.to_string();
        match fields.get_mut(&key) {
            Some(JsonValue::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = JsonValue::Array(vec![first, value]);
            }
            None => {
                fields.insert(key, value);
            }
        }
    }
    if fields.is_empty() {
        let text: String = element
            .children
            .iter()
            .filter_map(|c| match c {
                AnyXmlContent::Text(t) => Some(t.as_str()),
                AnyXmlContent::Element(_) => None,
            })
            .collect();
        if text.is_empty() {
            return JsonValue::Null;
        }
        return JsonValue::String(text);
    }
    JsonValue::Object(fields)
}

impl<W: Write> NormalizedNodeStreamWriter for JsonStreamWriter<W> {
    fn leaf_node(&mut self, name: &QName, value: Option<&Value>, attributes: &Attributes) -> Result<()> {
        let schema = self.tracker.leaf_node(name)?;
        let member = self.member_name(schema.qname())?;
        let json = self.encode_value(&schema, value)?;
        if !attributes.is_empty() {
            let attrs = self.attributes_object(attributes);
            self.insert(format!("@{member}"), attrs)?;
        }
        self.insert(member, json)
    }

    fn start_leaf_set(&mut self, name: &QName, _ordered: bool) -> Result<()> {
        let schema = self.tracker.start_leaf_set(name)?;
        let member = self.member_name(schema.qname())?;
        self.stack.push(JsonFrame::Array {
            member,
            items: Vec::new(),
        });
        Ok(())
    }

    /// Attribute einzelner Leaf-List-Entries haben keine JSON-Form und entfallen.
    fn leaf_set_entry(&mut self, value: &Value, _attributes: &Attributes) -> Result<()> {
        let schema = self.tracker.leaf_set_entry()?;
        let json = self.encode_value(&schema, Some(value))?;
        self.push_item(json)
    }

    fn start_container(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        let schema = self.tracker.start_container(name)?;
        let member = self.member_name(schema.qname())?;
        self.open_object(Some(member), schema.qname(), attributes);
        Ok(())
    }

    fn start_list(&mut self, name: &QName, _ordered: bool) -> Result<()> {
        let schema = self.tracker.start_list(name)?;
        let member = self.member_name(schema.qname())?;
        self.stack.push(JsonFrame::Array {
            member,
            items: Vec::new(),
        });
        Ok(())
    }

    fn start_list_entry(&mut self, identifier: &PathArgument, attributes: &Attributes) -> Result<()> {
        let schema = self.tracker.start_list_entry(identifier)?;
        self.open_object(None, schema.qname(), attributes);
        Ok(())
    }

    fn start_choice(&mut self, name: &QName) -> Result<()> {
        self.tracker.start_choice(name)?;
        self.stack.push(JsonFrame::Transparent);
        Ok(())
    }

    fn start_augmentation(&mut self, candidates: &BTreeSet<QName>) -> Result<()> {
        self.tracker.start_augmentation(candidates)?;
        self.stack.push(JsonFrame::Transparent);
        Ok(())
    }

    /// Attribute und fremde Namespaces innerhalb von anyxml gehen in JSON verloren.
    fn anyxml_node(&mut self, name: &QName, value: Option<&AnyXmlElement>) -> Result<()> {
        let schema = self.tracker.anyxml_node(name)?;
        let member = self.member_name(schema.qname())?;
        let json = value.map(anyxml_to_json).unwrap_or(JsonValue::Null);
        self.insert(member, json)
    }

    fn end_node(&mut self) -> Result<()> {
        let tracked = self.tracker.end_node()?;
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::write_failure("JSON frame stack out of sync"))?;
        match (tracked, frame) {
            (Frame::Choice(_) | Frame::Augmentation(_), JsonFrame::Transparent) => Ok(()),
            (Frame::ListWrapper(_) | Frame::LeafSet(_), JsonFrame::Array { member, items }) => {
                if items.is_empty() {
                    return Ok(());
                }
                self.insert(member, JsonValue::Array(items))
            }
            (Frame::ListEntry(_), JsonFrame::Object { fields, .. }) => {
                self.push_item(JsonValue::Object(fields))
            }
            (Frame::Container(_), JsonFrame::Object { member: Some(member), fields, .. }) => {
                self.insert(member, JsonValue::Object(fields))
            }
            (tracked, frame) => Err(Error::write_failure(format!(
                "JSON frame {frame:?} does not match schema frame {tracked:?}"
            ))),
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(Error::from)
    }

    /// Schreibt das Dokument; weitere Aufrufe sind wirkungslos.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if let Some(frame) = self.tracker.current() {
            return Err(Error::write_failure(format!("close with open frame {frame:?}")));
        }
        self.closed = true;
        self.write_document()?;
        self.flush()
    }
}
