//! XML stream writer.
//!
//! Draht-Abbildung:
//! - Container, List-Entry: ein Element mit Kindern
//! - Leaf, Leaf-List-Entry: ein Element mit Text (leer bei fehlendem Wert)
//! - Liste, Leaf-List: kein eigenes Element, nur die Entries
//! - Choice, Augmentierung: kein Element
//! - anyxml: ein Element, Inhalt unveraendert

use std::collections::BTreeSet;
use std::sync::Arc;

use super::sink::ElementSink;
use super::{Frame, NormalizedNodeStreamWriter, SchemaTracker};
use crate::codec::CodecRegistry;
use crate::node::{AnyXmlContent, AnyXmlElement, Attributes, PathArgument, Value};
use crate::qname::QName;
use crate::schema::DataSchemaNode;
use crate::Result;

/// [`NormalizedNodeStreamWriter`] emitting XML elements into an [`ElementSink`].
pub struct XmlStreamWriter<S: ElementSink> {
    sink: S,
    tracker: SchemaTracker,
    codecs: Arc<CodecRegistry>,
}

impl<S: ElementSink> XmlStreamWriter<S> {
    /// Writer mit dem Schema Context als Root.
    pub fn new(sink: S, codecs: Arc<CodecRegistry>) -> Self {
        let tracker = SchemaTracker::new(Arc::clone(codecs.schema_context()));
        Self {
            sink,
            tracker,
            codecs,
        }
    }

    /// Writer, dessen Root der Knoten am Ende von `path` ist.
    pub fn with_root(sink: S, codecs: Arc<CodecRegistry>, path: &[QName]) -> Result<Self> {
        let tracker = SchemaTracker::with_root(Arc::clone(codecs.schema_context()), path)?;
        Ok(Self {
            sink,
            tracker,
            codecs,
        })
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Ein Element mit kodiertem Wert; leerer Text ergibt ein leeres Element.
    fn write_value(
        &mut self,
        schema: &DataSchemaNode,
        value: Option<&Value>,
        attributes: &Attributes,
    ) -> Result<()> {
        let text = match value {
            Some(v) => self.codecs.codec_for_leaf(schema)?.serialize(v)?,
            None => String::new(),
        };
        if text.is_empty() {
            return self.sink.empty_element(schema.qname(), attributes);
        }
        self.sink.start_element(schema.qname(), attributes)?;
        self.sink.write_text(&text)?;
        self.sink.end_element()
    }

    fn write_anyxml_children(&mut self, element: &AnyXmlElement) -> Result<()> {
        for child in &element.children {
            match child {
                AnyXmlContent::Text(text) => self.sink.write_text(text)?,
                AnyXmlContent::Element(e) if e.children.is_empty() => {
                    self.sink.empty_element(&e.name, &e.attributes)?
                }
                AnyXmlContent::Element(e) => {
                    self.sink.start_element(&e.name, &e.attributes)?;
                    self.write_anyxml_children(e)?;
                    self.sink.end_element()?;
                }
            }
        }
        Ok(())
    }
}

impl<S: ElementSink> NormalizedNodeStreamWriter for XmlStreamWriter<S> {
    fn leaf_node(&mut self, name: &QName, value: Option<&Value>, attributes: &Attributes) -> Result<()> {
        let schema = self.tracker.leaf_node(name)?;
        self.write_value(&schema, value, attributes)
    }

    fn start_leaf_set(&mut self, name: &QName, _ordered: bool) -> Result<()> {
        self.tracker.start_leaf_set(name).map(drop)
    }

    fn leaf_set_entry(&mut self, value: &Value, attributes: &Attributes) -> Result<()> {
        let schema = self.tracker.leaf_set_entry()?;
        self.write_value(&schema, Some(value), attributes)
    }

    fn start_container(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        let schema = self.tracker.start_container(name)?;
        self.sink.start_element(schema.qname(), attributes)
    }

    fn start_list(&mut self, name: &QName, _ordered: bool) -> Result<()> {
        self.tracker.start_list(name).map(drop)
    }

    fn start_list_entry(&mut self, identifier: &PathArgument, attributes: &Attributes) -> Result<()> {
        let schema = self.tracker.start_list_entry(identifier)?;
        self.sink.start_element(schema.qname(), attributes)
    }

    fn start_choice(&mut self, name: &QName) -> Result<()> {
        self.tracker.start_choice(name).map(drop)
    }

    fn start_augmentation(&mut self, candidates: &BTreeSet<QName>) -> Result<()> {
        self.tracker.start_augmentation(candidates).map(drop)
    }

    fn anyxml_node(&mut self, name: &QName, value: Option<&AnyXmlElement>) -> Result<()> {
        let schema = self.tracker.anyxml_node(name)?;
        match value {
            Some(element) if !element.children.is_empty() => {
                self.sink.start_element(schema.qname(), &element.attributes)?;
                self.write_anyxml_children(element)?;
                self.sink.end_element()
            }
            Some(element) => self.sink.empty_element(schema.qname(), &element.attributes),
            None => self.sink.empty_element(schema.qname(), &Attributes::default()),
        }
    }

    fn end_node(&mut self) -> Result<()> {
        match self.tracker.end_node()? {
            Frame::Container(_) | Frame::ListEntry(_) => self.sink.end_element(),
            Frame::ListWrapper(_) | Frame::LeafSet(_) | Frame::Choice(_) | Frame::Augmentation(_) => {
                Ok(())
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    fn close(&mut self) -> Result<()> {
        self.sink.close()
    }
}
