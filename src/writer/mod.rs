//! Stream writers: normalized-node events → wire format.
//!
//! Ein Writer wird von aussen getrieben (z.B. vom [`NormalizedNodeWriter`])
//! und erhaelt die Events in gueltiger Tiefensuche-Reihenfolge: `start_*`
//! vor den Kindern, `end_node` danach. Leaf, Leaf-List-Entry und anyxml
//! sind terminal und haben kein `end_node`.
//!
//! Der [`SchemaTracker`] haelt den Schema-Stack und prueft, dass jedes
//! Event zur Art des aufgeloesten Schema-Knotens passt. Die konkreten
//! Writer ([`xml`], [`json`]) setzen nur noch die Ausgabe um.
//!
//! [`NormalizedNodeWriter`]: crate::node::NormalizedNodeWriter

use std::collections::BTreeSet;
use std::sync::Arc;

use log::trace;

use crate::node::{AnyXmlElement, Attributes, PathArgument, Value};
use crate::qname::QName;
use crate::schema::{AugmentationSchema, DataSchemaNode, SchemaContext, SchemaScope};
use crate::{Error, Result};

pub mod json;
pub mod sink;
pub mod xml;

pub use json::JsonStreamWriter;
pub use sink::{ElementSink, XmlSink};
pub use xml::XmlStreamWriter;

/// Event consumer for one depth-first pass over a normalized-node tree.
pub trait NormalizedNodeStreamWriter {
    /// Leaf mit Wert; `None` ergibt ein leeres Element.
    fn leaf_node(&mut self, name: &QName, value: Option<&Value>, attributes: &Attributes) -> Result<()>;

    fn start_leaf_set(&mut self, name: &QName, ordered: bool) -> Result<()>;

    /// Ein Entry der aktuell offenen Leaf-List.
    fn leaf_set_entry(&mut self, value: &Value, attributes: &Attributes) -> Result<()>;

    fn start_container(&mut self, name: &QName, attributes: &Attributes) -> Result<()>;

    /// Oeffnet den (unsichtbaren) Listen-Rahmen.
    fn start_list(&mut self, name: &QName, ordered: bool) -> Result<()>;

    /// Oeffnet ein Entry der aktuell offenen Liste.
    fn start_list_entry(&mut self, identifier: &PathArgument, attributes: &Attributes) -> Result<()>;

    fn start_choice(&mut self, name: &QName) -> Result<()>;

    /// Oeffnet eine Augmentierung, gewaehlt ueber die moeglichen Kind-Namen.
    fn start_augmentation(&mut self, candidates: &BTreeSet<QName>) -> Result<()>;

    fn anyxml_node(&mut self, name: &QName, value: Option<&AnyXmlElement>) -> Result<()>;

    /// Schliesst den zuletzt geoeffneten Knoten.
    fn end_node(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

// ============================================================================
// Schema-Stack
// ============================================================================

/// One entry of the schema stack.
///
/// Eine Liste belegt zwei Ebenen mit demselben Schema: den Rahmen aus
/// `start_list` und darueber je Entry einen Rahmen aus `start_list_entry`.
/// Nur der Entry-Rahmen entspricht einem Element auf dem Draht.
#[derive(Debug, Clone)]
pub enum Frame {
    Container(Arc<DataSchemaNode>),
    ListWrapper(Arc<DataSchemaNode>),
    ListEntry(Arc<DataSchemaNode>),
    LeafSet(Arc<DataSchemaNode>),
    Choice(Arc<DataSchemaNode>),
    Augmentation(Arc<AugmentationSchema>),
}

impl Frame {
    /// Schreibt dieser Rahmen ein Element (und damit ein End-Element)?
    pub fn emits_element(&self) -> bool {
        matches!(self, Self::Container(_) | Self::ListEntry(_))
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::ListWrapper(_) => "list",
            Self::ListEntry(_) => "list entry",
            Self::LeafSet(_) => "leaf-list",
            Self::Choice(_) => "choice",
            Self::Augmentation(_) => "augmentation",
        }
    }
}

/// Tracks the schema node behind every open event.
///
/// Leerer Stack: Kinder werden gegen den Root-Scope aufgeloest (Schema
/// Context oder der Knoten am Ende von `with_root`).
#[derive(Debug)]
pub struct SchemaTracker {
    root: SchemaScope,
    stack: Vec<Frame>,
}

impl SchemaTracker {
    pub fn new(context: Arc<SchemaContext>) -> Self {
        Self {
            root: SchemaScope::Context(context),
            stack: Vec::new(),
        }
    }

    /// Root ist der Knoten am Ende von `path` (jeder Schritt muss ein
    /// Container oder eine Liste sein).
    pub fn with_root(context: Arc<SchemaContext>, path: &[QName]) -> Result<Self> {
        let mut scope = SchemaScope::Context(context);
        for qname in path {
            let child = scope.resolve_child(qname)?;
            if child.as_data_node_container().is_none() {
                return Err(Error::StructuralMismatch {
                    qname: qname.clone(),
                    expected: "container or list",
                    found: child.kind_name(),
                });
            }
            scope = SchemaScope::Node(child);
        }
        Ok(Self {
            root: scope,
            stack: Vec::new(),
        })
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.stack.last()
    }

    /// Scope, gegen den das naechste Kind aufgeloest wird.
    fn parent_scope(&self, child: &QName) -> Result<SchemaScope> {
        match self.stack.last() {
            None => Ok(self.root.clone()),
            Some(Frame::Container(n) | Frame::ListEntry(n) | Frame::Choice(n)) => {
                Ok(SchemaScope::Node(Arc::clone(n)))
            }
            Some(Frame::Augmentation(a)) => Ok(SchemaScope::Augmentation(Arc::clone(a))),
            Some(frame @ (Frame::ListWrapper(n) | Frame::LeafSet(n))) => Err(Error::schema_mismatch(
                format!("{} {} outside of an entry", frame.kind_name(), n.qname()),
                child.clone(),
            )),
        }
    }

    /// Loest `name` auf und prueft die Knotenart.
    fn resolve(
        &self,
        name: &QName,
        expected: &'static str,
        check: fn(&DataSchemaNode) -> bool,
    ) -> Result<Arc<DataSchemaNode>> {
        let schema = self.parent_scope(name)?.resolve_child(name)?;
        if !check(&schema) {
            return Err(Error::StructuralMismatch {
                qname: schema.qname().clone(),
                expected,
                found: schema.kind_name(),
            });
        }
        Ok(schema)
    }

    fn push(&mut self, frame: Frame) {
        trace!("push {} at depth {}", frame.kind_name(), self.stack.len());
        self.stack.push(frame);
    }

    pub fn leaf_node(&self, name: &QName) -> Result<Arc<DataSchemaNode>> {
        self.resolve(name, "leaf", |s| matches!(s, DataSchemaNode::Leaf(_)))
    }

    pub fn start_leaf_set(&mut self, name: &QName) -> Result<Arc<DataSchemaNode>> {
        let schema = self.resolve(name, "leaf-list", |s| matches!(s, DataSchemaNode::LeafList(_)))?;
        self.push(Frame::LeafSet(Arc::clone(&schema)));
        Ok(schema)
    }

    /// Schema der offenen Leaf-List.
    pub fn leaf_set_entry(&self) -> Result<Arc<DataSchemaNode>> {
        match self.stack.last() {
            Some(Frame::LeafSet(schema)) => Ok(Arc::clone(schema)),
            other => Err(self.not_inside("leaf-list", other)),
        }
    }

    pub fn start_container(&mut self, name: &QName) -> Result<Arc<DataSchemaNode>> {
        let schema = self.resolve(name, "container", |s| matches!(s, DataSchemaNode::Container(_)))?;
        self.push(Frame::Container(Arc::clone(&schema)));
        Ok(schema)
    }

    pub fn start_list(&mut self, name: &QName) -> Result<Arc<DataSchemaNode>> {
        let schema = self.resolve(name, "list", |s| matches!(s, DataSchemaNode::List(_)))?;
        self.push(Frame::ListWrapper(Arc::clone(&schema)));
        Ok(schema)
    }

    /// Entry der offenen Liste; keyed Listen brauchen alle Keys im Identifier.
    pub fn start_list_entry(&mut self, identifier: &PathArgument) -> Result<Arc<DataSchemaNode>> {
        let schema = match self.stack.last() {
            Some(Frame::ListWrapper(schema)) => Arc::clone(schema),
            other => return Err(self.not_inside("list", other)),
        };
        let DataSchemaNode::List(list) = &*schema else {
            return Err(Error::StructuralMismatch {
                qname: schema.qname().clone(),
                expected: "list",
                found: schema.kind_name(),
            });
        };
        if identifier.node_type() != Some(&list.qname) {
            return Err(Error::schema_mismatch(
                format!("list {}", list.qname),
                identifier.node_type().cloned().unwrap_or_else(|| list.qname.clone()),
            ));
        }
        if let Some(missing) = list.keys.iter().find(|k| !has_key(identifier, k)) {
            return Err(Error::MissingListKey {
                list: list.qname.clone(),
                key: missing.clone(),
            });
        }
        self.push(Frame::ListEntry(Arc::clone(&schema)));
        Ok(schema)
    }

    pub fn start_choice(&mut self, name: &QName) -> Result<Arc<DataSchemaNode>> {
        let schema = self.resolve(name, "choice", |s| matches!(s, DataSchemaNode::Choice(_)))?;
        self.push(Frame::Choice(Arc::clone(&schema)));
        Ok(schema)
    }

    pub fn start_augmentation(&mut self, candidates: &BTreeSet<QName>) -> Result<Arc<AugmentationSchema>> {
        let parent = match self.stack.last() {
            None => self.root.clone(),
            Some(Frame::Container(n) | Frame::ListEntry(n) | Frame::Choice(n)) => {
                SchemaScope::Node(Arc::clone(n))
            }
            Some(Frame::Augmentation(a)) => SchemaScope::Augmentation(Arc::clone(a)),
            other => return Err(self.not_inside("augmentation target", other)),
        };
        let schema = parent.find_augmentation(candidates)?;
        self.push(Frame::Augmentation(Arc::clone(&schema)));
        Ok(schema)
    }

    pub fn anyxml_node(&self, name: &QName) -> Result<Arc<DataSchemaNode>> {
        self.resolve(name, "anyxml", |s| matches!(s, DataSchemaNode::AnyXml(_)))
    }

    /// Entfernt den obersten Rahmen.
    pub fn end_node(&mut self) -> Result<Frame> {
        let frame = self.stack.pop().ok_or(Error::UnexpectedEndNode)?;
        trace!("pop {} at depth {}", frame.kind_name(), self.stack.len());
        Ok(frame)
    }

    fn not_inside(&self, expected: &'static str, top: Option<&Frame>) -> Error {
        match top {
            Some(frame) => Error::StructuralMismatch {
                qname: frame_qname(frame),
                expected,
                found: frame.kind_name(),
            },
            None => Error::schema_mismatch(
                format!("{} (no open {expected})", self.root.describe()),
                QName::new("", expected),
            ),
        }
    }
}

fn has_key(identifier: &PathArgument, key: &QName) -> bool {
    match identifier {
        PathArgument::NodeIdentifierWithPredicates { keys, .. } => keys.contains_key(key),
        _ => false,
    }
}

/// QName eines Rahmens; Augmentierungen nehmen das erste Kind.
fn frame_qname(frame: &Frame) -> QName {
    match frame {
        Frame::Container(n)
        | Frame::ListWrapper(n)
        | Frame::ListEntry(n)
        | Frame::LeafSet(n)
        | Frame::Choice(n) => n.qname().clone(),
        Frame::Augmentation(a) => a
            .children
            .first()
            .map(|c| c.qname().clone())
            .unwrap_or_else(|| QName::new("", "augmentation")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::KeyValues;
    use crate::qname::QNameModule;
    use crate::schema::types::{BuiltinType, TypeDefinition};
    use crate::schema::{CaseSchema, ChoiceSchema, ContainerSchema, LeafSchema, ListSchema, Module};

    const NS: &str = "urn:test:tracker";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    fn string_leaf(local: &str) -> Arc<DataSchemaNode> {
        LeafSchema::new(q(local), TypeDefinition::builtin(BuiltinType::String)).build()
    }

    fn context() -> Arc<SchemaContext> {
        let users = ListSchema::new(q("user"))
            .with_key(q("name"))
            .with_child(string_leaf("name"))
            .with_child(string_leaf("role"))
            .build();
        let choice = ChoiceSchema::new(q("transport"))
            .with_case(CaseSchema::new(q("tcp")).with_child(string_leaf("port")))
            .build();
        let top = ContainerSchema::new(q("top"))
            .with_child(users)
            .with_child(choice)
            .with_child(string_leaf("desc"))
            .build();
        SchemaContext::builder()
            .module(Module::new("tracker", QNameModule::new(NS, None)))
            .child(top)
            .build()
    }

    fn entry(name: &str) -> PathArgument {
        PathArgument::NodeIdentifierWithPredicates {
            node_type: q("user"),
            keys: KeyValues::new().with(q("name"), name),
        }
    }

    /// Wrapper und Entry tragen dasselbe Schema, nur das Entry emittiert.
    #[test]
    fn list_uses_wrapper_and_entry_frames() {
        let mut t = SchemaTracker::new(context());
        t.start_container(&q("top")).unwrap();
        let wrapper = t.start_list(&q("user")).unwrap();
        let entry_schema = t.start_list_entry(&entry("bob")).unwrap();
        assert!(Arc::ptr_eq(&wrapper, &entry_schema));
        assert!(t.leaf_node(&q("role")).is_ok());

        let popped = t.end_node().unwrap();
        assert!(matches!(popped, Frame::ListEntry(_)));
        assert!(popped.emits_element());
        let popped = t.end_node().unwrap();
        assert!(matches!(popped, Frame::ListWrapper(_)));
        assert!(!popped.emits_element());
    }

    #[test]
    fn kind_mismatch_is_structural() {
        let mut t = SchemaTracker::new(context());
        t.start_container(&q("top")).unwrap();
        let err = t.start_container(&q("desc")).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch { expected: "container", found: "leaf", .. }), "{err}");
    }

    #[test]
    fn unknown_child_is_schema_mismatch() {
        let mut t = SchemaTracker::new(context());
        t.start_container(&q("top")).unwrap();
        let err = t.leaf_node(&q("nope")).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }), "{err}");
    }

    #[test]
    fn entry_without_all_keys_rejected() {
        let mut t = SchemaTracker::new(context());
        t.start_container(&q("top")).unwrap();
        t.start_list(&q("user")).unwrap();
        let err = t.start_list_entry(&PathArgument::NodeIdentifier(q("user"))).unwrap_err();
        assert!(matches!(err, Error::MissingListKey { .. }), "{err}");
    }

    /// Kinder direkt unter dem Listen-Rahmen sind ungueltig.
    #[test]
    fn leaf_under_list_wrapper_rejected() {
        let mut t = SchemaTracker::new(context());
        t.start_container(&q("top")).unwrap();
        t.start_list(&q("user")).unwrap();
        assert!(t.leaf_node(&q("role")).is_err());
    }

    #[test]
    fn choice_frame_resolves_case_children() {
        let mut t = SchemaTracker::new(context());
        t.start_container(&q("top")).unwrap();
        t.start_choice(&q("transport")).unwrap();
        assert!(t.leaf_node(&q("port")).is_ok());
        assert!(matches!(t.end_node().unwrap(), Frame::Choice(_)));
    }

    #[test]
    fn end_node_on_empty_stack() {
        let mut t = SchemaTracker::new(context());
        assert_eq!(t.end_node().unwrap_err(), Error::UnexpectedEndNode);
    }

    #[test]
    fn with_root_walks_path() {
        let t = SchemaTracker::with_root(context(), &[q("top")]).unwrap();
        assert!(t.leaf_node(&q("desc")).is_ok());
        assert!(SchemaTracker::with_root(context(), &[q("top"), q("desc")]).is_err());
    }
}
