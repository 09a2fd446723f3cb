//! Normalized node model: the immutable, encoding-independent data tree.
//!
//! Knoten werden ueber die Builder in [`builder`] aufgebaut und danach
//! nicht mehr veraendert. Jeder Knoten gehoert exklusiv seinem Parent;
//! nur die Wurzel gehoert dem Aufrufer.
//!
//! Gleichheit:
//! - Kinder von Containern, List-Entries, Choices und Augmentierungen:
//!   Reihenfolge egal (Zugriff ueber den [`PathArgument`]).
//! - Listen/Leaf-Lists: Reihenfolge zaehlt nur bei `ordered` (ordered-by
//!   user bzw. unkeyed Listen); die Einfuege-Reihenfolge bleibt aber immer
//!   fuer die Ausgabe erhalten.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::qname::QName;

pub mod anyxml;
pub mod builder;
pub mod value;
pub mod walker;

pub use anyxml::{AnyXmlContent, AnyXmlElement};
pub use builder::{
    AugmentationNodeBuilder, ChoiceNodeBuilder, ContainerNodeBuilder, DataContainerNodeBuilder,
    LeafSetNodeBuilder, ListEntryNodeBuilder, ListNodeBuilder,
};
pub use value::Value;
pub use walker::NormalizedNodeWriter;

/// Attribute eines Knotens (z.B. XML-Attribute), QName → Text.
pub type Attributes = IndexMap<QName, String, ahash::RandomState>;

/// Kinder eines Daten-Containers, in Einfuege-Reihenfolge.
pub type Children = IndexMap<PathArgument, NormalizedNode, ahash::RandomState>;

// ============================================================================
// PathArgument
// ============================================================================

/// Key-Werte eines List-Entries in Deklarations-Reihenfolge der Keys.
///
/// Gleichheit und Hash ignorieren die Reihenfolge.
#[derive(Debug, Clone, Default)]
pub struct KeyValues(Vec<(QName, Value)>);

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setzt einen Key; ein vorhandener Wert wird ersetzt.
    pub fn insert(&mut self, key: QName, value: Value) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn with(mut self, key: QName, value: impl Into<Value>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &QName) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &QName) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QName, &Value)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for KeyValues {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for KeyValues {}

impl Hash for KeyValues {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut sorted: Vec<&(QName, Value)> = self.0.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted.len().hash(state);
        for (k, v) in sorted {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl FromIterator<(QName, Value)> for KeyValues {
    fn from_iter<I: IntoIterator<Item = (QName, Value)>>(iter: I) -> Self {
        let mut keys = Self::new();
        for (k, v) in iter {
            keys.insert(k, v);
        }
        keys
    }
}

/// Identifies one node instance relative to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathArgument {
    /// Container, Leaf, Choice, Liste, Leaf-List, unkeyed List-Entry.
    NodeIdentifier(QName),
    /// Entry einer keyed Liste.
    NodeIdentifierWithPredicates { node_type: QName, keys: KeyValues },
    /// Entry einer Leaf-List.
    NodeWithValue { node_type: QName, value: Value },
    /// Augmentierung, identifiziert ueber die moeglichen Kind-Namen.
    AugmentationIdentifier(BTreeSet<QName>),
}

impl PathArgument {
    /// QName des Knotens; Augmentierungen haben keinen.
    pub fn node_type(&self) -> Option<&QName> {
        match self {
            Self::NodeIdentifier(q) => Some(q),
            Self::NodeIdentifierWithPredicates { node_type, .. } => Some(node_type),
            Self::NodeWithValue { node_type, .. } => Some(node_type),
            Self::AugmentationIdentifier(_) => None,
        }
    }
}

impl fmt::Display for PathArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeIdentifier(q) => write!(f, "{q}"),
            Self::NodeIdentifierWithPredicates { node_type, keys } => {
                write!(f, "{node_type}")?;
                for (k, v) in keys.iter() {
                    write!(f, "[{}='{v}']", k.local_name)?;
                }
                Ok(())
            }
            Self::NodeWithValue { node_type, value } => write!(f, "{node_type}[.='{value}']"),
            Self::AugmentationIdentifier(names) => {
                f.write_str("augmentation[")?;
                for (i, q) in names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{q}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// ============================================================================
// Knoten
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerNode {
    pub identifier: QName,
    pub attributes: Attributes,
    pub children: Children,
}

/// Entry einer Liste; Identifier ist `NodeIdentifierWithPredicates`
/// (keyed) oder `NodeIdentifier` (unkeyed).
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntryNode {
    pub identifier: PathArgument,
    pub attributes: Attributes,
    pub children: Children,
}

#[derive(Debug, Clone)]
pub struct ListNode {
    pub identifier: QName,
    /// Reihenfolge relevant (ordered-by user oder unkeyed).
    pub ordered: bool,
    pub entries: Vec<ListEntryNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub identifier: QName,
    /// `None`: Leaf ohne Wert (leeres Element).
    pub value: Option<Value>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafSetEntryNode {
    pub identifier: QName,
    pub value: Value,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct LeafSetNode {
    pub identifier: QName,
    pub ordered: bool,
    pub entries: Vec<LeafSetEntryNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceNode {
    pub identifier: QName,
    pub children: Children,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugmentationNode {
    pub identifier: BTreeSet<QName>,
    pub children: Children,
}

/// Anyxml; Wire-Attribute gehoeren zum Element in `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyXmlNode {
    pub identifier: QName,
    pub value: Option<AnyXmlElement>,
}

/// Multiset-Vergleich ohne Ordnung auf den Elementen.
fn unordered_eq<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|x| {
        match b.iter().enumerate().find(|(i, y)| !used[*i] && *y == x) {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

impl PartialEq for ListNode {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.ordered == other.ordered
            && if self.ordered {
                self.entries == other.entries
            } else {
                unordered_eq(&self.entries, &other.entries)
            }
    }
}

impl PartialEq for LeafSetNode {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.ordered == other.ordered
            && if self.ordered {
                self.entries == other.entries
            } else {
                unordered_eq(&self.entries, &other.entries)
            }
    }
}

impl LeafNode {
    pub fn new(identifier: QName, value: impl Into<Value>) -> Self {
        Self {
            identifier,
            value: Some(value.into()),
            attributes: Attributes::default(),
        }
    }

    /// Leaf ohne Wert.
    pub fn absent(identifier: QName) -> Self {
        Self {
            identifier,
            value: None,
            attributes: Attributes::default(),
        }
    }

    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }
}

impl LeafSetEntryNode {
    pub fn new(identifier: QName, value: impl Into<Value>) -> Self {
        Self {
            identifier,
            value: value.into(),
            attributes: Attributes::default(),
        }
    }

    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    pub fn path_argument(&self) -> PathArgument {
        PathArgument::NodeWithValue {
            node_type: self.identifier.clone(),
            value: self.value.clone(),
        }
    }
}

impl AnyXmlNode {
    pub fn new(identifier: QName, value: Option<AnyXmlElement>) -> Self {
        Self { identifier, value }
    }
}

// ============================================================================
// NormalizedNode
// ============================================================================

/// One node of the normalized tree. Closed set of kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedNode {
    Container(ContainerNode),
    List(ListNode),
    ListEntry(ListEntryNode),
    Leaf(LeafNode),
    LeafSet(LeafSetNode),
    LeafSetEntry(LeafSetEntryNode),
    Choice(ChoiceNode),
    Augmentation(AugmentationNode),
    AnyXml(AnyXmlNode),
}

impl NormalizedNode {
    /// Identitaet relativ zum Parent.
    pub fn path_argument(&self) -> PathArgument {
        match self {
            Self::Container(n) => PathArgument::NodeIdentifier(n.identifier.clone()),
            Self::List(n) => PathArgument::NodeIdentifier(n.identifier.clone()),
            Self::ListEntry(n) => n.identifier.clone(),
            Self::Leaf(n) => PathArgument::NodeIdentifier(n.identifier.clone()),
            Self::LeafSet(n) => PathArgument::NodeIdentifier(n.identifier.clone()),
            Self::LeafSetEntry(n) => n.path_argument(),
            Self::Choice(n) => PathArgument::NodeIdentifier(n.identifier.clone()),
            Self::Augmentation(n) => PathArgument::AugmentationIdentifier(n.identifier.clone()),
            Self::AnyXml(n) => PathArgument::NodeIdentifier(n.identifier.clone()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::List(_) => "list",
            Self::ListEntry(_) => "list entry",
            Self::Leaf(_) => "leaf",
            Self::LeafSet(_) => "leaf-list",
            Self::LeafSetEntry(_) => "leaf-list entry",
            Self::Choice(_) => "choice",
            Self::Augmentation(_) => "augmentation",
            Self::AnyXml(_) => "anyxml",
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Self::Container(n) => Some(&n.attributes),
            Self::ListEntry(n) => Some(&n.attributes),
            Self::Leaf(n) => Some(&n.attributes),
            Self::LeafSetEntry(n) => Some(&n.attributes),
            Self::AnyXml(n) => n.value.as_ref().map(|e| &e.attributes),
            Self::List(_) | Self::LeafSet(_) | Self::Choice(_) | Self::Augmentation(_) => None,
        }
    }

    /// Kinder eines Daten-Containers (Container, Entry, Choice, Augmentierung).
    pub fn children(&self) -> Option<&Children> {
        match self {
            Self::Container(n) => Some(&n.children),
            Self::ListEntry(n) => Some(&n.children),
            Self::Choice(n) => Some(&n.children),
            Self::Augmentation(n) => Some(&n.children),
            _ => None,
        }
    }

    pub fn child(&self, id: &PathArgument) -> Option<&NormalizedNode> {
        self.children()?.get(id)
    }
}

macro_rules! impl_from_node {
    ($($t:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for NormalizedNode {
                fn from(n: $t) -> Self {
                    Self::$variant(n)
                }
            }
        )*
    };
}

impl_from_node!(
    ContainerNode => Container,
    ListNode => List,
    ListEntryNode => ListEntry,
    LeafNode => Leaf,
    LeafSetNode => LeafSet,
    LeafSetEntryNode => LeafSetEntry,
    ChoiceNode => Choice,
    AugmentationNode => Augmentation,
    AnyXmlNode => AnyXml,
);
