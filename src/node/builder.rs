//! Builders: accumulate identity, attributes and children, then freeze.

use std::collections::BTreeSet;

use super::{
    Attributes, AugmentationNode, ChoiceNode, Children, ContainerNode, LeafSetEntryNode,
    LeafSetNode, ListEntryNode, ListNode, NormalizedNode, PathArgument, Value,
};
use crate::qname::QName;

/// Gemeinsame Schnittstelle der Builder fuer Knoten mit Kindern.
pub trait DataContainerNodeBuilder {
    /// Fuegt ein Kind hinzu; ein Kind mit gleichem Identifier wird ersetzt.
    fn add_child(&mut self, child: NormalizedNode);

    /// Setzt ein Attribut (ignoriert von Knoten ohne Attribute).
    fn add_attribute(&mut self, _name: QName, _value: String) {}

    fn build_node(self) -> NormalizedNode;
}

fn insert_child(children: &mut Children, child: NormalizedNode) {
    children.insert(child.path_argument(), child);
}

// ============================================================================
// Container
// ============================================================================

#[derive(Debug, Clone)]
pub struct ContainerNodeBuilder {
    identifier: QName,
    attributes: Attributes,
    children: Children,
}

impl ContainerNodeBuilder {
    pub fn new(identifier: QName) -> Self {
        Self {
            identifier,
            attributes: Attributes::default(),
            children: Children::default(),
        }
    }

    pub fn child(mut self, child: impl Into<NormalizedNode>) -> Self {
        self.add_child(child.into());
        self
    }

    pub fn attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    pub fn build(self) -> ContainerNode {
        ContainerNode {
            identifier: self.identifier,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

impl DataContainerNodeBuilder for ContainerNodeBuilder {
    fn add_child(&mut self, child: NormalizedNode) {
        insert_child(&mut self.children, child);
    }

    fn add_attribute(&mut self, name: QName, value: String) {
        self.attributes.insert(name, value);
    }

    fn build_node(self) -> NormalizedNode {
        NormalizedNode::Container(self.build())
    }
}

// ============================================================================
// List-Entry
// ============================================================================

#[derive(Debug, Clone)]
pub struct ListEntryNodeBuilder {
    identifier: PathArgument,
    attributes: Attributes,
    children: Children,
}

impl ListEntryNodeBuilder {
    /// Entry mit beliebigem Identifier (keyed oder unkeyed).
    pub fn new(identifier: PathArgument) -> Self {
        Self {
            identifier,
            attributes: Attributes::default(),
            children: Children::default(),
        }
    }

    /// Entry einer unkeyed Liste.
    pub fn unkeyed(list: QName) -> Self {
        Self::new(PathArgument::NodeIdentifier(list))
    }

    pub fn child(mut self, child: impl Into<NormalizedNode>) -> Self {
        self.add_child(child.into());
        self
    }

    pub fn attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    /// Identifier nachtraeglich setzen (Keys stehen erst nach den Kindern fest).
    pub fn with_identifier(mut self, identifier: PathArgument) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn build(self) -> ListEntryNode {
        ListEntryNode {
            identifier: self.identifier,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

impl DataContainerNodeBuilder for ListEntryNodeBuilder {
    fn add_child(&mut self, child: NormalizedNode) {
        insert_child(&mut self.children, child);
    }

    fn add_attribute(&mut self, name: QName, value: String) {
        self.attributes.insert(name, value);
    }

    fn build_node(self) -> NormalizedNode {
        NormalizedNode::ListEntry(self.build())
    }
}

// ============================================================================
// Choice / Augmentation
// ============================================================================

#[derive(Debug, Clone)]
pub struct ChoiceNodeBuilder {
    identifier: QName,
    children: Children,
}

impl ChoiceNodeBuilder {
    pub fn new(identifier: QName) -> Self {
        Self {
            identifier,
            children: Children::default(),
        }
    }

    pub fn child(mut self, child: impl Into<NormalizedNode>) -> Self {
        self.add_child(child.into());
        self
    }

    pub fn build(self) -> ChoiceNode {
        ChoiceNode {
            identifier: self.identifier,
            children: self.children,
        }
    }
}

impl DataContainerNodeBuilder for ChoiceNodeBuilder {
    fn add_child(&mut self, child: NormalizedNode) {
        insert_child(&mut self.children, child);
    }

    fn build_node(self) -> NormalizedNode {
        NormalizedNode::Choice(self.build())
    }
}

#[derive(Debug, Clone)]
pub struct AugmentationNodeBuilder {
    identifier: BTreeSet<QName>,
    children: Children,
}

impl AugmentationNodeBuilder {
    pub fn new(identifier: BTreeSet<QName>) -> Self {
        Self {
            identifier,
            children: Children::default(),
        }
    }

    pub fn child(mut self, child: impl Into<NormalizedNode>) -> Self {
        self.add_child(child.into());
        self
    }

    pub fn build(self) -> AugmentationNode {
        AugmentationNode {
            identifier: self.identifier,
            children: self.children,
        }
    }
}

impl DataContainerNodeBuilder for AugmentationNodeBuilder {
    fn add_child(&mut self, child: NormalizedNode) {
        insert_child(&mut self.children, child);
    }

    fn build_node(self) -> NormalizedNode {
        NormalizedNode::Augmentation(self.build())
    }
}

// ============================================================================
// List / Leaf-List
// ============================================================================

#[derive(Debug, Clone)]
pub struct ListNodeBuilder {
    identifier: QName,
    ordered: bool,
    entries: Vec<ListEntryNode>,
}

impl ListNodeBuilder {
    pub fn new(identifier: QName) -> Self {
        Self {
            identifier,
            ordered: false,
            entries: Vec::new(),
        }
    }

    /// Reihenfolge der Entries ist relevant (ordered-by user, unkeyed).
    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    /// Haengt ein Entry an; ein Entry mit gleichem Identifier wird ersetzt,
    /// ausser bei unkeyed Entries (die alle denselben Identifier tragen).
    pub fn entry(mut self, entry: ListEntryNode) -> Self {
        self.push_entry(entry);
        self
    }

    pub fn push_entry(&mut self, entry: ListEntryNode) {
        let keyed = matches!(entry.identifier, PathArgument::NodeIdentifierWithPredicates { .. });
        match self.entries.iter_mut().find(|e| keyed && e.identifier == entry.identifier) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn build(self) -> ListNode {
        ListNode {
            identifier: self.identifier,
            ordered: self.ordered,
            entries: self.entries,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeafSetNodeBuilder {
    identifier: QName,
    ordered: bool,
    entries: Vec<LeafSetEntryNode>,
}

impl LeafSetNodeBuilder {
    pub fn new(identifier: QName) -> Self {
        Self {
            identifier,
            ordered: false,
            entries: Vec::new(),
        }
    }

    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    /// Entry mit dem QName der Leaf-List.
    pub fn value(self, value: impl Into<Value>) -> Self {
        let entry = LeafSetEntryNode::new(self.identifier.clone(), value);
        self.entry(entry)
    }

    pub fn entry(mut self, entry: LeafSetEntryNode) -> Self {
        self.push_entry(entry);
        self
    }

    pub fn push_entry(&mut self, entry: LeafSetEntryNode) {
        self.entries.push(entry);
    }

    pub fn build(self) -> LeafSetNode {
        LeafSetNode {
            identifier: self.identifier,
            ordered: self.ordered,
            entries: self.entries,
        }
    }
}
