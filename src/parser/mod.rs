//! Generic tree parser: labeled elements → normalized nodes.
//!
//! Der Parser kennt nur den [`DataElement`]-Vertrag (Label, Attribute,
//! Text, Kinder); die konkrete Quelle ist ein XML-DOM ([`xml`]) oder ein
//! JSON-Wert ([`json`]).
//!
//! Ablauf pro Daten-Container:
//! 1. Kinder nach QName gruppieren (Reihenfolge des ersten Auftretens)
//! 2. alle Gruppen aufloesen: direktes Kind, sonst ueber die Choice-
//!    Tabelle, sonst ueber die Augmentierungs-Tabelle, sonst `UnknownChild`
//! 3. erst danach parsen und in den Builder uebernehmen
//!
//! Schritt 2 laeuft komplett vor Schritt 3, ein unbekanntes Kind
//! hinterlaesst daher keinen halb gefuellten Builder.

use std::sync::Arc;

use log::debug;

use crate::codec::CodecRegistry;
use crate::node::{
    AnyXmlElement, AnyXmlNode, Attributes, AugmentationNodeBuilder, ChoiceNodeBuilder,
    ContainerNode, ContainerNodeBuilder, DataContainerNodeBuilder, KeyValues, LeafNode,
    LeafSetEntryNode, LeafSetNode, LeafSetNodeBuilder, ListEntryNode, ListEntryNodeBuilder,
    ListNode, ListNodeBuilder, NormalizedNode, PathArgument,
};
use crate::qname::QName;
use crate::schema::navigator::{ChildLookup, real_schemas_for_augment};
use crate::schema::{AugmentationSchema, DataSchemaNode, ListSchema, SchemaScope};
use crate::{Error, FastHashMap, FastIndexMap, Result};

pub mod json;
pub mod xml;

pub use json::JsonElement;
pub use xml::XmlElement;

/// One labeled element of a generic input tree.
pub trait DataElement: Sized {
    /// Label als QName.
    fn qname(&self) -> Result<QName>;

    fn attributes(&self) -> Result<Attributes>;

    /// Text des Elements; `None` fuer explizit fehlende Werte (JSON `null`).
    fn text(&self) -> Result<Option<String>>;

    /// Kind-Elemente in Dokument-Reihenfolge.
    fn children(&self) -> Result<Vec<Self>>;

    /// Inhalt als anyxml-Baum; `None` bei leerem Element.
    fn to_anyxml(&self, name: &QName) -> Result<Option<AnyXmlElement>>;
}

/// Aufgeloeste Kind-Gruppe eines Daten-Containers.
enum Resolved<E> {
    Direct(Arc<DataSchemaNode>, Vec<E>),
    Choice(Arc<DataSchemaNode>, Vec<E>),
    Augmentation(Arc<AugmentationSchema>, Vec<E>),
}

/// Schema-directed parser; caches the child lookup tables per scope.
pub struct NodeParser<'a> {
    codecs: &'a CodecRegistry,
    lookups: FastHashMap<usize, (SchemaScope, Arc<ChildLookup>)>,
    /// Aufgeloeste Augmentierungen je (Ziel, Augmentierung).
    augmentations: FastHashMap<(usize, usize), Arc<AugmentationSchema>>,
}

impl<'a> NodeParser<'a> {
    pub fn new(codecs: &'a CodecRegistry) -> Self {
        Self {
            codecs,
            lookups: FastHashMap::default(),
            augmentations: FastHashMap::default(),
        }
    }

    /// Parses the one element among `elements` that matches the container.
    ///
    /// Null oder mehr als ein passendes Element: `CardinalityViolation`.
    pub fn parse_container<E: DataElement>(
        &mut self,
        elements: &[E],
        schema: &Arc<DataSchemaNode>,
    ) -> Result<ContainerNode> {
        let matching = matching_elements(elements, schema.qname())?;
        let [element] = matching.as_slice() else {
            return Err(Error::CardinalityViolation {
                qname: schema.qname().clone(),
                found: matching.len(),
            });
        };
        self.container(*element, schema)
    }

    /// Parses all elements matching the list into one list node.
    pub fn parse_list_entries<E: DataElement>(
        &mut self,
        elements: &[E],
        schema: &Arc<DataSchemaNode>,
    ) -> Result<ListNode> {
        let matching = matching_elements(elements, schema.qname())?;
        self.list(schema, &matching)
    }

    /// Parses a document root element against the schema context.
    pub fn parse_document<E: DataElement>(&mut self, root: E) -> Result<NormalizedNode> {
        self.parse_top_level(vec![root])
    }

    /// Wie [`parse_document`](Self::parse_document), fuer mehrere
    /// gleichnamige Elemente (z.B. die Entries einer Top-Level-Liste).
    pub fn parse_top_level<E: DataElement>(&mut self, elements: Vec<E>) -> Result<NormalizedNode> {
        let scope = SchemaScope::Context(Arc::clone(self.codecs.schema_context()));
        let qname = match elements.first() {
            Some(first) => first.qname()?,
            None => return Err(Error::EmptyDocument),
        };
        for element in &elements[1..] {
            let other = element.qname()?;
            if other != qname {
                return Err(Error::unknown_child(format!("root {qname}"), other));
            }
        }
        let schema = scope
            .find_child(&qname)
            .ok_or_else(|| Error::unknown_child(scope.describe(), qname.clone()))?;
        let refs: Vec<&E> = elements.iter().collect();
        self.parse_group(&schema, &refs)
    }

    // ========================================================================
    // Knotenarten
    // ========================================================================

    fn parse_group<E: DataElement>(
        &mut self,
        schema: &Arc<DataSchemaNode>,
        elements: &[&E],
    ) -> Result<NormalizedNode> {
        match &**schema {
            DataSchemaNode::Container(_) => {
                let element = single(schema, elements)?;
                Ok(self.container(element, schema)?.into())
            }
            DataSchemaNode::Leaf(_) => {
                let element = single(schema, elements)?;
                // Ein leeres Element ist ein Leaf ohne Wert, wenn der Typ "" ablehnt
                let value = match element.text()? {
                    Some(text) => match self.codecs.codec_for_leaf(schema)?.deserialize(&text) {
                        Ok(value) => Some(value),
                        Err(_) if text.is_empty() => None,
                        Err(e) => return Err(e),
                    },
                    None => None,
                };
                Ok(LeafNode {
                    identifier: schema.qname().clone(),
                    value,
                    attributes: element.attributes()?,
                }
                .into())
            }
            DataSchemaNode::LeafList(leaf_list) => {
                let codec = self.codecs.codec_for_leaf(schema)?;
                let mut builder =
                    LeafSetNodeBuilder::new(leaf_list.qname.clone()).ordered(leaf_list.user_ordered);
                for element in elements {
                    let text = element.text()?.unwrap_or_default();
                    builder.push_entry(LeafSetEntryNode {
                        identifier: leaf_list.qname.clone(),
                        value: codec.deserialize(&text)?,
                        attributes: element.attributes()?,
                    });
                }
                let node: LeafSetNode = builder.build();
                Ok(node.into())
            }
            DataSchemaNode::List(_) => Ok(self.list(schema, elements)?.into()),
            DataSchemaNode::AnyXml(anyxml) => {
                let element = single(schema, elements)?;
                let value = element.to_anyxml(&anyxml.qname)?;
                Ok(AnyXmlNode::new(anyxml.qname.clone(), value).into())
            }
            DataSchemaNode::Choice(choice) => Err(Error::unknown_child(
                "data container",
                choice.qname.clone(),
            )),
        }
    }

    fn container<E: DataElement>(
        &mut self,
        element: &E,
        schema: &Arc<DataSchemaNode>,
    ) -> Result<ContainerNode> {
        let mut builder = ContainerNodeBuilder::new(schema.qname().clone());
        for (name, value) in element.attributes()? {
            builder.add_attribute(name, value);
        }
        self.parse_children(element.children()?, &SchemaScope::Node(Arc::clone(schema)), &mut builder)?;
        Ok(builder.build())
    }

    fn list<E: DataElement>(
        &mut self,
        schema: &Arc<DataSchemaNode>,
        elements: &[&E],
    ) -> Result<ListNode> {
        let DataSchemaNode::List(list) = &**schema else {
            return Err(Error::StructuralMismatch {
                qname: schema.qname().clone(),
                expected: "list",
                found: schema.kind_name(),
            });
        };
        let mut builder =
            ListNodeBuilder::new(list.qname.clone()).ordered(list.user_ordered || !list.is_keyed());
        for element in elements {
            builder.push_entry(self.list_entry(*element, schema, list)?);
        }
        Ok(builder.build())
    }

    /// Entry: erst die Kinder, dann die Predicates aus den Key-Leafs.
    fn list_entry<E: DataElement>(
        &mut self,
        element: &E,
        schema: &Arc<DataSchemaNode>,
        list: &ListSchema,
    ) -> Result<ListEntryNode> {
        let mut builder = ListEntryNodeBuilder::unkeyed(list.qname.clone());
        for (name, value) in element.attributes()? {
            builder.add_attribute(name, value);
        }
        self.parse_children(element.children()?, &SchemaScope::Node(Arc::clone(schema)), &mut builder)?;
        if !list.is_keyed() {
            return Ok(builder.build());
        }

        let mut keys = KeyValues::new();
        for key in &list.keys {
            match builder.children().get(&PathArgument::NodeIdentifier(key.clone())) {
                Some(NormalizedNode::Leaf(LeafNode { value: Some(value), .. })) => {
                    keys.insert(key.clone(), value.clone());
                }
                _ => {
                    return Err(Error::MissingListKey {
                        list: list.qname.clone(),
                        key: key.clone(),
                    });
                }
            }
        }
        let identifier = PathArgument::NodeIdentifierWithPredicates {
            node_type: list.qname.clone(),
            keys,
        };
        Ok(builder.with_identifier(identifier).build())
    }

    // ========================================================================
    // Kinder eines Daten-Containers
    // ========================================================================

    fn lookup(&mut self, scope: &SchemaScope) -> Arc<ChildLookup> {
        let entry = self
            .lookups
            .entry(scope.cache_key())
            .or_insert_with(|| (scope.clone(), Arc::new(ChildLookup::new(scope))));
        Arc::clone(&entry.1)
    }

    /// Stabile Instanz pro Ziel, damit [`lookup`](Self::lookup) sie wiederfindet.
    fn real_augmentation(
        &mut self,
        target: &SchemaScope,
        aug: &Arc<AugmentationSchema>,
    ) -> Arc<AugmentationSchema> {
        let key = (target.cache_key(), Arc::as_ptr(aug) as usize);
        Arc::clone(
            self.augmentations
                .entry(key)
                .or_insert_with(|| real_schemas_for_augment(target, aug)),
        )
    }

    fn resolve_children<E: DataElement>(
        &mut self,
        children: Vec<E>,
        scope: &SchemaScope,
    ) -> Result<Vec<Resolved<E>>> {
        let mut groups: FastIndexMap<QName, Vec<E>> = FastIndexMap::default();
        for child in children {
            groups.entry(child.qname()?).or_default().push(child);
        }

        let lookup = self.lookup(scope);
        let direct = scope.direct_children();
        let mut resolved: Vec<Resolved<E>> = Vec::new();
        let mut choices: FastIndexMap<QName, usize> = FastIndexMap::default();
        let mut augments: FastIndexMap<usize, usize> = FastIndexMap::default();

        for (qname, elements) in groups {
            let direct_hit = direct
                .iter()
                .copied()
                .find(|c| c.qname() == &qname && !matches!(&***c, DataSchemaNode::Choice(_)));
            if let Some(schema) = direct_hit {
                resolved.push(Resolved::Direct(Arc::clone(schema), elements));
            } else if let Some(choice) = lookup.choices.get(&qname) {
                match choices.get(choice.qname()) {
                    Some(&i) => {
                        if let Resolved::Choice(_, group) = &mut resolved[i] {
                            group.extend(elements);
                        }
                    }
                    None => {
                        debug!("{qname} grouped under choice {}", choice.qname());
                        choices.insert(choice.qname().clone(), resolved.len());
                        resolved.push(Resolved::Choice(Arc::clone(choice), elements));
                    }
                }
            } else if let Some(aug) = lookup.augments.get(&qname) {
                let key = Arc::as_ptr(aug) as usize;
                match augments.get(&key) {
                    Some(&i) => {
                        if let Resolved::Augmentation(_, group) = &mut resolved[i] {
                            group.extend(elements);
                        }
                    }
                    None => {
                        augments.insert(key, resolved.len());
                        resolved.push(Resolved::Augmentation(Arc::clone(aug), elements));
                    }
                }
            } else {
                return Err(Error::unknown_child(scope.describe(), qname));
            }
        }
        Ok(resolved)
    }

    fn parse_children<E: DataElement, B: DataContainerNodeBuilder>(
        &mut self,
        children: Vec<E>,
        scope: &SchemaScope,
        builder: &mut B,
    ) -> Result<()> {
        for group in self.resolve_children(children, scope)? {
            let node = match group {
                Resolved::Direct(schema, elements) => {
                    let refs: Vec<&E> = elements.iter().collect();
                    self.parse_group(&schema, &refs)?
                }
                Resolved::Choice(schema, elements) => {
                    let mut choice = ChoiceNodeBuilder::new(schema.qname().clone());
                    self.parse_children(elements, &SchemaScope::Node(schema), &mut choice)?;
                    choice.build_node()
                }
                Resolved::Augmentation(aug, elements) => {
                    let real = self.real_augmentation(scope, &aug);
                    let identifier = real.children.iter().map(|c| c.qname().clone()).collect();
                    let mut augmentation = AugmentationNodeBuilder::new(identifier);
                    self.parse_children(elements, &SchemaScope::Augmentation(real), &mut augmentation)?;
                    augmentation.build_node()
                }
            };
            builder.add_child(node);
        }
        Ok(())
    }
}

fn matching_elements<'e, E: DataElement>(elements: &'e [E], qname: &QName) -> Result<Vec<&'e E>> {
    let mut matching = Vec::new();
    for element in elements {
        if element.qname()? == *qname {
            matching.push(element);
        }
    }
    Ok(matching)
}

/// Genau ein Element fuer einen Einzel-Knoten.
fn single<'e, E>(schema: &DataSchemaNode, elements: &[&'e E]) -> Result<&'e E> {
    match elements {
        [element] => Ok(*element),
        _ => Err(Error::CardinalityViolation {
            qname: schema.qname().clone(),
            found: elements.len(),
        }),
    }
}
