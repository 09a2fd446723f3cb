//! Depth-first driver: turns a normalized-node tree into stream events.

use super::{ListEntryNode, NormalizedNode, PathArgument};
use crate::Result;
use crate::writer::NormalizedNodeStreamWriter;

/// Walks a [`NormalizedNode`] and feeds a [`NormalizedNodeStreamWriter`].
///
/// Bei keyed List-Entries werden die Key-Leafs zuerst geschrieben (in der
/// Reihenfolge der Predicates), danach die uebrigen Kinder.
pub struct NormalizedNodeWriter<'w, W: NormalizedNodeStreamWriter + ?Sized> {
    writer: &'w mut W,
}

impl<'w, W: NormalizedNodeStreamWriter + ?Sized> NormalizedNodeWriter<'w, W> {
    pub fn new(writer: &'w mut W) -> Self {
        Self { writer }
    }

    /// Schreibt `node` samt Teilbaum.
    pub fn write(&mut self, node: &NormalizedNode) -> Result<()> {
        match node {
            NormalizedNode::Leaf(leaf) => {
                self.writer
                    .leaf_node(&leaf.identifier, leaf.value.as_ref(), &leaf.attributes)
            }
            NormalizedNode::LeafSetEntry(entry) => {
                self.writer.leaf_set_entry(&entry.value, &entry.attributes)
            }
            NormalizedNode::AnyXml(anyxml) => {
                self.writer.anyxml_node(&anyxml.identifier, anyxml.value.as_ref())
            }
            NormalizedNode::LeafSet(set) => {
                self.writer.start_leaf_set(&set.identifier, set.ordered)?;
                for entry in &set.entries {
                    self.writer.leaf_set_entry(&entry.value, &entry.attributes)?;
                }
                self.writer.end_node()
            }
            NormalizedNode::Container(container) => {
                self.writer
                    .start_container(&container.identifier, &container.attributes)?;
                self.write_children(container.children.values())?;
                self.writer.end_node()
            }
            NormalizedNode::List(list) => {
                self.writer.start_list(&list.identifier, list.ordered)?;
                for entry in &list.entries {
                    self.write_entry(entry)?;
                }
                self.writer.end_node()
            }
            NormalizedNode::ListEntry(entry) => self.write_entry(entry),
            NormalizedNode::Choice(choice) => {
                self.writer.start_choice(&choice.identifier)?;
                self.write_children(choice.children.values())?;
                self.writer.end_node()
            }
            NormalizedNode::Augmentation(aug) => {
                self.writer.start_augmentation(&aug.identifier)?;
                self.write_children(aug.children.values())?;
                self.writer.end_node()
            }
        }
    }

    fn write_children<'n>(&mut self, children: impl Iterator<Item = &'n NormalizedNode>) -> Result<()> {
        for child in children {
            self.write(child)?;
        }
        Ok(())
    }

    fn write_entry(&mut self, entry: &ListEntryNode) -> Result<()> {
        self.writer
            .start_list_entry(&entry.identifier, &entry.attributes)?;
        match &entry.identifier {
            PathArgument::NodeIdentifierWithPredicates { keys, .. } => {
                let key_ids: Vec<PathArgument> = keys
                    .iter()
                    .map(|(k, _)| PathArgument::NodeIdentifier(k.clone()))
                    .collect();
                for id in &key_ids {
                    if let Some(child) = entry.children.get(id) {
                        self.write(child)?;
                    }
                }
                self.write_children(
                    entry
                        .children
                        .iter()
                        .filter(|(id, _)| !key_ids.contains(id))
                        .map(|(_, child)| child),
                )?;
            }
            _ => self.write_children(entry.children.values())?,
        }
        self.writer.end_node()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::node::{
        AnyXmlElement, Attributes, AugmentationNodeBuilder, ContainerNodeBuilder, KeyValues,
        LeafNode, LeafSetNodeBuilder, ListEntryNodeBuilder, ListNodeBuilder, Value,
    };
    use crate::qname::QName;

    fn q(local: &str) -> QName {
        QName::new("urn:test:walker", local)
    }

    /// Protokolliert die Events als Text.
    #[derive(Default)]
    struct EventLog(Vec<String>);

    impl NormalizedNodeStreamWriter for EventLog {
        fn leaf_node(&mut self, name: &QName, value: Option<&Value>, _: &Attributes) -> Result<()> {
            let v = value.map(|v| v.to_string()).unwrap_or_default();
            self.0.push(format!("leaf {}={v}", name.local_name));
            Ok(())
        }
        fn start_leaf_set(&mut self, name: &QName, _: bool) -> Result<()> {
            self.0.push(format!("leaf-list {}", name.local_name));
            Ok(())
        }
        fn leaf_set_entry(&mut self, value: &Value, _: &Attributes) -> Result<()> {
            self.0.push(format!("entry {value}"));
            Ok(())
        }
        fn start_container(&mut self, name: &QName, _: &Attributes) -> Result<()> {
            self.0.push(format!("container {}", name.local_name));
            Ok(())
        }
        fn start_list(&mut self, name: &QName, _: bool) -> Result<()> {
            self.0.push(format!("list {}", name.local_name));
            Ok(())
        }
        fn start_list_entry(&mut self, identifier: &PathArgument, _: &Attributes) -> Result<()> {
            self.0.push(format!("list-entry {identifier}"));
            Ok(())
        }
        fn start_choice(&mut self, name: &QName) -> Result<()> {
            self.0.push(format!("choice {}", name.local_name));
            Ok(())
        }
        fn start_augmentation(&mut self, candidates: &BTreeSet<QName>) -> Result<()> {
            self.0.push(format!("augmentation {}", candidates.len()));
            Ok(())
        }
        fn anyxml_node(&mut self, name: &QName, _: Option<&AnyXmlElement>) -> Result<()> {
            self.0.push(format!("anyxml {}", name.local_name));
            Ok(())
        }
        fn end_node(&mut self) -> Result<()> {
            self.0.push("end".into());
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// Key-Leafs kommen vor allen anderen Kindern.
    #[test]
    fn keys_written_first() {
        let entry = ListEntryNodeBuilder::new(PathArgument::NodeIdentifierWithPredicates {
            node_type: q("user"),
            keys: KeyValues::new().with(q("name"), "bob"),
        })
        .child(LeafNode::new(q("role"), "admin"))
        .child(LeafNode::new(q("name"), "bob"))
        .build();
        let list = ListNodeBuilder::new(q("user")).entry(entry).build();

        let mut log = EventLog::default();
        NormalizedNodeWriter::new(&mut log).write(&list.into()).unwrap();
        assert_eq!(log.0[0], "list user");
        assert_eq!(log.0[2], "leaf name=bob");
        assert_eq!(log.0[3], "leaf role=admin");
        assert_eq!(log.0[4..], ["end", "end"]);
    }

    #[test]
    fn every_start_has_an_end() {
        let tree = ContainerNodeBuilder::new(q("top"))
            .child(LeafSetNodeBuilder::new(q("tags")).value("a").value("b").build())
            .child(
                AugmentationNodeBuilder::new([q("extra")].into_iter().collect())
                    .child(LeafNode::new(q("extra"), 1u8))
                    .build(),
            )
            .build();
        let mut log = EventLog::default();
        NormalizedNodeWriter::new(&mut log).write(&tree.into()).unwrap();
        let starts = log
            .0
            .iter()
            .filter(|e| e.starts_with("container") || e.starts_with("leaf-list") || e.starts_with("augmentation"))
            .count();
        let ends = log.0.iter().filter(|e| *e == "end").count();
        assert_eq!(starts, 3);
        assert_eq!(ends, 3);
        assert!(log.0.contains(&"entry b".to_string()));
    }
}
