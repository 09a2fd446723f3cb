//! [`DataElement`] over a roxmltree DOM.

use roxmltree::{Node, NodeType};

use super::DataElement;
use crate::node::{AnyXmlContent, AnyXmlElement, Attributes};
use crate::qname::QName;
use crate::schema::SchemaContext;
use crate::{Error, Result};

/// One XML element node of a parsed document.
#[derive(Debug, Clone, Copy)]
pub struct XmlElement<'a, 'input> {
    node: Node<'a, 'input>,
    context: &'a SchemaContext,
}

impl<'a, 'input> XmlElement<'a, 'input> {
    pub fn new(node: Node<'a, 'input>, context: &'a SchemaContext) -> Self {
        Self { node, context }
    }

    /// QName zu Namespace + lokalem Namen; die Revision kommt aus dem Modul.
    fn qualify(&self, namespace: Option<&str>, local: &str) -> QName {
        let namespace = namespace.unwrap_or("");
        match self.context.module_by_namespace(namespace) {
            Some(module) => QName::in_module(&module.module, local),
            None => QName::new(namespace, local),
        }
    }

    fn anyxml_children(&self, element: &mut AnyXmlElement) {
        for child in self.node.children() {
            match child.node_type() {
                NodeType::Element => {
                    let child = Self::new(child, self.context);
                    let tag = child.node.tag_name();
                    let mut inner = AnyXmlElement::new(QName::new(tag.namespace().unwrap_or(""), tag.name()));
                    inner.attributes = child.raw_attributes();
                    child.anyxml_children(&mut inner);
                    element.children.push(AnyXmlContent::Element(inner));
                }
                NodeType::Text => {
                    if let Some(text) = child.text() {
                        if !text.trim().is_empty() {
                            element.children.push(AnyXmlContent::Text(text.to_owned()));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Attribute mit Namespace-URI, ohne Revision.
    fn raw_attributes(&self) -> Attributes {
        self.node
            .attributes()
            .map(|a| (QName::new(a.namespace().unwrap_or(""), a.name()), a.value().to_owned()))
            .collect()
    }
}

impl DataElement for XmlElement<'_, '_> {
    fn qname(&self) -> Result<QName> {
        let tag = self.node.tag_name();
        Ok(self.qualify(tag.namespace(), tag.name()))
    }

    fn attributes(&self) -> Result<Attributes> {
        Ok(self.raw_attributes())
    }

    /// Zusammengesetzter Text aller Text-Kinder; Elemente sind hier ein Fehler.
    fn text(&self) -> Result<Option<String>> {
        let mut text = String::new();
        for child in self.node.children() {
            match child.node_type() {
                NodeType::Text => text.push_str(child.text().unwrap_or("")),
                NodeType::Element => {
                    return Err(Error::XmlParseError(format!(
                        "element {} inside leaf {}",
                        child.tag_name().name(),
                        self.node.tag_name().name()
                    )));
                }
                _ => {}
            }
        }
        Ok(Some(text))
    }

    fn children(&self) -> Result<Vec<Self>> {
        Ok(self
            .node
            .children()
            .filter(|c| c.is_element())
            .map(|c| Self::new(c, self.context))
            .collect())
    }

    fn to_anyxml(&self, name: &QName) -> Result<Option<AnyXmlElement>> {
        let mut element = AnyXmlElement::new(name.clone());
        element.attributes = self.raw_attributes();
        self.anyxml_children(&mut element);
        if element.children.is_empty() && element.attributes.is_empty() {
            return Ok(None);
        }
        Ok(Some(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qname::QNameModule;
    use crate::schema::Module;

    fn context() -> std::sync::Arc<SchemaContext> {
        SchemaContext::builder()
            .module(Module::new("rev", QNameModule::new("urn:rev", Some("2024-01-01"))))
            .build()
    }

    /// Die Revision kommt aus dem Modul des Namespace.
    #[test]
    fn qname_takes_module_revision() {
        let ctx = context();
        let doc = roxmltree::Document::parse(r#"<top xmlns="urn:rev"><a>1</a></top>"#).unwrap();
        let root = XmlElement::new(doc.root_element(), &ctx);
        assert_eq!(root.qname().unwrap(), QName::with_revision("urn:rev", "2024-01-01", "top"));
        let children = root.children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].text().unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn unknown_namespace_kept_without_revision() {
        let ctx = context();
        let doc = roxmltree::Document::parse(r#"<x xmlns="urn:other"/>"#).unwrap();
        let root = XmlElement::new(doc.root_element(), &ctx);
        assert_eq!(root.qname().unwrap(), QName::new("urn:other", "x"));
        assert_eq!(root.text().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn nested_element_in_leaf_text_is_error() {
        let ctx = context();
        let doc = roxmltree::Document::parse(r#"<x xmlns="urn:rev"><y/></x>"#).unwrap();
        let root = XmlElement::new(doc.root_element(), &ctx);
        assert!(matches!(root.text().unwrap_err(), Error::XmlParseError(_)));
    }

    #[test]
    fn attributes_and_anyxml() {
        let ctx = context();
        let xml = r#"<data xmlns="urn:rev" xmlns:m="urn:meta" m:op="merge" plain="1"><inner xmlns="urn:foreign">hi</inner></data>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let root = XmlElement::new(doc.root_element(), &ctx);
        let attrs = root.attributes().unwrap();
        assert_eq!(attrs.get(&QName::new("urn:meta", "op")).map(String::as_str), Some("merge"));
        assert_eq!(attrs.get(&QName::new("", "plain")).map(String::as_str), Some("1"));

        let any = root.to_anyxml(&QName::new("urn:rev", "data")).unwrap().unwrap();
        let inner = any.elements().next().unwrap();
        assert_eq!(inner.name, QName::new("urn:foreign", "inner"));
        assert_eq!(inner.text(), "hi");
    }
}
