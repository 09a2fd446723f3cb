//! Opaque anyxml content: a small owned DOM.
//!
//! Der Inhalt wird nicht gegen das Schema geprueft und beim Schreiben
//! unveraendert ausgegeben.

use crate::node::Attributes;
use crate::qname::QName;

/// An element of anyxml content.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyXmlElement {
    pub name: QName,
    pub attributes: Attributes,
    pub children: Vec<AnyXmlContent>,
}

/// Kind-Inhalt eines anyxml Elements.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyXmlContent {
    Element(AnyXmlElement),
    Text(String),
}

impl AnyXmlElement {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    pub fn with_element(mut self, child: AnyXmlElement) -> Self {
        self.children.push(AnyXmlContent::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(AnyXmlContent::Text(text.into()));
        self
    }

    /// Konkatenierter Text aller direkten Text-Kinder.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                AnyXmlContent::Text(t) => Some(t.as_str()),
                AnyXmlContent::Element(_) => None,
            })
            .collect()
    }

    pub fn elements(&self) -> impl Iterator<Item = &AnyXmlElement> {
        self.children.iter().filter_map(|c| match c {
            AnyXmlContent::Element(e) => Some(e),
            AnyXmlContent::Text(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_elements_are_separated() {
        let e = AnyXmlElement::new(QName::new("urn:x", "a"))
            .with_text("one ")
            .with_element(AnyXmlElement::new(QName::new("urn:x", "b")))
            .with_text("two");
        assert_eq!(e.text(), "one two");
        assert_eq!(e.elements().count(), 1);
    }
}
