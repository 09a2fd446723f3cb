//! [`DataElement`] over a serde_json document (RFC 7951 style).
//!
//! - Objekt-Member ergeben Elemente; Arrays ergeben ein Element pro Eintrag
//!   (ausser `[null]`, das ist der Wert des Typs `empty`)
//! - `modul:name` wechselt den Namespace, ein Name ohne Prefix erbt ihn
//! - `"@"` (im Objekt) und `"@name"` (neben einem Leaf) tragen Attribute

use serde_json::{Map, Value as JsonValue};

use super::DataElement;
use crate::node::{AnyXmlContent, AnyXmlElement, Attributes};
use crate::qname::QName;
use crate::schema::SchemaContext;
use crate::{Error, Result};

/// One member (or array item) of a JSON document.
#[derive(Debug, Clone)]
pub struct JsonElement<'a> {
    name: QName,
    value: &'a JsonValue,
    /// `"@name"`-Geschwister eines Leafs.
    leaf_attributes: Option<&'a JsonValue>,
    context: &'a SchemaContext,
}

fn parse_error(msg: impl Into<String>) -> Error {
    Error::JsonParseError(msg.into())
}

/// `[null]`: Wert eines `empty` Leafs.
fn is_empty_marker(value: &JsonValue) -> bool {
    matches!(value, JsonValue::Array(items) if items.len() == 1 && items[0].is_null())
}

impl<'a> JsonElement<'a> {
    pub fn new(name: QName, value: &'a JsonValue, context: &'a SchemaContext) -> Self {
        Self {
            name,
            value,
            leaf_attributes: None,
            context,
        }
    }

    /// Elemente der obersten Ebene; alle Member muessen modul-qualifiziert sein.
    pub fn from_document(document: &'a JsonValue, context: &'a SchemaContext) -> Result<Vec<Self>> {
        match document {
            JsonValue::Object(map) => members(map, None, context),
            other => Err(parse_error(format!("document must be an object, found {other}"))),
        }
    }

    pub fn value(&self) -> &'a JsonValue {
        self.value
    }

    fn attribute_name(&self, key: &str) -> Result<QName> {
        if let Some(rest) = key.strip_prefix('{') {
            let (namespace, local) = rest
                .split_once('}')
                .ok_or_else(|| parse_error(format!("malformed attribute name '{key}'")))?;
            return Ok(QName::new(namespace, local));
        }
        match key.split_once(':') {
            Some((prefix, local)) => {
                let module = self
                    .context
                    .module_by_name(prefix)
                    .ok_or_else(|| parse_error(format!("unknown module '{prefix}' in attribute '{key}'")))?;
                Ok(QName::new(module.module.namespace.clone(), local))
            }
            None => Ok(QName::new("", key)),
        }
    }

    fn parse_attributes(&self, object: &JsonValue) -> Result<Attributes> {
        let JsonValue::Object(map) = object else {
            return Err(parse_error(format!("attributes of {} must be an object", self.name)));
        };
        let mut attributes = Attributes::default();
        for (key, value) in map {
            let JsonValue::String(text) = value else {
                return Err(parse_error(format!("attribute '{key}' must be a string")));
            };
            attributes.insert(self.attribute_name(key)?, text.clone());
        }
        Ok(attributes)
    }
}

/// Member-Name → QName; ohne Prefix gilt der Namespace des Parents.
fn member_name(key: &str, parent: Option<&QName>, context: &SchemaContext) -> Result<QName> {
    match (key.split_once(':'), parent) {
        (Some((prefix, local)), _) => {
            let module = context
                .module_by_name(prefix)
                .ok_or_else(|| parse_error(format!("unknown module '{prefix}' in member '{key}'")))?;
            Ok(QName::in_module(&module.module, local))
        }
        (None, Some(parent)) => Ok(QName::in_module(&parent.module(), key)),
        (None, None) => Err(parse_error(format!(
            "top-level member '{key}' must be module-qualified"
        ))),
    }
}

fn members<'a>(
    map: &'a Map<String, JsonValue>,
    parent: Option<&QName>,
    context: &'a SchemaContext,
) -> Result<Vec<JsonElement<'a>>> {
    let mut elements = Vec::with_capacity(map.len());
    for (key, value) in map {
        if key.starts_with('@') {
            continue;
        }
        let name = member_name(key, parent, context)?;
        match value {
            JsonValue::Array(items) if !is_empty_marker(value) => {
                elements.extend(items.iter().map(|item| JsonElement::new(name.clone(), item, context)));
            }
            _ => elements.push(JsonElement {
                name,
                value,
                leaf_attributes: map.get(&format!("@{key}")),
                context,
            }),
        }
    }
    Ok(elements)
}

/// anyxml-Inhalt: Objekte werden zu Elementen im Namespace von `name`.
fn json_to_anyxml(name: QName, value: &JsonValue) -> AnyXmlElement {
    let mut element = AnyXmlElement::new(name.clone());
    match value {
        JsonValue::Null => {}
        JsonValue::String(s) => element.children.push(AnyXmlContent::Text(s.clone())),
        JsonValue::Object(map) => {
            for (key, child) in map {
                let child_name = QName::new(name.namespace.clone(), key.as_str());
                let items: Vec<&JsonValue> = match child {
                    JsonValue::Array(items) => items.iter().collect(),
                    single => vec![single],
                };
                for item in items {
                    element
                        .children
                        .push(AnyXmlContent::Element(json_to_anyxml(child_name.clone(), item)));
                }
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                element.children.extend(json_to_anyxml(name.clone(), item).children);
            }
        }
        other => element.children.push(AnyXmlContent::Text(other.to_string())),
    }
    element
}

impl DataElement for JsonElement<'_> {
    fn qname(&self) -> Result<QName> {
        Ok(self.name.clone())
    }

    fn attributes(&self) -> Result<Attributes> {
        let source = match self.value {
            JsonValue::Object(map) => map.get("@"),
            _ => self.leaf_attributes,
        };
        match source {
            Some(object) => self.parse_attributes(object),
            None => Ok(Attributes::default()),
        }
    }

    fn text(&self) -> Result<Option<String>> {
        match self.value {
            JsonValue::Null => Ok(None),
            JsonValue::String(s) => Ok(Some(s.clone())),
            JsonValue::Bool(b) => Ok(Some(b.to_string())),
            JsonValue::Number(n) => Ok(Some(n.to_string())),
            value if is_empty_marker(value) => Ok(Some(String::new())),
            other => Err(parse_error(format!("expected a scalar for {}, found {other}", self.name))),
        }
    }

    fn children(&self) -> Result<Vec<Self>> {
        match self.value {
            JsonValue::Object(map) => members(map, Some(&self.name), self.context),
            other => Err(parse_error(format!("expected an object for {}, found {other}", self.name))),
        }
    }

    fn to_anyxml(&self, name: &QName) -> Result<Option<AnyXmlElement>> {
        let element = json_to_anyxml(name.clone(), self.value);
        if element.children.is_empty() {
            return Ok(None);
        }
        Ok(Some(element))
    }
}
