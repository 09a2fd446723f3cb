//! Codecs fuer string, boolean, empty, binary, enumeration und bits.

use base64::Engine;

use super::constraints::Constraints;
use crate::node::Value;
use crate::schema::types::{BitDef, EnumPair};
use crate::{Error, Result};

/// Fehler fuer einen Wert der falschen Laufzeit-Art.
pub(crate) fn wrong_kind(value: &Value, expected: &'static str) -> Error {
    Error::invalid_value(
        value.to_string(),
        format!("expected a {expected} value, got {}", value.kind_name()),
    )
}

// ============================================================================
// string
// ============================================================================

#[derive(Debug, Clone)]
pub struct StringCodec {
    pub(crate) constraints: Constraints,
}

impl StringCodec {
    fn check(&self, text: &str) -> Result<()> {
        self.constraints.check_length(text, text.chars().count() as u64)?;
        self.constraints.check_patterns(text)
    }

    pub fn deserialize(&self, text: &str) -> Result<Value> {
        self.check(text)?;
        Ok(Value::String(text.to_owned()))
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        let Value::String(s) = value else {
            return Err(wrong_kind(value, "string"));
        };
        self.check(s)?;
        Ok(s.clone())
    }
}

// ============================================================================
// boolean / empty
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCodec;

impl BooleanCodec {
    pub fn deserialize(&self, text: &str) -> Result<Value> {
        match text {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(Error::invalid_value(text, "not a boolean")),
        }
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        match value {
            Value::Boolean(b) => Ok(b.to_string()),
            other => Err(wrong_kind(other, "boolean")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCodec;

impl EmptyCodec {
    pub fn deserialize(&self, text: &str) -> Result<Value> {
        if text.is_empty() {
            Ok(Value::Empty)
        } else {
            Err(Error::invalid_value(text, "type empty carries no value"))
        }
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        match value {
            Value::Empty => Ok(String::new()),
            other => Err(wrong_kind(other, "empty")),
        }
    }
}

// ============================================================================
// binary
// ============================================================================

/// Base64 (RFC 4648) mit Laengen-Restriktion auf die dekodierten Bytes.
#[derive(Debug, Clone)]
pub struct BinaryCodec {
    pub(crate) constraints: Constraints,
}

impl BinaryCodec {
    pub fn deserialize(&self, text: &str) -> Result<Value> {
        // Zeilenumbrueche in langen Base64-Texten sind erlaubt
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| Error::invalid_value(text, format!("invalid base64: {e}")))?;
        self.constraints.check_length(text, bytes.len() as u64)?;
        Ok(Value::Binary(bytes))
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        let Value::Binary(bytes) = value else {
            return Err(wrong_kind(value, "binary"));
        };
        let text = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.constraints.check_length(&text, bytes.len() as u64)?;
        Ok(text)
    }
}

// ============================================================================
// enumeration
// ============================================================================

#[derive(Debug, Clone)]
pub struct EnumerationCodec {
    pub(crate) values: Vec<EnumPair>,
}

impl EnumerationCodec {
    fn lookup(&self, name: &str) -> Result<&EnumPair> {
        self.values
            .iter()
            .find(|p| &*p.name == name)
            .ok_or_else(|| Error::invalid_value(name, "not a member of the enumeration"))
    }

    pub fn deserialize(&self, text: &str) -> Result<Value> {
        let pair = self.lookup(text)?;
        Ok(Value::Enumeration(pair.name.to_string()))
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        let Value::Enumeration(name) = value else {
            return Err(wrong_kind(value, "enumeration"));
        };
        Ok(self.lookup(name)?.name.to_string())
    }
}

// ============================================================================
// bits
// ============================================================================

/// Leerzeichen-getrennte Bit-Namen; kanonisch nach Position sortiert.
#[derive(Debug, Clone)]
pub struct BitsCodec {
    pub(crate) bits: Vec<BitDef>,
}

impl BitsCodec {
    fn canonical<'a>(&self, shown: &str, names: impl Iterator<Item = &'a str>) -> Result<Vec<String>> {
        let mut set: Vec<&BitDef> = Vec::new();
        for name in names {
            let def = self
                .bits
                .iter()
                .find(|b| &*b.name == name)
                .ok_or_else(|| Error::invalid_value(shown, format!("unknown bit '{name}'")))?;
            if set.iter().any(|b| b.position == def.position) {
                return Err(Error::invalid_value(shown, format!("bit '{name}' set twice")));
            }
            set.push(def);
        }
        set.sort_by_key(|b| b.position);
        Ok(set.into_iter().map(|b| b.name.to_string()).collect())
    }

    pub fn deserialize(&self, text: &str) -> Result<Value> {
        Ok(Value::Bits(self.canonical(text, text.split_ascii_whitespace())?))
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        let Value::Bits(names) = value else {
            return Err(wrong_kind(value, "bits"));
        };
        let shown = names.join(" ");
        Ok(self.canonical(&shown, names.iter().map(String::as_str))?.join(" "))
    }
}
