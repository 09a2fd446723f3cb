//! Union codec: member codecs in declared order.

use std::sync::Arc;

use log::trace;

use super::TypeCodec;
use crate::node::Value;
use crate::{Error, Result};

/// Codec for a union type.
///
/// Decode: der erste Member, der den Text akzeptiert, gewinnt. Ueberlappende
/// Member werden nicht erkannt; ein spaeterer Member ist fuer Texte, die ein
/// frueherer akzeptiert, nie erreichbar.
///
/// Encode: der Member wird ueber die Laufzeit-Art des Werts bestimmt
/// ([`TypeCodec::accepts`]), nicht ueber den Text.
#[derive(Debug, Clone)]
pub struct UnionCodec {
    pub(crate) members: Vec<Arc<TypeCodec>>,
    /// Member-Typnamen fuer Fehlermeldungen, z.B. "int32, string".
    pub(crate) member_names: String,
}

impl UnionCodec {
    pub fn members(&self) -> &[Arc<TypeCodec>] {
        &self.members
    }

    pub fn deserialize(&self, text: &str) -> Result<Value> {
        for (i, member) in self.members.iter().enumerate() {
            match member.deserialize(text) {
                Ok(value) => return Ok(value),
                Err(e) => trace!("union member {i} rejected '{text}': {e}"),
            }
        }
        Err(Error::UnionDecodeError {
            value: text.to_owned(),
            members: self.member_names.clone(),
        })
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        let mut last_err = None;
        for member in self.members.iter().filter(|m| m.accepts(value)) {
            match member.serialize(value) {
                Ok(text) => return Ok(text),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            Error::invalid_value(
                value.to_string(),
                format!(
                    "no member of union [{}] takes a {} value",
                    self.member_names,
                    value.kind_name()
                ),
            )
        }))
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.members.iter().any(|m| m.accepts(value))
    }
}
