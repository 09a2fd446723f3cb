//! Typed scalar values of leaves and leaf-list entries.

use std::fmt;

use base64::Engine;

use crate::decimal::Decimal64;
use crate::qname::QName;
use crate::schema::types::Number;

/// A decoded scalar value.
///
/// Die Variante entspricht dem Laufzeit-Typ; bei Unions bestimmt sie,
/// welcher Member-Codec beim Encode greift.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    String(String),
    Boolean(bool),
    Empty,
    Binary(Vec<u8>),
    Decimal(Decimal64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    /// Name des Enum-Werts.
    Enumeration(String),
    /// Gesetzte Bits in kanonischer Reihenfolge (nach Position).
    Bits(Vec<String>),
    IdentityRef(QName),
}

impl Value {
    /// Name des Laufzeit-Typs fuer Fehlermeldungen.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Empty => "empty",
            Self::Binary(_) => "binary",
            Self::Decimal(_) => "decimal64",
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Uint8(_) => "uint8",
            Self::Uint16(_) => "uint16",
            Self::Uint32(_) => "uint32",
            Self::Uint64(_) => "uint64",
            Self::Enumeration(_) => "enumeration",
            Self::Bits(_) => "bits",
            Self::IdentityRef(_) => "identityref",
        }
    }

    /// Numerischer Wert fuer Range-Pruefungen.
    pub fn as_number(&self) -> Option<Number> {
        Some(match self {
            Self::Decimal(d) => Number::Decimal(*d),
            Self::Int8(v) => Number::Integer((*v).into()),
            Self::Int16(v) => Number::Integer((*v).into()),
            Self::Int32(v) => Number::Integer((*v).into()),
            Self::Int64(v) => Number::Integer((*v).into()),
            Self::Uint8(v) => Number::Integer((*v).into()),
            Self::Uint16(v) => Number::Integer((*v).into()),
            Self::Uint32(v) => Number::Integer((*v).into()),
            Self::Uint64(v) => Number::Integer((*v).into()),
            _ => return None,
        })
    }
}

/// Lexikalische Form ohne Schema-Kontext (Identities in Clark-Notation).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Enumeration(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Empty => Ok(()),
            Self::Binary(bytes) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Bits(bits) => f.write_str(&bits.join(" ")),
            Self::IdentityRef(q) => write!(f, "{q}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Decimal64> for Value {
    fn from(d: Decimal64) -> Self {
        Self::Decimal(d)
    }
}

impl From<QName> for Value {
    fn from(q: QName) -> Self {
        Self::IdentityRef(q)
    }
}

macro_rules! impl_from_int {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_int!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
);
