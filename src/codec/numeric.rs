//! Codecs fuer Integer-Typen und decimal64.

use super::constraints::Constraints;
use super::primitive::wrong_kind;
use crate::decimal::Decimal64;
use crate::node::Value;
use crate::schema::types::{IntegerKind, Number};
use crate::{Error, Result};

// ============================================================================
// Integer
// ============================================================================

/// int8..int64, uint8..uint64 (dezimale Schreibweise, optionales Vorzeichen).
#[derive(Debug, Clone)]
pub struct IntegerCodec {
    pub(crate) kind: IntegerKind,
    pub(crate) constraints: Constraints,
}

impl IntegerCodec {
    pub fn kind(&self) -> IntegerKind {
        self.kind
    }

    fn parse(&self, text: &str) -> Result<i128> {
        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_value(text, format!("not an {}", self.kind.name())));
        }
        // Mehr als 39 Stellen passen in kein i128; die Grenzpruefung folgt unten
        text.parse::<i128>().map_err(|_| self.type_range_error(text))
    }

    fn type_range_error(&self, text: &str) -> Error {
        let (min, max) = self.kind.bounds();
        Error::out_of_range(text, format!("{} range {min}..{max}", self.kind.name()))
    }

    fn check(&self, text: &str, v: i128) -> Result<()> {
        let (min, max) = self.kind.bounds();
        if v < min || v > max {
            return Err(self.type_range_error(text));
        }
        self.constraints.check_range(text, &Number::Integer(v))
    }

    fn to_value(&self, v: i128) -> Option<Value> {
        Some(match self.kind {
            IntegerKind::Int8 => Value::Int8(i8::try_from(v).ok()?),
            IntegerKind::Int16 => Value::Int16(i16::try_from(v).ok()?),
            IntegerKind::Int32 => Value::Int32(i32::try_from(v).ok()?),
            IntegerKind::Int64 => Value::Int64(i64::try_from(v).ok()?),
            IntegerKind::Uint8 => Value::Uint8(u8::try_from(v).ok()?),
            IntegerKind::Uint16 => Value::Uint16(u16::try_from(v).ok()?),
            IntegerKind::Uint32 => Value::Uint32(u32::try_from(v).ok()?),
            IntegerKind::Uint64 => Value::Uint64(u64::try_from(v).ok()?),
        })
    }

    /// Wert der passenden Variante als i128.
    fn from_value(&self, value: &Value) -> Option<i128> {
        Some(match (self.kind, value) {
            (IntegerKind::Int8, Value::Int8(v)) => (*v).into(),
            (IntegerKind::Int16, Value::Int16(v)) => (*v).into(),
            (IntegerKind::Int32, Value::Int32(v)) => (*v).into(),
            (IntegerKind::Int64, Value::Int64(v)) => (*v).into(),
            (IntegerKind::Uint8, Value::Uint8(v)) => (*v).into(),
            (IntegerKind::Uint16, Value::Uint16(v)) => (*v).into(),
            (IntegerKind::Uint32, Value::Uint32(v)) => (*v).into(),
            (IntegerKind::Uint64, Value::Uint64(v)) => (*v).into(),
            _ => return None,
        })
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.from_value(value).is_some()
    }

    pub fn deserialize(&self, text: &str) -> Result<Value> {
        let v = self.parse(text)?;
        self.check(text, v)?;
        self.to_value(v).ok_or_else(|| self.type_range_error(text))
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        let v = self
            .from_value(value)
            .ok_or_else(|| wrong_kind(value, self.kind.name()))?;
        let text = v.to_string();
        self.check(&text, v)?;
        Ok(text)
    }
}

// ============================================================================
// decimal64
// ============================================================================

/// Exakte Festkomma-Werte; keine Rundung ueber Fliesskomma.
#[derive(Debug, Clone)]
pub struct DecimalCodec {
    pub(crate) fraction_digits: u8,
    pub(crate) constraints: Constraints,
}

impl DecimalCodec {
    pub fn fraction_digits(&self) -> u8 {
        self.fraction_digits
    }

    pub fn deserialize(&self, text: &str) -> Result<Value> {
        let d = Decimal64::parse(text, self.fraction_digits)?;
        self.constraints.check_range(text, &Number::Decimal(d))?;
        Ok(Value::Decimal(d))
    }

    /// Werte mit anderer Skalierung werden exakt umskaliert.
    pub fn serialize(&self, value: &Value) -> Result<String> {
        let Value::Decimal(d) = value else {
            return Err(wrong_kind(value, "decimal64"));
        };
        let text = d.to_string();
        if !d.has_valid_scale() {
            return Err(Error::invalid_value(text, "fraction-digits exceeds 18"));
        }
        let d = if d.fraction_digits() == self.fraction_digits {
            *d
        } else {
            Decimal64::parse(&text, self.fraction_digits)?
        };
        self.constraints.check_range(&text, &Number::Decimal(d))?;
        Ok(text)
    }
}
