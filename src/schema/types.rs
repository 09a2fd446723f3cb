//! Type definitions and their restrictions.
//!
//! Eine Typdefinition ist entweder ein Built-in Typ, eine Ableitung
//! (Base-Typ + Restriktionen), eine Union oder eine Identity-Referenz.
//! Ableitungsketten sind endlich und azyklisch: `Arc` erlaubt keine
//! Zyklen ohne Interior Mutability.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use log::debug;
use regex::Regex;

use crate::decimal::Decimal64;
use crate::qname::QName;

/// Namespace der YANG Built-in Typen.
pub const YANG_NS: &str = "urn:ietf:params:xml:ns:yang:1";

// ============================================================================
// Built-in Typen
// ============================================================================

/// Integer-Varianten mit ihren Wertebereichen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntegerKind {
    /// Inklusiver Wertebereich des Typs.
    pub fn bounds(self) -> (i128, i128) {
        match self {
            Self::Int8 => (i8::MIN.into(), i8::MAX.into()),
            Self::Int16 => (i16::MIN.into(), i16::MAX.into()),
            Self::Int32 => (i32::MIN.into(), i32::MAX.into()),
            Self::Int64 => (i64::MIN.into(), i64::MAX.into()),
            Self::Uint8 => (0, u8::MAX.into()),
            Self::Uint16 => (0, u16::MAX.into()),
            Self::Uint32 => (0, u32::MAX.into()),
            Self::Uint64 => (0, u64::MAX.into()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }
}

/// Ein Enum-Wert (Name + zugewiesene Zahl).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumPair {
    pub name: Arc<str>,
    pub value: i32,
}

/// Ein Bit einer `bits` Definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitDef {
    pub name: Arc<str>,
    pub position: u32,
}

/// The primitive kinds at the root of every restriction chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinType {
    String,
    Boolean,
    Empty,
    Binary,
    Decimal64 { fraction_digits: u8 },
    Integer(IntegerKind),
    Enumeration(Vec<EnumPair>),
    Bits(Vec<BitDef>),
}

impl BuiltinType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Empty => "empty",
            Self::Binary => "binary",
            Self::Decimal64 { .. } => "decimal64",
            Self::Integer(kind) => kind.name(),
            Self::Enumeration(_) => "enumeration",
            Self::Bits(_) => "bits",
        }
    }
}

// ============================================================================
// Restriktionen
// ============================================================================

/// A compiled `pattern` restriction, anchored at both ends.
#[derive(Debug, Clone)]
pub struct PatternConstraint {
    regex: Regex,
}

impl PatternConstraint {
    /// Kompiliert `^(?:raw)$`. Ungueltige Patterns ergeben `None`.
    pub fn new(raw: &str) -> Option<Self> {
        let anchored = format!("^(?:{raw})$");
        match Regex::new(&anchored) {
            Ok(regex) => Some(Self { regex }),
            Err(e) => {
                debug!("pattern \"{anchored}\" failed to compile, ignoring it: {e}");
                None
            }
        }
    }

    /// Das verankerte Pattern.
    pub fn regular_expression(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Numerische Grenze einer Range-Restriktion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Number {
    Integer(i128),
    Decimal(Decimal64),
}

impl Number {
    /// (Mantisse, Skalierung)
    fn parts(&self) -> (i128, u8) {
        match self {
            Self::Integer(v) => (*v, 0),
            Self::Decimal(d) => (i128::from(d.unscaled()), d.fraction_digits()),
        }
    }

    /// Numerischer Vergleich ueber Integer/Decimal hinweg.
    pub fn compare(&self, other: &Number) -> Ordering {
        let (a, sa) = self.parts();
        let (b, sb) = other.parts();
        let scale = sa.max(sb);
        let a = a * 10i128.pow(u32::from(scale - sa));
        let b = b * 10i128.pow(u32::from(scale - sb));
        a.cmp(&b)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Integer(v.into())
    }
}

impl From<u64> for Number {
    fn from(v: u64) -> Self {
        Self::Integer(v.into())
    }
}

impl From<Decimal64> for Number {
    fn from(d: Decimal64) -> Self {
        Self::Decimal(d)
    }
}

/// Inklusives Intervall `min..max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeConstraint {
    pub min: Number,
    pub max: Number,
}

impl RangeConstraint {
    pub fn contains(&self, value: &Number) -> bool {
        value.compare(&self.min) != Ordering::Less && value.compare(&self.max) != Ordering::Greater
    }
}

impl fmt::Display for RangeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Inklusives Laengen-Intervall (Zeichen bei Strings, Bytes bei Binary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthConstraint {
    pub min: u64,
    pub max: u64,
}

impl LengthConstraint {
    pub fn contains(&self, len: u64) -> bool {
        self.min <= len && len <= self.max
    }
}

impl fmt::Display for LengthConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Restrictions declared on one level of a type chain.
///
/// Mehrere Ranges (bzw. Lengths) einer Ebene sind Alternativen (`|`),
/// mehrere Patterns muessen alle passen.
#[derive(Debug, Clone, Default)]
pub struct Restrictions {
    pub patterns: Vec<PatternConstraint>,
    pub ranges: Vec<RangeConstraint>,
    pub lengths: Vec<LengthConstraint>,
}

impl Restrictions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fuegt ein Pattern hinzu; nicht kompilierbare Patterns werden verworfen.
    pub fn with_pattern(mut self, raw: &str) -> Self {
        if let Some(p) = PatternConstraint::new(raw) {
            self.patterns.push(p);
        }
        self
    }

    pub fn with_range(mut self, min: impl Into<Number>, max: impl Into<Number>) -> Self {
        self.ranges.push(RangeConstraint {
            min: min.into(),
            max: max.into(),
        });
        self
    }

    pub fn with_length(mut self, min: u64, max: u64) -> Self {
        self.lengths.push(LengthConstraint { min, max });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.ranges.is_empty() && self.lengths.is_empty()
    }

    /// "range 1..5 | 10..20" fuer Fehlermeldungen.
    pub(crate) fn describe_ranges(&self) -> String {
        describe("range", self.ranges.iter())
    }

    pub(crate) fn describe_lengths(&self) -> String {
        describe("length", self.lengths.iter())
    }
}

fn describe<T: fmt::Display>(label: &str, items: impl Iterator<Item = T>) -> String {
    let parts: Vec<String> = items.map(|r| r.to_string()).collect();
    format!("{label} {}", parts.join(" | "))
}

// ============================================================================
// TypeDefinition
// ============================================================================

/// Die Art einer Typdefinition.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Builtin(BuiltinType),
    /// Ableitung von einem Base-Typ.
    Derived(Arc<TypeDefinition>),
    /// Member-Typen in deklarierter Reihenfolge.
    Union(Vec<Arc<TypeDefinition>>),
    /// Identity-Referenz auf Identities abgeleitet von `base`.
    IdentityRef { base: QName },
}

/// A type definition: name, kind and the restrictions declared at this level.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub name: QName,
    pub kind: TypeKind,
    pub restrictions: Restrictions,
}

impl TypeDefinition {
    /// Built-in Typ im YANG Namespace.
    pub fn builtin(ty: BuiltinType) -> Arc<Self> {
        Arc::new(Self {
            name: QName::new(YANG_NS, ty.name()),
            kind: TypeKind::Builtin(ty),
            restrictions: Restrictions::default(),
        })
    }

    /// Typedef oder anonyme Restriktion eines Base-Typs.
    pub fn derived(name: QName, base: Arc<TypeDefinition>, restrictions: Restrictions) -> Arc<Self> {
        Arc::new(Self {
            name,
            kind: TypeKind::Derived(base),
            restrictions,
        })
    }

    pub fn union(name: QName, members: Vec<Arc<TypeDefinition>>) -> Arc<Self> {
        Arc::new(Self {
            name,
            kind: TypeKind::Union(members),
            restrictions: Restrictions::default(),
        })
    }

    pub fn identityref(name: QName, base: QName) -> Arc<Self> {
        Arc::new(Self {
            name,
            kind: TypeKind::IdentityRef { base },
            restrictions: Restrictions::default(),
        })
    }

    /// Direkter Base-Typ, falls abgeleitet.
    pub fn base(&self) -> Option<&Arc<TypeDefinition>> {
        match &self.kind {
            TypeKind::Derived(base) => Some(base),
            _ => None,
        }
    }

    /// Die Kette von diesem Typ bis zur Wurzel (dieser Typ zuerst).
    pub fn chain(&self) -> impl Iterator<Item = &TypeDefinition> {
        std::iter::successors(Some(self), |t| t.base().map(|b| &**b))
    }

    /// Die Wurzel der Ableitungskette (Built-in, Union oder Identityref).
    pub fn root(&self) -> &TypeDefinition {
        let mut current = self;
        while let Some(base) = current.base() {
            current = base;
        }
        current
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name.local_name)
    }
}
