//! Central error types for the normalized-node codec.
//!
//! Jede Variante traegt genug Kontext (QName, erwartete Art, fehlerhafter
//! Text), um einen Fehler ohne erneuten Lauf mit Tracing zu diagnostizieren.

use core::fmt;
use std::borrow::Cow;

use crate::qname::QName;

/// All error types produced by the writer, the parser and the scalar codecs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No schema child with the given name exists under the parent context.
    SchemaMismatch {
        /// Beschreibung des Parent-Kontexts (QName oder "schema context").
        parent: Cow<'static, str>,
        /// Der gesuchte Kind-QName.
        child: QName,
    },
    /// The resolved schema node has a different kind than the event requires.
    StructuralMismatch {
        /// QName des aufgeloesten Schema-Knotens.
        qname: QName,
        /// Was das Event erwartet hat (z.B. "container").
        expected: &'static str,
        /// Was im Schema gefunden wurde.
        found: &'static str,
    },
    /// `end_node` was called with no open frame.
    UnexpectedEndNode,
    /// The input holds no top-level element to parse.
    EmptyDocument,
    /// More than one augmentation matches the candidate child set.
    AmbiguousAugmentation {
        /// Die Kandidaten-Namen aus dem AugmentationIdentifier.
        candidates: Vec<QName>,
    },
    /// No augmentation of the target declares any of the candidate children.
    NoSuchAugmentation {
        /// Die Kandidaten-Namen aus dem AugmentationIdentifier.
        candidates: Vec<QName>,
    },
    /// An element label matches neither a direct, choice- nor augmentation-reachable child.
    UnknownChild {
        /// Beschreibung des Parent-Schemas.
        parent: Cow<'static, str>,
        /// Label des unbekannten Elements.
        child: QName,
    },
    /// A single-instance node appeared zero or more than one time.
    CardinalityViolation {
        /// QName des erwarteten Knotens.
        qname: QName,
        /// Tatsaechliche Anzahl.
        found: usize,
    },
    /// A keyed list entry does not carry a value for every key leaf.
    MissingListKey {
        /// QName der Liste.
        list: QName,
        /// Der fehlende Key.
        key: QName,
    },
    /// Text could not be parsed into the lexical space of its type.
    InvalidValue {
        /// Der fehlerhafte Text.
        value: String,
        /// Grund (z.B. "not a boolean").
        reason: Cow<'static, str>,
    },
    /// Text does not match a pattern restriction.
    PatternMismatch {
        /// Der fehlerhafte Text.
        value: String,
        /// Das (verankerte) Pattern.
        pattern: String,
    },
    /// A value violates a range or length restriction.
    OutOfRange {
        /// Der fehlerhafte Wert.
        value: String,
        /// Die deklarierte Restriktion, z.B. "range 1.5..5.5".
        constraint: String,
    },
    /// No union member type accepted the text.
    UnionDecodeError {
        /// Der fehlerhafte Text.
        value: String,
        /// Die Member-Typen in deklarierter Reihenfolge.
        members: String,
    },
    /// An identity name could not be resolved or is not derived from the base.
    UnknownIdentity {
        /// Der Identity-Text bzw. -Name.
        value: String,
    },
    /// The underlying sink failed; wraps the cause.
    WriteFailure(String),
    /// XML input could not be parsed.
    XmlParseError(String),
    /// JSON input could not be parsed or has an unexpected shape.
    JsonParseError(String),
}

/// Schreibt eine QName-Liste kommagetrennt.
fn write_qnames(f: &mut fmt::Formatter<'_>, names: &[QName]) -> fmt::Result {
    for (i, q) in names.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{q}")?;
    }
    Ok(())
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaMismatch { parent, child } => {
                write!(f, "schema mismatch: no child {child} under {parent}")
            }
            Self::StructuralMismatch { qname, expected, found } => {
                write!(f, "structural mismatch: node {qname} is a {found}, expected {expected}")
            }
            Self::UnexpectedEndNode => write!(f, "end_node without an open node"),
            Self::EmptyDocument => write!(f, "document without a top-level element"),
            Self::AmbiguousAugmentation { candidates } => {
                write!(f, "ambiguous augmentation for children [")?;
                write_qnames(f, candidates)?;
                write!(f, "]")
            }
            Self::NoSuchAugmentation { candidates } => {
                write!(f, "no augmentation declares children [")?;
                write_qnames(f, candidates)?;
                write!(f, "]")
            }
            Self::UnknownChild { parent, child } => {
                write!(f, "unknown child {child} under {parent}")
            }
            Self::CardinalityViolation { qname, found } => {
                write!(f, "cardinality violation: expected exactly one {qname}, found {found}")
            }
            Self::MissingListKey { list, key } => {
                write!(f, "list entry of {list} is missing key {key}")
            }
            Self::InvalidValue { value, reason } => {
                write!(f, "invalid value '{value}': {reason}")
            }
            Self::PatternMismatch { value, pattern } => {
                write!(f, "value '{value}' does not match pattern '{pattern}'")
            }
            Self::OutOfRange { value, constraint } => {
                write!(f, "value '{value}' violates {constraint}")
            }
            Self::UnionDecodeError { value, members } => {
                write!(f, "no union member of [{members}] accepts '{value}'")
            }
            Self::UnknownIdentity { value } => write!(f, "unknown identity '{value}'"),
            Self::WriteFailure(msg) => write!(f, "write failure: {msg}"),
            Self::XmlParseError(msg) => write!(f, "XML parse error: {msg}"),
            Self::JsonParseError(msg) => write!(f, "JSON parse error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::WriteFailure(e.to_string())
    }
}

impl Error {
    /// Erstellt einen `SchemaMismatch` Fehler.
    pub fn schema_mismatch(parent: impl Into<Cow<'static, str>>, child: QName) -> Self {
        Self::SchemaMismatch {
            parent: parent.into(),
            child,
        }
    }

    /// Erstellt einen `UnknownChild` Fehler.
    pub fn unknown_child(parent: impl Into<Cow<'static, str>>, child: QName) -> Self {
        Self::UnknownChild {
            parent: parent.into(),
            child,
        }
    }

    /// Erstellt einen `InvalidValue` Fehler.
    pub fn invalid_value(value: impl Into<String>, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidValue {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Erstellt einen `OutOfRange` Fehler.
    pub fn out_of_range(value: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::OutOfRange {
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Wrappt einen Sink-Fehler als `WriteFailure`.
    pub fn write_failure(cause: impl fmt::Display) -> Self {
        Self::WriteFailure(cause.to_string())
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
