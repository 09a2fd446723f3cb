//! Scalar codec registry: type definition → bidirectional text ↔ value codec.
//!
//! Die Aufloesung laeuft die Ableitungskette bis zum Wurzeltyp hinunter
//! und sammelt unterwegs alle Restriktionen (pattern, range, length).
//! Union und Identityref werden als eigene Codecs behandelt.
//!
//! Die Registry ist nach dem Aufbau nur noch lesend und kann zwischen
//! mehreren Writer-/Parser-Instanzen (auch Threads) geteilt werden.

mod constraints;
mod identityref;
mod numeric;
mod primitive;
mod union;

use std::sync::{Arc, PoisonError, RwLock};

use log::trace;

use crate::node::Value;
use crate::qname::QNameModule;
use crate::schema::types::{BuiltinType, TypeDefinition, TypeKind};
use crate::schema::{DataSchemaNode, SchemaContext};
use crate::{Error, FastHashMap, Result};

use constraints::Constraints;
pub use identityref::IdentityRefCodec;
pub use numeric::{DecimalCodec, IntegerCodec};
pub use primitive::{BinaryCodec, BitsCodec, BooleanCodec, EmptyCodec, EnumerationCodec, StringCodec};
pub use union::UnionCodec;

/// A codec for one resolved type. Closed set; dispatch is exhaustive.
#[derive(Debug, Clone)]
pub enum TypeCodec {
    String(StringCodec),
    Boolean(BooleanCodec),
    Empty(EmptyCodec),
    Binary(BinaryCodec),
    Decimal(DecimalCodec),
    Integer(IntegerCodec),
    Enumeration(EnumerationCodec),
    Bits(BitsCodec),
    Union(UnionCodec),
    IdentityRef(IdentityRefCodec),
}

impl TypeCodec {
    /// Text → Wert, inklusive aller Restriktionen der Kette.
    pub fn deserialize(&self, text: &str) -> Result<Value> {
        match self {
            Self::String(c) => c.deserialize(text),
            Self::Boolean(c) => c.deserialize(text),
            Self::Empty(c) => c.deserialize(text),
            Self::Binary(c) => c.deserialize(text),
            Self::Decimal(c) => c.deserialize(text),
            Self::Integer(c) => c.deserialize(text),
            Self::Enumeration(c) => c.deserialize(text),
            Self::Bits(c) => c.deserialize(text),
            Self::Union(c) => c.deserialize(text),
            Self::IdentityRef(c) => c.deserialize(text),
        }
    }

    /// Wert → kanonischer Text.
    pub fn serialize(&self, value: &Value) -> Result<String> {
        match self {
            Self::String(c) => c.serialize(value),
            Self::Boolean(c) => c.serialize(value),
            Self::Empty(c) => c.serialize(value),
            Self::Binary(c) => c.serialize(value),
            Self::Decimal(c) => c.serialize(value),
            Self::Integer(c) => c.serialize(value),
            Self::Enumeration(c) => c.serialize(value),
            Self::Bits(c) => c.serialize(value),
            Self::Union(c) => c.serialize(value),
            Self::IdentityRef(c) => c.serialize(value),
        }
    }

    /// Kann dieser Codec einen Wert dieser Laufzeit-Art serialisieren?
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String(_), Value::String(_))
            | (Self::Boolean(_), Value::Boolean(_))
            | (Self::Empty(_), Value::Empty)
            | (Self::Binary(_), Value::Binary(_))
            | (Self::Decimal(_), Value::Decimal(_))
            | (Self::Enumeration(_), Value::Enumeration(_))
            | (Self::Bits(_), Value::Bits(_))
            | (Self::IdentityRef(_), Value::IdentityRef(_)) => true,
            (Self::Integer(c), v) => c.accepts(v),
            (Self::Union(c), v) => c.accepts(v),
            _ => false,
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Schluessel: Adresse der Typdefinition + Modul des Leafs.
type CacheKey = (usize, QNameModule);

#[derive(Debug)]
struct CachedCodec {
    /// Haelt die Typdefinition am Leben, damit die Adresse eindeutig bleibt.
    _ty: Arc<TypeDefinition>,
    codec: Arc<TypeCodec>,
}

/// Maps type definitions to codecs, caching each resolution.
#[derive(Debug)]
pub struct CodecRegistry {
    context: Arc<SchemaContext>,
    cache: RwLock<FastHashMap<CacheKey, CachedCodec>>,
}

impl CodecRegistry {
    pub fn new(context: Arc<SchemaContext>) -> Self {
        Self {
            context,
            cache: RwLock::new(FastHashMap::default()),
        }
    }

    pub fn schema_context(&self) -> &Arc<SchemaContext> {
        &self.context
    }

    /// Codec fuer `ty` im Kontext des Schema-Knotens `schema`.
    ///
    /// Der Knoten bestimmt das Modul, relativ zu dem Identityrefs
    /// (un)qualifiziert werden.
    pub fn codec_for(&self, schema: &DataSchemaNode, ty: &Arc<TypeDefinition>) -> Arc<TypeCodec> {
        let module = schema.qname().module();
        let key = (Arc::as_ptr(ty) as usize, module);
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(&hit.codec);
        }

        trace!("building codec for type {} of {}", ty, schema.qname());
        let codec = Arc::new(self.build(&key.1, ty));
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| CachedCodec {
                _ty: Arc::clone(ty),
                codec: Arc::clone(&codec),
            });
        codec
    }

    /// Codec fuer den Typ eines Leaf- oder Leaf-List-Knotens.
    pub fn codec_for_leaf(&self, schema: &DataSchemaNode) -> Result<Arc<TypeCodec>> {
        let ty = schema.leaf_type().ok_or_else(|| Error::StructuralMismatch {
            qname: schema.qname().clone(),
            expected: "leaf",
            found: schema.kind_name(),
        })?;
        Ok(self.codec_for(schema, ty))
    }

    fn build(&self, module: &QNameModule, ty: &TypeDefinition) -> TypeCodec {
        let constraints = Constraints::from_chain(ty);
        match &ty.root().kind {
            TypeKind::Builtin(builtin) => match builtin {
                BuiltinType::String => TypeCodec::String(StringCodec { constraints }),
                BuiltinType::Boolean => TypeCodec::Boolean(BooleanCodec),
                BuiltinType::Empty => TypeCodec::Empty(EmptyCodec),
                BuiltinType::Binary => TypeCodec::Binary(BinaryCodec { constraints }),
                BuiltinType::Decimal64 { fraction_digits } => TypeCodec::Decimal(DecimalCodec {
                    fraction_digits: *fraction_digits,
                    constraints,
                }),
                BuiltinType::Integer(kind) => TypeCodec::Integer(IntegerCodec {
                    kind: *kind,
                    constraints,
                }),
                BuiltinType::Enumeration(values) => TypeCodec::Enumeration(EnumerationCodec {
                    values: values.clone(),
                }),
                BuiltinType::Bits(bits) => TypeCodec::Bits(BitsCodec { bits: bits.clone() }),
            },
            TypeKind::Union(members) => {
                let names: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                TypeCodec::Union(UnionCodec {
                    members: members.iter().map(|m| Arc::new(self.build(module, m))).collect(),
                    member_names: names.join(", "),
                })
            }
            TypeKind::IdentityRef { base } => TypeCodec::IdentityRef(IdentityRefCodec::new(
                Arc::clone(&self.context),
                module.clone(),
                base.clone(),
            )),
            TypeKind::Derived(_) => unreachable!("root() never yields a derived type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal64;
    use crate::qname::QName;
    use crate::schema::types::{IntegerKind, Restrictions};
    use crate::schema::LeafSchema;

    const NS: &str = "urn:test:codec";

    fn q(local: &str) -> QName {
        QName::new(NS, local)
    }

    fn registry() -> CodecRegistry {
        CodecRegistry::new(SchemaContext::builder().build())
    }

    fn leaf(ty: &Arc<TypeDefinition>) -> Arc<DataSchemaNode> {
        LeafSchema::new(q("leaf"), Arc::clone(ty)).build()
    }

    fn int32() -> Arc<TypeDefinition> {
        TypeDefinition::builtin(BuiltinType::Integer(IntegerKind::Int32))
    }

    fn string() -> Arc<TypeDefinition> {
        TypeDefinition::builtin(BuiltinType::String)
    }

    /// [int32, string]: "abc" faellt auf string durch, "12" bleibt int32.
    #[test]
    fn union_first_successful_member_wins() {
        let reg = registry();
        let u = TypeDefinition::union(q("u"), vec![int32(), string()]);
        let codec = reg.codec_for(&leaf(&u), &u);
        assert_eq!(codec.deserialize("abc").unwrap(), Value::String("abc".into()));
        assert_eq!(codec.deserialize("12").unwrap(), Value::Int32(12));

        let u = TypeDefinition::union(q("u2"), vec![string(), int32()]);
        let codec = reg.codec_for(&leaf(&u), &u);
        assert_eq!(codec.deserialize("abc").unwrap(), Value::String("abc".into()));
        assert_eq!(codec.deserialize("12").unwrap(), Value::String("12".into()));
    }

    #[test]
    fn union_encode_follows_runtime_kind() {
        let reg = registry();
        let u = TypeDefinition::union(q("u"), vec![int32(), string()]);
        let codec = reg.codec_for(&leaf(&u), &u);
        assert_eq!(codec.serialize(&Value::Int32(5)).unwrap(), "5");
        assert_eq!(codec.serialize(&Value::String("5".into())).unwrap(), "5");
        assert!(codec.serialize(&Value::Boolean(true)).is_err());
    }

    #[test]
    fn union_decode_error_lists_members() {
        let reg = registry();
        let u = TypeDefinition::union(
            q("u"),
            vec![int32(), TypeDefinition::builtin(BuiltinType::Boolean)],
        );
        let err = reg.codec_for(&leaf(&u), &u).deserialize("abc").unwrap_err();
        assert!(matches!(err, Error::UnionDecodeError { .. }), "{err}");
        assert!(err.to_string().contains("int32, boolean"), "{err}");
    }

    /// Range auf einem Typedef zwei Ebenen ueber dem Leaf-Typ.
    #[test]
    fn constraint_inherited_two_levels() {
        let reg = registry();
        let base = TypeDefinition::builtin(BuiltinType::Decimal64 { fraction_digits: 1 });
        let ranged = TypeDefinition::derived(
            q("ranged"),
            base,
            Restrictions::new().with_range(Decimal64::new(15, 1), Decimal64::new(55, 1)),
        );
        let middle = TypeDefinition::derived(q("middle"), ranged, Restrictions::new());
        let nominal = TypeDefinition::derived(q("nominal"), middle, Restrictions::new());
        let codec = reg.codec_for(&leaf(&nominal), &nominal);

        assert!(codec.deserialize("1.5").is_ok());
        assert!(codec.deserialize("5.5").is_ok());
        let err = codec.deserialize("1.4").unwrap_err();
        assert!(matches!(err, Error::OutOfRange { .. }), "{err}");
    }

    #[test]
    fn pattern_from_base_applies_to_derived() {
        let reg = registry();
        let letters = TypeDefinition::derived(q("letters"), string(), Restrictions::new().with_pattern("[a-z]*"));
        let short = TypeDefinition::derived(q("short"), letters, Restrictions::new().with_length(0, 3));
        let codec = reg.codec_for(&leaf(&short), &short);
        assert!(codec.deserialize("abc").is_ok());
        let err = codec.deserialize("ab1").unwrap_err();
        assert!(matches!(err, Error::PatternMismatch { .. }), "{err}");
        assert!(matches!(codec.deserialize("abcd").unwrap_err(), Error::OutOfRange { .. }));
    }

    #[test]
    fn registry_caches_per_type_and_module() {
        let reg = registry();
        let t = int32();
        let l = leaf(&t);
        let a = reg.codec_for(&l, &t);
        let b = reg.codec_for(&l, &t);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn codec_for_leaf_rejects_non_leaf() {
        let reg = registry();
        let c = crate::schema::ContainerSchema::new(q("c")).build();
        let err = reg.codec_for_leaf(&c).unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch { .. }), "{err}");
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodecRegistry>();
        assert_send_sync::<Arc<TypeCodec>>();
    }
}
