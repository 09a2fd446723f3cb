//! Identityref codec: `module-name:identity` text form.
//!
//! Der Prefix ist der Modulname der Identity. Liegt die Identity im selben
//! Modul wie der Leaf, entfaellt der Prefix.

use std::sync::Arc;

use crate::node::Value;
use crate::qname::{QName, QNameModule};
use crate::schema::SchemaContext;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct IdentityRefCodec {
    context: Arc<SchemaContext>,
    /// Modul des Leafs, relativ zu dem unqualifizierte Namen gelten.
    parent_module: QNameModule,
    base: QName,
}

impl IdentityRefCodec {
    pub fn new(context: Arc<SchemaContext>, parent_module: QNameModule, base: QName) -> Self {
        Self {
            context,
            parent_module,
            base,
        }
    }

    pub fn base(&self) -> &QName {
        &self.base
    }

    /// Loest `prefix:name` bzw. `name` auf und prueft die Ableitung von der Base.
    pub fn deserialize(&self, text: &str) -> Result<Value> {
        let unknown = || Error::UnknownIdentity {
            value: text.to_owned(),
        };
        let (module, local) = match text.split_once(':') {
            Some((prefix, local)) => {
                let module = self.context.module_by_name(prefix).ok_or_else(unknown)?;
                (module.module.clone(), local)
            }
            None => (self.parent_module.clone(), text),
        };
        if local.is_empty() {
            return Err(unknown());
        }
        let qname = QName::in_module(&module, local);
        let identity = self.context.find_identity(&qname).ok_or_else(unknown)?;
        if !self.context.is_derived_from(&identity.qname, &self.base) {
            return Err(unknown());
        }
        Ok(Value::IdentityRef(identity.qname.clone()))
    }

    pub fn serialize(&self, value: &Value) -> Result<String> {
        let Value::IdentityRef(qname) = value else {
            return Err(super::primitive::wrong_kind(value, "identityref"));
        };
        if qname.is_in_module(&self.parent_module) {
            return Ok(qname.local_name.to_string());
        }
        let module = self
            .context
            .find_module(&qname.module())
            .ok_or_else(|| Error::UnknownIdentity {
                value: qname.to_string(),
            })?;
        Ok(format!("{}:{}", module.name, qname.local_name))
    }
}
