//! Read-only schema model.
//!
//! Das Modell wird von einem externen YANG-Compiler erzeugt und hier nur
//! abgefragt: Kind-nach-Name, Knotenart, Typdefinition, Restriktionen,
//! Modul/Namespace eines QName, Augmentierungen. Nach dem Aufbau ist es
//! unveraenderlich und kann zwischen Threads geteilt werden.
//!
//! - [`node`]: Datenknoten (container, list, leaf, leaf-list, choice/case, anyxml)
//! - [`types`]: Typdefinitionen und Restriktionen
//! - [`navigator`]: Kind-Aufloesung durch choice/case und Augmentierungen

use std::borrow::Cow;
use std::sync::Arc;

use crate::qname::{QName, QNameModule};

pub mod navigator;
pub mod node;
pub mod types;

pub use navigator::SchemaScope;
pub use node::{
    AnyXmlSchema, AugmentationSchema, CaseSchema, ChoiceSchema, ContainerSchema, DataSchemaNode,
    LeafListSchema, LeafSchema, ListSchema,
};
pub use types::{BuiltinType, IntegerKind, Restrictions, TypeDefinition, TypeKind};

/// Ein Schema-Knoten mit eigenen Datenkindern.
pub trait DataNodeContainer {
    /// Direkt deklarierte Kinder (ohne Augmentierungen).
    fn child_nodes(&self) -> &[Arc<DataSchemaNode>];

    /// Augmentierungen, die dieses Ziel erweitern.
    fn augmentations(&self) -> &[Arc<AugmentationSchema>] {
        &[]
    }

    /// Direktes Kind mit dem gegebenen Namen.
    fn data_child_by_name(&self, qname: &QName) -> Option<&Arc<DataSchemaNode>> {
        self.child_nodes().iter().find(|c| c.qname() == qname)
    }

    /// Beschreibung fuer Fehlermeldungen.
    fn describe(&self) -> Cow<'static, str>;
}

// ============================================================================
// Module und Identities
// ============================================================================

/// An identity and the identities it is derived from.
#[derive(Debug, Clone)]
pub struct IdentitySchema {
    pub qname: QName,
    pub bases: Vec<QName>,
}

impl IdentitySchema {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            bases: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: QName) -> Self {
        self.bases.push(base);
        self
    }
}

/// A module: name, namespace/revision and its identities.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: Arc<str>,
    pub module: QNameModule,
    pub identities: Vec<IdentitySchema>,
}

impl Module {
    pub fn new(name: impl Into<Arc<str>>, module: QNameModule) -> Self {
        Self {
            name: name.into(),
            module,
            identities: Vec::new(),
        }
    }

    pub fn with_identity(mut self, identity: IdentitySchema) -> Self {
        self.identities.push(identity);
        self
    }

    /// QName im Namespace dieses Moduls.
    pub fn qname(&self, local_name: &str) -> QName {
        QName::in_module(&self.module, local_name)
    }
}

// ============================================================================
// SchemaContext
// ============================================================================

/// The root of the schema model: all modules and their top-level data nodes.
#[derive(Debug, Clone, Default)]
pub struct SchemaContext {
    modules: Vec<Module>,
    children: Vec<Arc<DataSchemaNode>>,
    augmentations: Vec<Arc<AugmentationSchema>>,
}

impl SchemaContext {
    pub fn builder() -> SchemaContextBuilder {
        SchemaContextBuilder::default()
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module_by_name(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| &*m.name == name)
    }

    /// Erstes Modul mit dem Namespace, unabhaengig von der Revision.
    pub fn module_by_namespace(&self, namespace: &str) -> Option<&Module> {
        self.modules.iter().find(|m| &*m.module.namespace == namespace)
    }

    /// Exakte Suche; faellt auf den Namespace allein zurueck.
    pub fn find_module(&self, module: &QNameModule) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.module == *module)
            .or_else(|| self.module_by_namespace(&module.namespace))
    }

    pub fn find_identity(&self, qname: &QName) -> Option<&IdentitySchema> {
        self.find_module(&qname.module())?
            .identities
            .iter()
            .find(|i| i.qname == *qname)
    }

    /// True if `identity` is derived (directly or transitively) from `base`.
    ///
    /// Eine Identity ist nicht von sich selbst abgeleitet.
    pub fn is_derived_from(&self, identity: &QName, base: &QName) -> bool {
        let mut pending: Vec<&QName> = vec![identity];
        let mut seen: Vec<&QName> = Vec::new();
        while let Some(current) = pending.pop() {
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            let Some(def) = self.find_identity(current) else {
                continue;
            };
            for b in &def.bases {
                if b == base {
                    return true;
                }
                pending.push(b);
            }
        }
        false
    }
}

impl DataNodeContainer for SchemaContext {
    fn child_nodes(&self) -> &[Arc<DataSchemaNode>] {
        &self.children
    }

    fn augmentations(&self) -> &[Arc<AugmentationSchema>] {
        &self.augmentations
    }

    fn describe(&self) -> Cow<'static, str> {
        Cow::Borrowed("schema context")
    }
}

/// Builder fuer [`SchemaContext`].
#[derive(Debug, Default)]
pub struct SchemaContextBuilder {
    inner: SchemaContext,
}

impl SchemaContextBuilder {
    pub fn module(mut self, module: Module) -> Self {
        self.inner.modules.push(module);
        self
    }

    pub fn child(mut self, child: Arc<DataSchemaNode>) -> Self {
        self.inner.children.push(child);
        self
    }

    pub fn augmentation(mut self, augmentation: Arc<AugmentationSchema>) -> Self {
        self.inner.augmentations.push(augmentation);
        self
    }

    pub fn build(self) -> Arc<SchemaContext> {
        Arc::new(self.inner)
    }
}
