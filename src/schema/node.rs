//! Schema node definitions and their builders.
//!
//! Die Knoten werden vom externen YANG-Compiler erzeugt und hier nur
//! gelesen. Die `with_*` Methoden dienen dem Aufbau (z.B. in Tests);
//! `build()` friert den Knoten in ein `Arc` ein.

use std::borrow::Cow;
use std::sync::Arc;

use super::DataNodeContainer;
use super::types::TypeDefinition;
use crate::qname::QName;

/// A schema data node. Closed set of kinds; every dispatch site matches exhaustively.
#[derive(Debug, Clone)]
pub enum DataSchemaNode {
    Container(ContainerSchema),
    List(ListSchema),
    Leaf(LeafSchema),
    LeafList(LeafListSchema),
    Choice(ChoiceSchema),
    AnyXml(AnyXmlSchema),
}

impl DataSchemaNode {
    pub fn qname(&self) -> &QName {
        match self {
            Self::Container(c) => &c.qname,
            Self::List(l) => &l.qname,
            Self::Leaf(l) => &l.qname,
            Self::LeafList(l) => &l.qname,
            Self::Choice(c) => &c.qname,
            Self::AnyXml(a) => &a.qname,
        }
    }

    /// Name der Knotenart fuer Fehlermeldungen.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::List(_) => "list",
            Self::Leaf(_) => "leaf",
            Self::LeafList(_) => "leaf-list",
            Self::Choice(_) => "choice",
            Self::AnyXml(_) => "anyxml",
        }
    }

    /// Container, List: Knoten mit eigenen Kindern.
    pub fn as_data_node_container(&self) -> Option<&dyn DataNodeContainer> {
        match self {
            Self::Container(c) => Some(c),
            Self::List(l) => Some(l),
            Self::Leaf(_) | Self::LeafList(_) | Self::Choice(_) | Self::AnyXml(_) => None,
        }
    }

    /// Typ von Leaf bzw. Leaf-List.
    pub fn leaf_type(&self) -> Option<&Arc<TypeDefinition>> {
        match self {
            Self::Leaf(l) => Some(&l.ty),
            Self::LeafList(l) => Some(&l.ty),
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{} {}", self.kind_name(), self.qname()))
    }
}

// ============================================================================
// Container
// ============================================================================

#[derive(Debug, Clone)]
pub struct ContainerSchema {
    pub qname: QName,
    pub children: Vec<Arc<DataSchemaNode>>,
    pub augmentations: Vec<Arc<AugmentationSchema>>,
    /// Presence-Container (hat eigene Bedeutung auch ohne Kinder).
    pub presence: bool,
}

impl ContainerSchema {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            children: Vec::new(),
            augmentations: Vec::new(),
            presence: false,
        }
    }

    pub fn with_child(mut self, child: Arc<DataSchemaNode>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_augmentation(mut self, augmentation: Arc<AugmentationSchema>) -> Self {
        self.augmentations.push(augmentation);
        self
    }

    pub fn with_presence(mut self) -> Self {
        self.presence = true;
        self
    }

    pub fn build(self) -> Arc<DataSchemaNode> {
        Arc::new(DataSchemaNode::Container(self))
    }
}

impl DataNodeContainer for ContainerSchema {
    fn child_nodes(&self) -> &[Arc<DataSchemaNode>] {
        &self.children
    }

    fn augmentations(&self) -> &[Arc<AugmentationSchema>] {
        &self.augmentations
    }

    fn describe(&self) -> Cow<'static, str> {
        Cow::Owned(format!("container {}", self.qname))
    }
}

// ============================================================================
// List
// ============================================================================

/// A list; without keys the list is unkeyed.
#[derive(Debug, Clone)]
pub struct ListSchema {
    pub qname: QName,
    /// Key-Leafs in deklarierter Reihenfolge.
    pub keys: Vec<QName>,
    pub children: Vec<Arc<DataSchemaNode>>,
    pub augmentations: Vec<Arc<AugmentationSchema>>,
    /// `ordered-by user`
    pub user_ordered: bool,
}

impl ListSchema {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            keys: Vec::new(),
            children: Vec::new(),
            augmentations: Vec::new(),
            user_ordered: false,
        }
    }

    pub fn with_key(mut self, key: QName) -> Self {
        self.keys.push(key);
        self
    }

    pub fn with_child(mut self, child: Arc<DataSchemaNode>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_augmentation(mut self, augmentation: Arc<AugmentationSchema>) -> Self {
        self.augmentations.push(augmentation);
        self
    }

    pub fn user_ordered(mut self) -> Self {
        self.user_ordered = true;
        self
    }

    pub fn is_keyed(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn build(self) -> Arc<DataSchemaNode> {
        Arc::new(DataSchemaNode::List(self))
    }
}

impl DataNodeContainer for ListSchema {
    fn child_nodes(&self) -> &[Arc<DataSchemaNode>] {
        &self.children
    }

    fn augmentations(&self) -> &[Arc<AugmentationSchema>] {
        &self.augmentations
    }

    fn describe(&self) -> Cow<'static, str> {
        Cow::Owned(format!("list {}", self.qname))
    }
}

// ============================================================================
// Leaf / Leaf-List / AnyXml
// ============================================================================

#[derive(Debug, Clone)]
pub struct LeafSchema {
    pub qname: QName,
    pub ty: Arc<TypeDefinition>,
}

impl LeafSchema {
    pub fn new(qname: QName, ty: Arc<TypeDefinition>) -> Self {
        Self { qname, ty }
    }

    pub fn build(self) -> Arc<DataSchemaNode> {
        Arc::new(DataSchemaNode::Leaf(self))
    }
}

#[derive(Debug, Clone)]
pub struct LeafListSchema {
    pub qname: QName,
    pub ty: Arc<TypeDefinition>,
    pub user_ordered: bool,
}

impl LeafListSchema {
    pub fn new(qname: QName, ty: Arc<TypeDefinition>) -> Self {
        Self {
            qname,
            ty,
            user_ordered: false,
        }
    }

    pub fn user_ordered(mut self) -> Self {
        self.user_ordered = true;
        self
    }

    pub fn build(self) -> Arc<DataSchemaNode> {
        Arc::new(DataSchemaNode::LeafList(self))
    }
}

#[derive(Debug, Clone)]
pub struct AnyXmlSchema {
    pub qname: QName,
}

impl AnyXmlSchema {
    pub fn new(qname: QName) -> Self {
        Self { qname }
    }

    pub fn build(self) -> Arc<DataSchemaNode> {
        Arc::new(DataSchemaNode::AnyXml(self))
    }
}

// ============================================================================
// Choice / Case
// ============================================================================

/// A choice: mutually exclusive cases, transparent on the wire.
#[derive(Debug, Clone)]
pub struct ChoiceSchema {
    pub qname: QName,
    pub cases: Vec<Arc<CaseSchema>>,
}

impl ChoiceSchema {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            cases: Vec::new(),
        }
    }

    pub fn with_case(mut self, case: CaseSchema) -> Self {
        self.cases.push(Arc::new(case));
        self
    }

    /// Alle Kinder aller Cases (inkl. Case-Augmentierungen), eine Ebene tief.
    pub fn case_children(&self) -> impl Iterator<Item = &Arc<DataSchemaNode>> {
        self.cases.iter().flat_map(|case| {
            case.children
                .iter()
                .chain(case.augmentations.iter().flat_map(|a| a.children.iter()))
        })
    }

    pub fn build(self) -> Arc<DataSchemaNode> {
        Arc::new(DataSchemaNode::Choice(self))
    }
}

#[derive(Debug, Clone)]
pub struct CaseSchema {
    pub qname: QName,
    pub children: Vec<Arc<DataSchemaNode>>,
    pub augmentations: Vec<Arc<AugmentationSchema>>,
}

impl CaseSchema {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            children: Vec::new(),
            augmentations: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Arc<DataSchemaNode>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_augmentation(mut self, augmentation: Arc<AugmentationSchema>) -> Self {
        self.augmentations.push(augmentation);
        self
    }
}

impl DataNodeContainer for CaseSchema {
    fn child_nodes(&self) -> &[Arc<DataSchemaNode>] {
        &self.children
    }

    fn augmentations(&self) -> &[Arc<AugmentationSchema>] {
        &self.augmentations
    }

    fn describe(&self) -> Cow<'static, str> {
        Cow::Owned(format!("case {}", self.qname))
    }
}

// ============================================================================
// Augmentation
// ============================================================================

/// Children injected into a target node from another module.
///
/// Die Kinder sind die effektiven Knoten, wie sie im Ziel sichtbar sind;
/// sie erscheinen nicht in `children` des Ziels.
#[derive(Debug, Clone)]
pub struct AugmentationSchema {
    /// Schema-Pfad des Ziels (nur informativ).
    pub target_path: Vec<QName>,
    pub children: Vec<Arc<DataSchemaNode>>,
}

impl AugmentationSchema {
    pub fn new(target_path: Vec<QName>) -> Self {
        Self {
            target_path,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Arc<DataSchemaNode>) -> Self {
        self.children.push(child);
        self
    }

    pub fn build(self) -> Arc<AugmentationSchema> {
        Arc::new(self)
    }
}

impl DataNodeContainer for AugmentationSchema {
    fn child_nodes(&self) -> &[Arc<DataSchemaNode>] {
        &self.children
    }

    fn describe(&self) -> Cow<'static, str> {
        let names: Vec<String> = self.children.iter().map(|c| c.qname().to_string()).collect();
        Cow::Owned(format!("augmentation [{}]", names.join(", ")))
    }
}
