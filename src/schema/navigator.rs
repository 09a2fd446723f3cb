//! Schema navigation: child lookup through choice/case and augmentations.
//!
//! Kinder von choice/case und Augmentierungen werden beim Nachschlagen so
//! behandelt, als waeren sie direkt am Parent deklariert. Die Suche geht
//! dabei nur eine transparente Ebene tief; Writer und Parser legen fuer
//! choice/augmentation einen eigenen Scope an, gegen den tiefere Kinder
//! aufgeloest werden.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use super::node::{AugmentationSchema, DataSchemaNode};
use super::{DataNodeContainer, SchemaContext};
use crate::qname::QName;
use crate::{Error, FastHashMap, Result};

/// The schema context against which child names are resolved.
#[derive(Debug, Clone)]
pub enum SchemaScope {
    /// Wurzel: Top-Level Knoten aller Module.
    Context(Arc<SchemaContext>),
    /// Container, List oder Choice (Leafs haben keine Kinder).
    Node(Arc<DataSchemaNode>),
    /// Pseudo-Scope einer Augmentierung.
    Augmentation(Arc<AugmentationSchema>),
}

impl SchemaScope {
    /// Direkt deklarierte Kinder; fuer eine Choice die Kinder aller Cases.
    pub fn direct_children(&self) -> Vec<&Arc<DataSchemaNode>> {
        match self {
            Self::Context(ctx) => ctx.child_nodes().iter().collect(),
            Self::Augmentation(aug) => aug.children.iter().collect(),
            Self::Node(node) => match &**node {
                DataSchemaNode::Choice(choice) => choice
                    .cases
                    .iter()
                    .flat_map(|case| case.children.iter())
                    .collect(),
                other => other
                    .as_data_node_container()
                    .map(|c| c.child_nodes().iter().collect())
                    .unwrap_or_default(),
            },
        }
    }

    /// Augmentierungen dieses Ziels; fuer eine Choice die aller Cases.
    pub fn augmentations(&self) -> Vec<&Arc<AugmentationSchema>> {
        match self {
            Self::Context(ctx) => ctx.augmentations().iter().collect(),
            Self::Augmentation(_) => Vec::new(),
            Self::Node(node) => match &**node {
                DataSchemaNode::Choice(choice) => choice
                    .cases
                    .iter()
                    .flat_map(|case| case.augmentations.iter())
                    .collect(),
                other => other
                    .as_data_node_container()
                    .map(|c| c.augmentations().iter().collect())
                    .unwrap_or_default(),
            },
        }
    }

    /// Resolves a child by name, one transparent level deep.
    ///
    /// Reihenfolge: direkte Kinder, Kinder von Augmentierungen, Kinder der
    /// Cases direkter Choices.
    pub fn find_child(&self, qname: &QName) -> Option<Arc<DataSchemaNode>> {
        let direct = self.direct_children();
        if let Some(found) = direct.iter().find(|c| c.qname() == qname) {
            return Some(Arc::clone(found));
        }
        for aug in self.augmentations() {
            if let Some(found) = aug.data_child_by_name(qname) {
                return Some(Arc::clone(found));
            }
        }
        direct.iter().find_map(|child| match &***child {
            DataSchemaNode::Choice(choice) => {
                choice.case_children().find(|c| c.qname() == qname).cloned()
            }
            _ => None,
        })
    }

    /// Wie [`find_child`](Self::find_child), aber mit `SchemaMismatch` als Fehler.
    pub fn resolve_child(&self, qname: &QName) -> Result<Arc<DataSchemaNode>> {
        self.find_child(qname)
            .ok_or_else(|| Error::schema_mismatch(self.describe(), qname.clone()))
    }

    /// Selects the augmentation whose child set intersects `candidates`.
    pub fn find_augmentation(&self, candidates: &BTreeSet<QName>) -> Result<Arc<AugmentationSchema>> {
        let matches: Vec<&Arc<AugmentationSchema>> = self
            .augmentations()
            .into_iter()
            .filter(|aug| aug.children.iter().any(|c| candidates.contains(c.qname())))
            .collect();
        match matches.as_slice() {
            [single] => {
                debug!("augmentation {} selected under {}", single.describe(), self.describe());
                Ok(Arc::clone(single))
            }
            [] => Err(Error::NoSuchAugmentation {
                candidates: candidates.iter().cloned().collect(),
            }),
            _ => Err(Error::AmbiguousAugmentation {
                candidates: candidates.iter().cloned().collect(),
            }),
        }
    }

    /// Schluessel fuer Caches: Adresse des Schema-Objekts.
    pub(crate) fn cache_key(&self) -> usize {
        match self {
            Self::Context(ctx) => Arc::as_ptr(ctx) as usize,
            Self::Node(node) => Arc::as_ptr(node) as usize,
            Self::Augmentation(aug) => Arc::as_ptr(aug) as usize,
        }
    }

    pub fn describe(&self) -> Cow<'static, str> {
        match self {
            Self::Context(ctx) => ctx.describe(),
            Self::Node(node) => node.describe(),
            Self::Augmentation(aug) => aug.describe(),
        }
    }
}

// ============================================================================
// Lookup-Tabellen fuer den Parser
// ============================================================================

/// Maps every node reachable through a (possibly nested) choice to the
/// outermost choice directly under `scope`.
pub fn map_child_elements_from_choices(
    scope: &SchemaScope,
) -> FastHashMap<QName, Arc<DataSchemaNode>> {
    let mut map = FastHashMap::default();
    for child in scope.direct_children() {
        if let DataSchemaNode::Choice(choice) = &**child {
            for name in choice_descendant_names(choice) {
                map.insert(name, Arc::clone(child));
            }
        }
    }
    map
}

/// Maps every node reachable through an augmentation (also through
/// choices inside it) to that augmentation.
pub fn map_child_elements_from_augments(
    scope: &SchemaScope,
) -> FastHashMap<QName, Arc<AugmentationSchema>> {
    let mut map = FastHashMap::default();
    for aug in scope.augmentations() {
        for child in &aug.children {
            match &**child {
                DataSchemaNode::Choice(choice) => {
                    for name in choice_descendant_names(choice) {
                        map.insert(name, Arc::clone(aug));
                    }
                }
                other => {
                    map.insert(other.qname().clone(), Arc::clone(aug));
                }
            }
        }
    }
    map
}

/// Namen aller Wire-Knoten unterhalb einer Choice, durch verschachtelte Choices hindurch.
fn choice_descendant_names(choice: &super::node::ChoiceSchema) -> Vec<QName> {
    let mut names = Vec::new();
    for child in choice.case_children() {
        match &**child {
            DataSchemaNode::Choice(inner) => names.extend(choice_descendant_names(inner)),
            other => names.push(other.qname().clone()),
        }
    }
    names
}

/// Re-resolves the children of `augmentation` through the target scope.
///
/// Ein Kind kann im Ziel anders erscheinen als in der Augmentierung
/// selbst (z.B. bei Augmentierung eines bereits augmentierten Knotens);
/// massgeblich ist die Sicht des Ziels.
pub fn real_schemas_for_augment(
    target: &SchemaScope,
    augmentation: &AugmentationSchema,
) -> Arc<AugmentationSchema> {
    let children = augmentation
        .children
        .iter()
        .map(|child| target.find_child(child.qname()).unwrap_or_else(|| Arc::clone(child)))
        .collect();
    Arc::new(AugmentationSchema {
        target_path: augmentation.target_path.clone(),
        children,
    })
}

/// Precomputed lookups for one parent scope.
#[derive(Debug, Default)]
pub struct ChildLookup {
    pub choices: FastHashMap<QName, Arc<DataSchemaNode>>,
    pub augments: FastHashMap<QName, Arc<AugmentationSchema>>,
}

impl ChildLookup {
    pub fn new(scope: &SchemaScope) -> Self {
        Self {
            choices: map_child_elements_from_choices(scope),
            augments: map_child_elements_from_augments(scope),
        }
    }
}
