//! Qualified names of schema nodes and data nodes.
//!
//! Ein QName besteht aus Namespace, optionaler Revision und local-name.
//! Zwei QNames sind gleich, wenn alle drei Komponenten gleich sind.
//!
//! Die Komponenten sind `Arc<str>`, damit Schema-Modell und Codec-Registry
//! zwischen Threads geteilt werden koennen.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ahash::AHasher;

/// Namespace + Revision eines Moduls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QNameModule {
    /// Namespace URI des Moduls.
    pub namespace: Arc<str>,
    /// Revisionsdatum (z.B. "2013-10-08"), falls angegeben.
    pub revision: Option<Arc<str>>,
}

impl QNameModule {
    pub fn new(namespace: impl Into<Arc<str>>, revision: Option<&str>) -> Self {
        Self {
            namespace: namespace.into(),
            revision: revision.map(Arc::from),
        }
    }
}

/// A qualified name: namespace, optional revision and local name.
#[derive(Clone)]
pub struct QName {
    /// The namespace URI.
    pub namespace: Arc<str>,
    /// The optional revision of the defining module.
    pub revision: Option<Arc<str>>,
    /// The local name.
    pub local_name: Arc<str>,
    /// Vorberechneter Hash von (namespace, revision, local_name).
    identity: u64,
}

/// Berechnet den Identity-Hash fuer ein QName.
fn compute_identity(namespace: &str, revision: Option<&str>, local_name: &str) -> u64 {
    let mut hasher = AHasher::default();
    namespace.hash(&mut hasher);
    revision.hash(&mut hasher);
    local_name.hash(&mut hasher);
    hasher.finish()
}

impl QName {
    /// Creates a QName without revision.
    pub fn new(namespace: impl Into<Arc<str>>, local_name: impl Into<Arc<str>>) -> Self {
        let namespace = namespace.into();
        let local_name = local_name.into();
        let identity = compute_identity(&namespace, None, &local_name);
        Self {
            namespace,
            revision: None,
            local_name,
            identity,
        }
    }

    /// Creates a QName with a revision.
    pub fn with_revision(
        namespace: impl Into<Arc<str>>,
        revision: impl Into<Arc<str>>,
        local_name: impl Into<Arc<str>>,
    ) -> Self {
        let namespace = namespace.into();
        let revision = revision.into();
        let local_name = local_name.into();
        let identity = compute_identity(&namespace, Some(&revision), &local_name);
        Self {
            namespace,
            revision: Some(revision),
            local_name,
            identity,
        }
    }

    /// Creates a QName in the given module.
    pub fn in_module(module: &QNameModule, local_name: impl Into<Arc<str>>) -> Self {
        let local_name = local_name.into();
        let identity = compute_identity(
            &module.namespace,
            module.revision.as_deref(),
            &local_name,
        );
        Self {
            namespace: module.namespace.clone(),
            revision: module.revision.clone(),
            local_name,
            identity,
        }
    }

    /// Returns the module (namespace + revision) of this name.
    pub fn module(&self) -> QNameModule {
        QNameModule {
            namespace: self.namespace.clone(),
            revision: self.revision.clone(),
        }
    }

    /// Gleicher Namespace und gleiche Revision.
    pub fn same_module(&self, other: &QName) -> bool {
        self.namespace == other.namespace && self.revision == other.revision
    }

    /// Vergleich mit einem Modul ohne Allokation.
    pub fn is_in_module(&self, module: &QNameModule) -> bool {
        self.namespace == module.namespace && self.revision == module.revision
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
            && self.local_name == other.local_name
            && self.namespace == other.namespace
            && self.revision == other.revision
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

/// Sortierung: erst local_name, dann namespace, dann revision.
impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.local_name
            .cmp(&other.local_name)
            .then_with(|| self.namespace.cmp(&other.namespace))
            .then_with(|| self.revision.cmp(&other.revision))
    }
}

/// Clark-Notation: `{namespace}local_name`.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "({}?revision={}){}", self.namespace, rev, self.local_name),
            None => write!(f, "({}){}", self.namespace, self.local_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_includes_namespace_and_revision() {
        let a = QName::new("urn:a", "x");
        assert_eq!(a, QName::new("urn:a", "x"));
        assert_ne!(a, QName::new("urn:b", "x"));
        assert_ne!(a, QName::with_revision("urn:a", "2013-10-08", "x"));
        assert_ne!(a, QName::new("urn:a", "y"));
    }

    /// Hash konsistent mit Eq.
    #[test]
    fn usable_as_hash_key() {
        let mut set = HashSet::new();
        set.insert(QName::new("urn:a", "x"));
        assert!(set.contains(&QName::new("urn:a", "x")));
        assert!(!set.contains(&QName::new("urn:a", "z")));
    }

    #[test]
    fn in_module_matches_with_revision() {
        let module = QNameModule::new("urn:a", Some("2013-10-08"));
        let q = QName::in_module(&module, "leaf");
        assert_eq!(q, QName::with_revision("urn:a", "2013-10-08", "leaf"));
        assert_eq!(q.module(), module);
        assert!(q.is_in_module(&module));
    }

    #[test]
    fn display_uses_clark_notation() {
        assert_eq!(QName::new("urn:a", "x").to_string(), "{urn:a}x");
        assert_eq!(QName::new("", "x").to_string(), "x");
    }

    #[test]
    fn ordering_by_local_name_first() {
        let mut names = vec![QName::new("urn:z", "b"), QName::new("urn:a", "c"), QName::new("urn:b", "b")];
        names.sort();
        assert_eq!(&*names[0].namespace, "urn:b");
        assert_eq!(&*names[1].namespace, "urn:z");
        assert_eq!(&*names[2].local_name, "c");
    }
}
