//! DefinitionRegistry - the global name→definition table.
//!
//! Central storage for class, mixin and interface definitions, keyed by
//! [`QualifiedName`] with a [`DefHash`] reverse index for hash-based
//! lookup. The registry owns the namespace tree and the assembled
//! class-shape cache.
//!
//! # Storage Model
//!
//! - **Definitions**: one primary map per kind (class/mixin/interface),
//!   keyed by qualified name.
//! - **Reverse indexes**: hash → name, filled at registration.
//! - **Namespace tree**: dotted names create container nodes implicitly.
//! - **Shape cache**: assembled per-class flattened tables; cleared by
//!   any definition mutation (define, include, patch, undefine).
//!
//! # Thread Safety
//!
//! The registry is **not** thread-safe by design: the runtime is
//! single-threaded and cooperative. All mutation funnels through a small
//! set of methods so synchronization could be layered on later.
//!
//! `define_*` is idempotent-unsafe: redefining an existing name
//! overwrites the registry entry (used for hot composition patches) but
//! does not retroactively fix up already-created instances.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use metaobj_core::{
    ClassEntry, ClassKind, DefHash, InterfaceEntry, LookupError, MetaError, MixinEntry,
    QualifiedName, ROOT_CLASS,
};

use crate::namespace_tree::{NamespaceTree, SymbolRef};
use crate::shape::ClassShape;

/// Global definition registry for classes, mixins and interfaces.
#[derive(Default)]
pub struct DefinitionRegistry {
    classes: FxHashMap<QualifiedName, ClassEntry>,
    mixins: FxHashMap<QualifiedName, MixinEntry>,
    interfaces: FxHashMap<QualifiedName, InterfaceEntry>,

    class_names: FxHashMap<DefHash, QualifiedName>,
    mixin_names: FxHashMap<DefHash, QualifiedName>,
    interface_names: FxHashMap<DefHash, QualifiedName>,

    tree: NamespaceTree,

    /// Assembled class shapes, built lazily and invalidated on mutation.
    shapes: FxHashMap<DefHash, Rc<ClassShape>>,
}

impl DefinitionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the root object class pre-defined.
    pub fn with_root() -> Self {
        let mut registry = Self::new();
        let root = ClassEntry::new(QualifiedName::from_dotted(ROOT_CLASS), ClassKind::Normal);
        registry
            .insert_class(root)
            .expect("root class registration cannot collide in an empty registry");
        registry
    }

    /// The root object class hash.
    pub fn root_hash(&self) -> DefHash {
        DefHash::class(ROOT_CLASS)
    }

    // ==========================================================================
    // Class Storage
    // ==========================================================================

    /// Insert (or overwrite) an assembled class entry.
    pub fn insert_class(&mut self, entry: ClassEntry) -> Result<DefHash, MetaError> {
        let hash = entry.hash;
        let name = entry.qualified_name.clone();
        self.tree.insert(&name, SymbolRef::Class(hash))?;
        self.class_names.insert(hash, name.clone());
        self.classes.insert(name, entry);
        self.shapes.clear();
        Ok(hash)
    }

    pub fn class(&self, name: &QualifiedName) -> Option<&ClassEntry> {
        self.classes.get(name)
    }

    pub fn class_mut(&mut self, name: &QualifiedName) -> Option<&mut ClassEntry> {
        // Shape caches may be stale after arbitrary mutation.
        self.shapes.clear();
        self.classes.get_mut(name)
    }

    pub fn class_by_hash(&self, hash: DefHash) -> Option<&ClassEntry> {
        self.class_names
            .get(&hash)
            .and_then(|name| self.classes.get(name))
    }

    pub fn class_by_name(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(&QualifiedName::from_dotted(name))
    }

    pub fn contains_class(&self, name: &QualifiedName) -> bool {
        self.classes.contains_key(name)
    }

    pub fn contains_class_name(&self, name: &str) -> bool {
        self.contains_class(&QualifiedName::from_dotted(name))
    }

    /// Remove a class definition. Already-created instances keep working
    /// off the shapes they were constructed with only until the next
    /// shape rebuild; undefine is a teardown-time operation.
    pub fn undefine_class(&mut self, name: &QualifiedName) -> Option<ClassEntry> {
        let entry = self.classes.remove(name)?;
        self.class_names.remove(&entry.hash);
        self.tree.remove(name);
        self.shapes.clear();
        Some(entry)
    }

    // ==========================================================================
    // Mixin Storage
    // ==========================================================================

    pub fn insert_mixin(&mut self, entry: MixinEntry) -> Result<DefHash, MetaError> {
        let hash = entry.hash;
        let name = entry.qualified_name.clone();
        self.tree.insert(&name, SymbolRef::Mixin(hash))?;
        self.mixin_names.insert(hash, name.clone());
        self.mixins.insert(name, entry);
        self.shapes.clear();
        Ok(hash)
    }

    pub fn mixin(&self, name: &QualifiedName) -> Option<&MixinEntry> {
        self.mixins.get(name)
    }

    pub fn mixin_by_hash(&self, hash: DefHash) -> Option<&MixinEntry> {
        self.mixin_names
            .get(&hash)
            .and_then(|name| self.mixins.get(name))
    }

    pub fn mixin_by_name(&self, name: &str) -> Option<&MixinEntry> {
        self.mixins.get(&QualifiedName::from_dotted(name))
    }

    pub fn contains_mixin_name(&self, name: &str) -> bool {
        self.mixins
            .contains_key(&QualifiedName::from_dotted(name))
    }

    pub fn undefine_mixin(&mut self, name: &QualifiedName) -> Option<MixinEntry> {
        let entry = self.mixins.remove(name)?;
        self.mixin_names.remove(&entry.hash);
        self.tree.remove(name);
        self.shapes.clear();
        Some(entry)
    }

    // ==========================================================================
    // Interface Storage
    // ==========================================================================

    pub fn insert_interface(&mut self, entry: InterfaceEntry) -> Result<DefHash, MetaError> {
        let hash = entry.hash;
        let name = entry.qualified_name.clone();
        self.tree.insert(&name, SymbolRef::Interface(hash))?;
        self.interface_names.insert(hash, name.clone());
        self.interfaces.insert(name, entry);
        self.shapes.clear();
        Ok(hash)
    }

    pub fn interface(&self, name: &QualifiedName) -> Option<&InterfaceEntry> {
        self.interfaces.get(name)
    }

    pub fn interface_by_hash(&self, hash: DefHash) -> Option<&InterfaceEntry> {
        self.interface_names
            .get(&hash)
            .and_then(|name| self.interfaces.get(name))
    }

    pub fn interface_by_name(&self, name: &str) -> Option<&InterfaceEntry> {
        self.interfaces.get(&QualifiedName::from_dotted(name))
    }

    pub fn contains_interface_name(&self, name: &str) -> bool {
        self.interfaces
            .contains_key(&QualifiedName::from_dotted(name))
    }

    pub fn undefine_interface(&mut self, name: &QualifiedName) -> Option<InterfaceEntry> {
        let entry = self.interfaces.remove(name)?;
        self.interface_names.remove(&entry.hash);
        self.tree.remove(name);
        self.shapes.clear();
        Some(entry)
    }

    // ==========================================================================
    // Namespace Queries
    // ==========================================================================

    /// Look up any definition kind by qualified name.
    pub fn lookup(&self, name: &QualifiedName) -> Option<SymbolRef> {
        self.tree.lookup(name)
    }

    /// Whether a definition of any kind exists under this name.
    pub fn exists(&self, name: &str) -> bool {
        self.tree
            .lookup(&QualifiedName::from_dotted(name))
            .is_some()
    }

    /// Definitions registered directly in a namespace.
    pub fn symbols_in(&self, path: &[String]) -> Vec<(String, SymbolRef)> {
        self.tree.symbols_in(path)
    }

    pub(crate) fn tree(&self) -> &NamespaceTree {
        &self.tree
    }

    // ==========================================================================
    // Inheritance Queries
    // ==========================================================================

    /// Super-class chain from `hash` (inclusive) up to the root,
    /// most-derived first.
    pub fn super_chain(&self, hash: DefHash) -> Result<Vec<DefHash>, MetaError> {
        let mut chain = Vec::new();
        let mut current = Some(hash);
        while let Some(h) = current {
            let entry = self.class_by_hash(h).ok_or_else(|| {
                LookupError::NoSuchClass(
                    self.class_names
                        .get(&h)
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| h.to_string()),
                )
            })?;
            chain.push(h);
            current = entry.super_class;
        }
        Ok(chain)
    }

    /// Whether `sub` equals or derives from `ancestor`.
    pub fn is_subclass(&self, sub: DefHash, ancestor: DefHash) -> bool {
        let mut current = Some(sub);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.class_by_hash(h).and_then(|e| e.super_class);
        }
        false
    }

    // ==========================================================================
    // Shape Cache
    // ==========================================================================

    /// Assembled shape of a class, built on demand and cached.
    pub fn shape(&mut self, hash: DefHash) -> Result<Rc<ClassShape>, MetaError> {
        if let Some(shape) = self.shapes.get(&hash) {
            return Ok(shape.clone());
        }
        let shape = Rc::new(ClassShape::build(self, hash)?);
        self.shapes.insert(hash, shape.clone());
        Ok(shape)
    }

    /// Drop all assembled shapes (definition mutation path).
    pub fn invalidate_shapes(&mut self) {
        self.shapes.clear();
    }
}
