//! Class configuration and assembled class entry.
//!
//! [`ClassConfig`] is the user-facing declaration handed to the
//! composition engine; [`ClassEntry`] is the validated, assembled shape
//! the registry stores. Mixin members/properties/events are merged into
//! the entry at composition time with provenance kept per record.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{EventEntry, MemberEntry, StaticMember};
use crate::{DefHash, HookFn, MemberFn, MetaError, PropertyDecl, PropertyGroup, QualifiedName, Value};

/// Name of the root object class every instantiable class derives from.
pub const ROOT_CLASS: &str = "core.Object";

/// Kind of a class definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassKind {
    /// Non-instantiable namespace class: statics only.
    Static,
    /// Regular instantiable class.
    #[default]
    Normal,
    /// Abstract class: only subclasses may be instantiated.
    Abstract,
    /// Singleton: exactly one instance, created through the guarded factory.
    Singleton,
}

impl ClassKind {
    pub fn label(self) -> &'static str {
        match self {
            ClassKind::Static => "static",
            ClassKind::Normal => "class",
            ClassKind::Abstract => "abstract",
            ClassKind::Singleton => "singleton",
        }
    }
}

/// Hook run once after a class is fully assembled, with access to the
/// assembled static and member surfaces.
pub type DeferFn = Rc<dyn Fn(&mut ClassEntry) -> Result<(), MetaError>>;

/// Declarative class configuration.
///
/// Ordered `Vec`s preserve declaration order so the first conflicting
/// declaration encountered is the one reported.
#[derive(Default)]
pub struct ClassConfig {
    pub name: String,
    pub kind: ClassKind,
    pub extend: Option<String>,
    pub include: Vec<String>,
    pub implement: Vec<String>,
    pub statics: Vec<(String, StaticMember)>,
    pub members: Vec<(String, MemberFn)>,
    pub constants: Vec<(String, Value)>,
    pub properties: Vec<PropertyDecl>,
    pub groups: Vec<PropertyGroup>,
    pub events: Vec<(String, String)>,
    pub construct: Option<HookFn>,
    pub destruct: Option<HookFn>,
    pub defer: Option<DeferFn>,
}

impl ClassConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    // === Builder Methods ===

    pub fn kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Link the super class (singular; normalized into the chain).
    pub fn extend(mut self, super_class: impl Into<String>) -> Self {
        self.extend = Some(super_class.into());
        self
    }

    /// Include a mixin (repeatable; order is inclusion order).
    pub fn include(mut self, mixin: impl Into<String>) -> Self {
        self.include.push(mixin.into());
        self
    }

    /// Implement an interface (repeatable).
    pub fn implement(mut self, interface: impl Into<String>) -> Self {
        self.implement.push(interface.into());
        self
    }

    pub fn static_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics
            .push((name.into(), StaticMember::Value(value.into())));
        self
    }

    pub fn static_member(mut self, name: impl Into<String>, member: StaticMember) -> Self {
        self.statics.push((name.into(), member));
        self
    }

    pub fn member(mut self, name: impl Into<String>, f: MemberFn) -> Self {
        self.members.push((name.into(), f));
        self
    }

    pub fn constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.push((name.into(), value.into()));
        self
    }

    pub fn property(mut self, decl: PropertyDecl) -> Self {
        self.properties.push(decl);
        self
    }

    pub fn group(mut self, group: PropertyGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Declare an event and its payload type name.
    pub fn event(mut self, name: impl Into<String>, payload: impl Into<String>) -> Self {
        self.events.push((name.into(), payload.into()));
        self
    }

    pub fn construct(mut self, hook: HookFn) -> Self {
        self.construct = Some(hook);
        self
    }

    pub fn destruct(mut self, hook: HookFn) -> Self {
        self.destruct = Some(hook);
        self
    }

    pub fn defer(mut self, hook: DeferFn) -> Self {
        self.defer = Some(hook);
        self
    }

}

/// Assembled, registered class definition.
#[derive(Clone)]
pub struct ClassEntry {
    /// Simple name.
    pub name: String,
    /// Fully qualified dotted name.
    pub qualified_name: QualifiedName,
    /// Definition identity hash.
    pub hash: DefHash,
    /// Class kind.
    pub kind: ClassKind,
    /// Super class hash (single inheritance).
    pub super_class: Option<DefHash>,
    /// Directly included mixin hashes (flattened closure, inclusion order).
    pub mixins: Vec<DefHash>,
    /// Implemented interface hashes, in declaration order.
    pub interfaces: Vec<DefHash>,
    /// Static members.
    pub statics: FxHashMap<String, StaticMember>,
    /// Instance members declared locally (class + merged mixin members).
    pub members: FxHashMap<String, MemberEntry>,
    /// Properties declared locally (class + merged mixin properties).
    pub properties: FxHashMap<String, PropertyDecl>,
    /// Refined init values for ancestor properties.
    pub refines: FxHashMap<String, Option<Value>>,
    /// Property groups.
    pub groups: FxHashMap<String, PropertyGroup>,
    /// Declared events (class + merged mixin events).
    pub events: FxHashMap<String, EventEntry>,
    /// Constructor hook.
    pub construct: Option<HookFn>,
    /// Destructor hook.
    pub destruct: Option<HookFn>,
}

impl ClassEntry {
    /// Create an empty entry for a qualified name.
    pub fn new(qualified_name: QualifiedName, kind: ClassKind) -> Self {
        let hash = DefHash::class_of(&qualified_name);
        Self {
            name: qualified_name.simple_name().to_string(),
            qualified_name,
            hash,
            kind,
            super_class: None,
            mixins: Vec::new(),
            interfaces: Vec::new(),
            statics: FxHashMap::default(),
            members: FxHashMap::default(),
            properties: FxHashMap::default(),
            refines: FxHashMap::default(),
            groups: FxHashMap::default(),
            events: FxHashMap::default(),
            construct: None,
            destruct: None,
        }
    }

    /// Whether this is the root object class.
    pub fn is_root(&self) -> bool {
        self.qualified_name.to_string() == ROOT_CLASS
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == ClassKind::Abstract
    }

    pub fn is_singleton(&self) -> bool {
        self.kind == ClassKind::Singleton
    }

    pub fn is_static(&self) -> bool {
        self.kind == ClassKind::Static
    }

    /// Whether a mixin is already directly included.
    pub fn includes(&self, mixin: DefHash) -> bool {
        self.mixins.contains(&mixin)
    }

    pub fn find_member(&self, name: &str) -> Option<&MemberEntry> {
        self.members.get(name)
    }

    pub fn find_property(&self, name: &str) -> Option<&PropertyDecl> {
        self.properties.get(name)
    }

    pub fn find_event(&self, name: &str) -> Option<&EventEntry> {
        self.events.get(name)
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("name", &self.qualified_name.to_string())
            .field("kind", &self.kind)
            .field("super_class", &self.super_class)
            .field("mixins", &self.mixins.len())
            .field("interfaces", &self.interfaces.len())
            .field("members", &self.members.len())
            .field("properties", &self.properties.len())
            .field("events", &self.events.len())
            .finish()
    }
}
