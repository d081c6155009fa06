//! Mixin configuration and entry.
//!
//! A mixin is a reusable bundle of members, properties and events merged
//! into classes at composition time. Mixins have no independent
//! instances; their construct/destruct hooks run inside the including
//! class's lifecycle chains.

use std::fmt;

use rustc_hash::FxHashMap;

use super::{EventEntry, MemberEntry, MemberKind};
use crate::{DefHash, HookFn, MemberFn, PropertyDecl, QualifiedName, Value};

/// Declarative mixin configuration.
#[derive(Default)]
pub struct MixinConfig {
    pub name: String,
    /// Mixins this mixin itself includes (flattened transitively on use).
    pub include: Vec<String>,
    pub members: Vec<(String, MemberFn)>,
    pub constants: Vec<(String, Value)>,
    pub properties: Vec<PropertyDecl>,
    pub events: Vec<(String, String)>,
    pub construct: Option<HookFn>,
    pub destruct: Option<HookFn>,
}

impl MixinConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn include(mut self, mixin: impl Into<String>) -> Self {
        self.include.push(mixin.into());
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
}

/// Registered mixin definition.
#[derive(Clone)]
pub struct MixinEntry {
    pub name: String,
    pub qualified_name: QualifiedName,
    pub hash: DefHash,
    /// Directly included mixin hashes, in declaration order.
    pub include: Vec<DefHash>,
    pub members: FxHashMap<String, MemberEntry>,
    pub properties: FxHashMap<String, PropertyDecl>,
    pub events: FxHashMap<String, EventEntry>,
    pub construct: Option<HookFn>,
    pub destruct: Option<HookFn>,
}

impl MixinEntry {
    pub fn new(qualified_name: QualifiedName) -> Self {
        let hash = DefHash::mixin_of(&qualified_name);
        Self {
            name: qualified_name.simple_name().to_string(),
            qualified_name,
            hash,
            include: Vec::new(),
            members: FxHashMap::default(),
            properties: FxHashMap::default(),
            events: FxHashMap::default(),
            construct: None,
            destruct: None,
        }
    }

    /// Build an entry from a config, hashing member provenance.
    pub fn from_config(qualified_name: QualifiedName, config: MixinConfig) -> Self {
        let mut entry = Self::new(qualified_name.clone());
        let origin = qualified_name.to_string();
        for (name, f) in config.members {
            entry.members.insert(
                name.clone(),
                MemberEntry::method(name, f, entry.hash, origin.clone()),
            );
        }
        for (name, value) in config.constants {
            entry.members.insert(
                name.clone(),
                MemberEntry {
                    name,
                    kind: MemberKind::Constant(value),
                    defining: entry.hash,
                    origin: origin.clone(),
                    base: None,
                },
            );
        }
        for decl in config.properties {
            entry.properties.insert(decl.name.clone(), decl);
        }
        for (name, payload) in config.events {
            entry.events.insert(
                name.clone(),
                EventEntry::new(name, payload, entry.hash, origin.clone()),
            );
        }
        entry.construct = config.construct;
        entry.destruct = config.destruct;
        entry
    }
}

impl fmt::Debug for MixinEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixinEntry")
            .field("name", &self.qualified_name.to_string())
            .field("include", &self.include.len())
            .field("members", &self.members.len())
            .field("properties", &self.properties.len())
            .field("events", &self.events.len())
            .field("has_construct", &self.construct.is_some())
            .finish()
    }
}
