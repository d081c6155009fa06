//! Assembled class shapes.
//!
//! A [`ClassShape`] is the flattened runtime view of a class: every
//! member, property, event and lifecycle hook reachable through the
//! super-class chain and the included mixins, resolved once and cached
//! by the registry. Overridden members carry their `base` back-reference
//! here, so explicit super-calls never search at call time.
//!
//! Shapes are invalidated whenever any definition mutates (define,
//! include, patch, undefine); later mixin inclusion therefore reaches
//! future instances without rewriting constructors or subclass links.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use metaobj_core::{
    AccessorKind, ClassKind, DefHash, EventEntry, HookFn, LookupError, MemberEntry, MetaError,
    PropertyDecl, PropertyGroup, QualifiedName,
};

use crate::registry::DefinitionRegistry;

/// A property after inheritance flattening and refine application.
#[derive(Debug, Clone)]
pub struct ResolvedProperty {
    pub decl: PropertyDecl,
    /// Class or mixin that declared the property.
    pub defined_in: DefHash,
}

/// Lifecycle hooks of one inheritance level.
#[derive(Clone)]
pub struct CtorLevel {
    pub class: DefHash,
    pub construct: Option<HookFn>,
    /// Construct hooks of this level's directly included mixins,
    /// in inclusion order.
    pub mixin_constructs: Vec<HookFn>,
}

/// Destructor hooks of one inheritance level.
#[derive(Clone)]
pub struct DtorLevel {
    pub class: DefHash,
    pub destruct: Option<HookFn>,
    /// Destruct hooks of this level's directly included mixins,
    /// in inclusion order.
    pub mixin_destructs: Vec<HookFn>,
}

/// Accessor variants a property group generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAccessor {
    Set,
    Reset,
    SetThemed,
    ResetThemed,
}

/// Flattened runtime view of a class.
pub struct ClassShape {
    pub class: DefHash,
    pub class_name: QualifiedName,
    pub kind: ClassKind,
    /// Flattened properties by name, refines applied.
    pub properties: FxHashMap<String, ResolvedProperty>,
    /// Flattened property groups by name.
    pub groups: FxHashMap<String, PropertyGroup>,
    /// Flattened members by name; overrides link their base.
    pub members: FxHashMap<String, Rc<MemberEntry>>,
    /// Flattened declared events by name.
    pub events: FxHashMap<String, EventEntry>,
    /// Generated accessor name → (property, variant).
    pub accessors: FxHashMap<String, (String, AccessorKind)>,
    /// Generated group accessor name → (group, variant).
    pub group_accessors: FxHashMap<String, (String, GroupAccessor)>,
    /// Constructor chain, root-first.
    pub ctor_chain: Vec<CtorLevel>,
    /// Destructor chain, most-derived first.
    pub dtor_chain: Vec<DtorLevel>,
}

impl ClassShape {
    /// Assemble the flattened shape of a class from current definitions.
    pub fn build(registry: &DefinitionRegistry, hash: DefHash) -> Result<Self, MetaError> {
        let chain = registry.super_chain(hash)?;
        let entry = registry
            .class_by_hash(hash)
            .ok_or_else(|| LookupError::NoSuchClass(hash.to_string()))?;

        let mut shape = ClassShape {
            class: hash,
            class_name: entry.qualified_name.clone(),
            kind: entry.kind,
            properties: FxHashMap::default(),
            groups: FxHashMap::default(),
            members: FxHashMap::default(),
            events: FxHashMap::default(),
            accessors: FxHashMap::default(),
            group_accessors: FxHashMap::default(),
            ctor_chain: Vec::with_capacity(chain.len()),
            dtor_chain: Vec::with_capacity(chain.len()),
        };

        // Root-first merge so overrides see their ancestors.
        for &level in chain.iter().rev() {
            let class = registry
                .class_by_hash(level)
                .ok_or_else(|| LookupError::NoSuchClass(level.to_string()))?;

            for (name, member) in &class.members {
                let linked = match shape.members.get(name) {
                    Some(prev) => member.clone().with_base(prev.clone()),
                    None => member.clone(),
                };
                shape.members.insert(name.clone(), Rc::new(linked));
            }

            for (name, decl) in &class.properties {
                shape.properties.insert(
                    name.clone(),
                    ResolvedProperty {
                        decl: decl.clone(),
                        defined_in: class.hash,
                    },
                );
            }

            // Refines only narrow an ancestor's init value.
            for (name, init) in &class.refines {
                if let Some(resolved) = shape.properties.get_mut(name) {
                    resolved.decl.init = init.clone();
                }
            }

            for (name, event) in &class.events {
                shape.events.insert(name.clone(), event.clone());
            }

            for (name, group) in &class.groups {
                shape.groups.insert(name.clone(), group.clone());
            }

            shape.ctor_chain.push(CtorLevel {
                class: level,
                construct: class.construct.clone(),
                mixin_constructs: class
                    .mixins
                    .iter()
                    .filter_map(|m| registry.mixin_by_hash(*m).and_then(|e| e.construct.clone()))
                    .collect(),
            });
        }

        // Destructors walk most-derived upward.
        for &level in &chain {
            let class = registry
                .class_by_hash(level)
                .ok_or_else(|| LookupError::NoSuchClass(level.to_string()))?;
            shape.dtor_chain.push(DtorLevel {
                class: level,
                destruct: class.destruct.clone(),
                mixin_destructs: class
                    .mixins
                    .iter()
                    .filter_map(|m| registry.mixin_by_hash(*m).and_then(|e| e.destruct.clone()))
                    .collect(),
            });
        }

        for (name, resolved) in &shape.properties {
            for (accessor, kind) in resolved.decl.accessor_names() {
                shape.accessors.insert(accessor, (name.clone(), kind));
            }
        }

        for (name, group) in &shape.groups {
            shape
                .group_accessors
                .insert(format!("set_{name}"), (name.clone(), GroupAccessor::Set));
            shape
                .group_accessors
                .insert(format!("reset_{name}"), (name.clone(), GroupAccessor::Reset));
            if group.themeable {
                shape.group_accessors.insert(
                    format!("set_themed_{name}"),
                    (name.clone(), GroupAccessor::SetThemed),
                );
                shape.group_accessors.insert(
                    format!("reset_themed_{name}"),
                    (name.clone(), GroupAccessor::ResetThemed),
                );
            }
        }

        Ok(shape)
    }

    /// Look up a resolved property by name.
    pub fn property(&self, name: &str) -> Option<&ResolvedProperty> {
        self.properties.get(name)
    }

    /// Look up a flattened member by name.
    pub fn member(&self, name: &str) -> Option<&Rc<MemberEntry>> {
        self.members.get(name)
    }

    /// Whether the class declares an event.
    pub fn has_event(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    /// Names of all properties flagged inheritable.
    pub fn inheritable_properties(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.decl.is_inheritable())
            .map(|(name, _)| name.as_str())
    }
}
