//! Composition engine.
//!
//! Assembles a class's final runtime shape from `extend` + `include`
//! (mixins) + `implement` (interfaces) + declared members, properties
//! and events, validating everything synchronously at definition time.
//! Mixin members/properties/events are merged into the class entry with
//! provenance, so conflict diagnostics always name both sides.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use metaobj_core::{
    ClassConfig, ClassEntry, ClassKind, ConfigError, DefHash, EventEntry, InterfaceConfig,
    InterfaceEntry, LookupError, MemberEntry, MetaError, MixinConfig, MixinEntry, QualifiedName,
    ROOT_CLASS,
};

use crate::registry::DefinitionRegistry;
use crate::shape::ClassShape;

impl DefinitionRegistry {
    // ==========================================================================
    // Class Definition
    // ==========================================================================

    /// Define a class from a declarative configuration.
    ///
    /// Every validation failure raises a [`ConfigError`] here, never at
    /// instantiation time; the only deferred validation is interface
    /// satisfaction of abstract classes, re-run when a concrete subclass
    /// is defined.
    pub fn define_class(&mut self, config: ClassConfig) -> Result<DefHash, MetaError> {
        let qname = QualifiedName::from_dotted(&config.name);
        let full = qname.to_string();
        let kind = config.kind;

        self.check_allowed_keys(&config, &full)?;

        let mut entry = ClassEntry::new(qname, kind);

        if let Some(extend) = &config.extend {
            let sup = self.class_by_name(extend).ok_or_else(|| {
                ConfigError::UnknownSuperClass {
                    class: full.clone(),
                    extend: extend.clone(),
                }
            })?;
            if sup.is_static() {
                return Err(ConfigError::InvalidDeclaration(format!(
                    "class '{full}': cannot extend static class '{extend}'"
                ))
                .into());
            }
            entry.super_class = Some(sup.hash);
        }

        let ancestor_shape = match entry.super_class {
            Some(sup) => Some(self.shape(sup)?),
            None => None,
        };

        for (name, member) in config.statics {
            if entry.statics.contains_key(&name) {
                return Err(ConfigError::Duplicate {
                    class: full.clone(),
                    what: "static",
                    name,
                    origin: full.clone(),
                }
                .into());
            }
            entry.statics.insert(name, member);
        }

        for (name, f) in config.members {
            if entry.members.contains_key(&name) {
                return Err(ConfigError::Duplicate {
                    class: full.clone(),
                    what: "member",
                    name,
                    origin: full.clone(),
                }
                .into());
            }
            entry
                .members
                .insert(name.clone(), MemberEntry::method(name, f, entry.hash, full.clone()));
        }

        for (name, value) in config.constants {
            if entry.members.contains_key(&name) {
                return Err(ConfigError::Duplicate {
                    class: full.clone(),
                    what: "member",
                    name,
                    origin: full.clone(),
                }
                .into());
            }
            entry.members.insert(
                name.clone(),
                MemberEntry::constant(name, value, entry.hash, full.clone()),
            );
        }

        for decl in config.properties {
            if decl.is_refine() {
                let exists = ancestor_shape
                    .as_ref()
                    .is_some_and(|shape| shape.property(&decl.name).is_some());
                if !exists {
                    return Err(ConfigError::RefineUnknownProperty {
                        class: full.clone(),
                        property: decl.name,
                    }
                    .into());
                }
                if !decl.refine_touches_only_init() {
                    return Err(ConfigError::RefineBeyondInit {
                        class: full.clone(),
                        property: decl.name,
                    }
                    .into());
                }
                entry.refines.insert(decl.name.clone(), decl.init.clone());
                continue;
            }

            if let Some(prev) = ancestor_shape
                .as_ref()
                .and_then(|shape| shape.property(&decl.name))
            {
                return Err(ConfigError::Duplicate {
                    class: full.clone(),
                    what: "property",
                    name: decl.name.clone(),
                    origin: self.origin_of(prev.defined_in),
                }
                .into());
            }
            if entry.properties.contains_key(&decl.name) {
                return Err(ConfigError::Duplicate {
                    class: full.clone(),
                    what: "property",
                    name: decl.name.clone(),
                    origin: full.clone(),
                }
                .into());
            }
            entry.properties.insert(decl.name.clone(), decl);
        }

        for (name, payload) in config.events {
            let prior = entry
                .events
                .get(&name)
                .cloned()
                .or_else(|| {
                    ancestor_shape
                        .as_ref()
                        .and_then(|shape| shape.events.get(&name).cloned())
                });
            if let Some(prev) = prior {
                if prev.payload != payload {
                    return Err(ConfigError::EventPayloadConflict {
                        class: full.clone(),
                        event: name,
                        existing: prev.payload,
                        incoming: payload,
                    }
                    .into());
                }
                continue;
            }
            entry.events.insert(
                name.clone(),
                EventEntry::new(name, payload, entry.hash, full.clone()),
            );
        }

        let mixins = self.resolve_mixin_list(&config.include, &full)?;
        for mixin in self.flatten_mixin_closure(&mixins) {
            if entry.includes(mixin) {
                continue;
            }
            self.merge_mixin(&mut entry, mixin, false, ancestor_shape.as_deref())?;
        }

        for group in config.groups {
            for member in &group.members {
                let decl = entry.properties.get(member).cloned().or_else(|| {
                    ancestor_shape
                        .as_ref()
                        .and_then(|shape| shape.property(member).map(|p| p.decl.clone()))
                });
                let Some(decl) = decl else {
                    return Err(ConfigError::UnknownGroupMember {
                        class: full.clone(),
                        group: group.name,
                        member: member.clone(),
                    }
                    .into());
                };
                if group.themeable && !decl.is_themeable() {
                    return Err(ConfigError::GroupMemberNotThemeable {
                        class: full.clone(),
                        group: group.name,
                        member: member.clone(),
                    }
                    .into());
                }
            }
            if entry.groups.contains_key(&group.name) {
                return Err(ConfigError::Duplicate {
                    class: full.clone(),
                    what: "group",
                    name: group.name.clone(),
                    origin: full.clone(),
                }
                .into());
            }
            entry.groups.insert(group.name.clone(), group);
        }

        for interface in &config.implement {
            let iface = self.interface_by_name(interface).ok_or_else(|| {
                ConfigError::UnknownInterface {
                    class: full.clone(),
                    interface: interface.clone(),
                }
            })?;
            if !entry.interfaces.contains(&iface.hash) {
                entry.interfaces.push(iface.hash);
            }
        }

        entry.construct = config.construct;
        entry.destruct = config.destruct;

        // Defer hook sees the fully assembled static/member surfaces.
        if let Some(defer) = config.defer {
            defer(&mut entry)?;
        }

        // Abstract classes may leave interface requirements to concrete
        // subclasses; everything else validates now.
        if entry.kind != ClassKind::Abstract {
            self.verify_interfaces(&entry, ancestor_shape.as_deref())?;
        }

        self.insert_class(entry)
    }

    fn check_allowed_keys(&self, config: &ClassConfig, full: &str) -> Result<(), MetaError> {
        if config.kind == ClassKind::Static {
            let disallowed: [(&'static str, bool); 10] = [
                ("extend", config.extend.is_some()),
                ("include", !config.include.is_empty()),
                ("implement", !config.implement.is_empty()),
                ("members", !config.members.is_empty()),
                ("constants", !config.constants.is_empty()),
                ("properties", !config.properties.is_empty()),
                ("groups", !config.groups.is_empty()),
                ("events", !config.events.is_empty()),
                ("construct", config.construct.is_some()),
                ("destruct", config.destruct.is_some()),
            ];
            for (key, present) in disallowed {
                if present {
                    return Err(ConfigError::DisallowedKey {
                        class: full.to_string(),
                        kind: "static",
                        key,
                    }
                    .into());
                }
            }
            return Ok(());
        }

        if config.extend.is_none() && full != ROOT_CLASS {
            return Err(ConfigError::MissingExtend {
                class: full.to_string(),
            }
            .into());
        }
        Ok(())
    }

    // ==========================================================================
    // Mixin Definition & Inclusion
    // ==========================================================================

    /// Define a mixin from a declarative configuration.
    ///
    /// Conflicts between the mixin's own declarations and its transitive
    /// includes are rejected here, before any class inclusion.
    pub fn define_mixin(&mut self, config: MixinConfig) -> Result<DefHash, MetaError> {
        let qname = QualifiedName::from_dotted(&config.name);
        let full = qname.to_string();

        let mut includes = Vec::with_capacity(config.include.len());
        for include in &config.include {
            let inc = self.mixin_by_name(include).ok_or_else(|| {
                ConfigError::UnknownMixin {
                    class: full.clone(),
                    mixin: include.clone(),
                }
            })?;
            includes.push(inc.hash);
        }

        // Name→origin maps over the flattened closure detect conflicts
        // before the mixin can ever be included anywhere.
        let mut member_origin: FxHashMap<String, String> = FxHashMap::default();
        let mut property_origin: FxHashMap<String, String> = FxHashMap::default();
        let mut event_origin: FxHashMap<String, String> = FxHashMap::default();
        for hash in self.flatten_mixin_closure(&includes) {
            let included = self
                .mixin_by_hash(hash)
                .ok_or_else(|| LookupError::NoSuchClass(hash.to_string()))?;
            let origin = included.qualified_name.to_string();
            for name in included.members.keys() {
                if let Some(prev) = member_origin.insert(name.clone(), origin.clone()) {
                    return Err(conflict(&full, &origin, "member", name, &prev).into());
                }
            }
            for name in included.properties.keys() {
                if let Some(prev) = property_origin.insert(name.clone(), origin.clone()) {
                    return Err(conflict(&full, &origin, "property", name, &prev).into());
                }
            }
            for name in included.events.keys() {
                if let Some(prev) = event_origin.insert(name.clone(), origin.clone()) {
                    return Err(conflict(&full, &origin, "event", name, &prev).into());
                }
            }
        }

        let mut entry = MixinEntry::from_config(qname, config);
        entry.include = includes;

        for name in entry.members.keys() {
            if let Some(prev) = member_origin.get(name) {
                return Err(conflict(&full, &full, "member", name, prev).into());
            }
        }
        for name in entry.properties.keys() {
            if let Some(prev) = property_origin.get(name) {
                return Err(conflict(&full, &full, "property", name, prev).into());
            }
        }
        for name in entry.events.keys() {
            if let Some(prev) = event_origin.get(name) {
                return Err(conflict(&full, &full, "event", name, prev).into());
            }
        }

        self.insert_mixin(entry)
    }

    /// Include a mixin into an already-defined class.
    ///
    /// Conflicts with existing members/properties are rejected; the
    /// second inclusion of an already-included mixin is a no-op.
    pub fn include_into(&mut self, class_name: &str, mixin_name: &str) -> Result<(), MetaError> {
        self.include_impl(class_name, mixin_name, false)
    }

    /// Patch a mixin into an already-defined class.
    ///
    /// Like [`include_into`](Self::include_into), but mixin members may
    /// override existing implementations; the prior implementation stays
    /// reachable through the member's `base` back-reference.
    pub fn patch(&mut self, class_name: &str, mixin_name: &str) -> Result<(), MetaError> {
        self.include_impl(class_name, mixin_name, true)
    }

    fn include_impl(
        &mut self,
        class_name: &str,
        mixin_name: &str,
        patch: bool,
    ) -> Result<(), MetaError> {
        let mut entry = self
            .class_by_name(class_name)
            .cloned()
            .ok_or_else(|| LookupError::NoSuchClass(class_name.to_string()))?;
        let mixin = self
            .mixin_by_name(mixin_name)
            .map(|m| m.hash)
            .ok_or_else(|| ConfigError::UnknownMixin {
                class: class_name.to_string(),
                mixin: mixin_name.to_string(),
            })?;

        let ancestor_shape = match entry.super_class {
            Some(sup) => Some(self.shape(sup)?),
            None => None,
        };

        for hash in self.flatten_mixin_closure(&[mixin]) {
            if entry.includes(hash) {
                continue;
            }
            self.merge_mixin(&mut entry, hash, patch, ancestor_shape.as_deref())?;
        }

        // Reinsert; the shape cache is cleared so future instances pick
        // up mixin lifecycle hooks without constructor rewriting.
        self.insert_class(entry)?;
        Ok(())
    }

    /// Resolve mixin names to hashes, preserving declaration order.
    fn resolve_mixin_list(
        &self,
        names: &[String],
        class: &str,
    ) -> Result<Vec<DefHash>, MetaError> {
        let mut hashes = Vec::with_capacity(names.len());
        for name in names {
            let mixin = self.mixin_by_name(name).ok_or_else(|| {
                ConfigError::UnknownMixin {
                    class: class.to_string(),
                    mixin: name.clone(),
                }
            })?;
            hashes.push(mixin.hash);
        }
        Ok(hashes)
    }

    /// Order-preserving, de-duplicated transitive closure of mixin
    /// includes. A mixin's own includes come before the mixin itself.
    pub fn flatten_mixin_closure(&self, mixins: &[DefHash]) -> Vec<DefHash> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        for &mixin in mixins {
            self.flatten_visit(mixin, &mut out, &mut seen);
        }
        out
    }

    fn flatten_visit(&self, mixin: DefHash, out: &mut Vec<DefHash>, seen: &mut FxHashSet<DefHash>) {
        if !seen.insert(mixin) {
            return;
        }
        if let Some(entry) = self.mixin_by_hash(mixin) {
            let includes = entry.include.clone();
            for include in includes {
                self.flatten_visit(include, out, seen);
            }
        }
        out.push(mixin);
    }

    fn merge_mixin(
        &self,
        entry: &mut ClassEntry,
        hash: DefHash,
        patch: bool,
        ancestor: Option<&ClassShape>,
    ) -> Result<(), MetaError> {
        let class = entry.qualified_name.to_string();
        let mixin = self
            .mixin_by_hash(hash)
            .ok_or_else(|| ConfigError::UnknownMixin {
                class: class.clone(),
                mixin: hash.to_string(),
            })?
            .clone();
        let mixin_name = mixin.qualified_name.to_string();

        for (name, event) in &mixin.events {
            let prior = entry
                .events
                .get(name)
                .cloned()
                .or_else(|| ancestor.and_then(|shape| shape.events.get(name).cloned()));
            if let Some(prev) = prior {
                if prev.payload != event.payload {
                    return Err(ConfigError::MixinConflict {
                        class,
                        mixin: mixin_name,
                        what: "event",
                        name: name.clone(),
                        origin: prev.origin,
                    }
                    .into());
                }
                continue;
            }
            entry.events.insert(name.clone(), event.clone());
        }

        for (name, decl) in &mixin.properties {
            let prior_origin = entry
                .properties
                .get(name)
                .map(|_| class.clone())
                .or_else(|| {
                    ancestor
                        .and_then(|shape| shape.property(name))
                        .map(|p| self.origin_of(p.defined_in))
                });
            if let Some(origin) = prior_origin {
                if !patch {
                    return Err(ConfigError::MixinConflict {
                        class,
                        mixin: mixin_name,
                        what: "property",
                        name: name.clone(),
                        origin,
                    }
                    .into());
                }
            }
            entry.properties.insert(name.clone(), decl.clone());
        }

        for (name, member) in &mixin.members {
            let prior = entry
                .members
                .get(name)
                .cloned()
                .map(Rc::new)
                .or_else(|| ancestor.and_then(|shape| shape.member(name).cloned()));
            if let Some(prev) = &prior {
                if !patch {
                    return Err(ConfigError::MixinConflict {
                        class,
                        mixin: mixin_name,
                        what: "member",
                        name: name.clone(),
                        origin: prev.origin.clone(),
                    }
                    .into());
                }
            }
            let mut merged = member.clone();
            if let Some(prev) = prior {
                // Patch mode keeps the prior implementation reachable
                // for explicit base calls.
                merged = merged.with_base(prev);
            }
            entry.members.insert(name.clone(), merged);
        }

        entry.mixins.push(hash);
        Ok(())
    }

    // ==========================================================================
    // Interface Definition & Satisfaction
    // ==========================================================================

    /// Define an interface from a declarative configuration.
    pub fn define_interface(&mut self, config: InterfaceConfig) -> Result<DefHash, MetaError> {
        let qname = QualifiedName::from_dotted(&config.name);
        let full = qname.to_string();

        let mut entry = InterfaceEntry::new(qname);
        for extend in &config.extend {
            let ext = self.interface_by_name(extend).ok_or_else(|| {
                ConfigError::UnknownInterface {
                    class: full.clone(),
                    interface: extend.clone(),
                }
            })?;
            entry.extend.push(ext.hash);
        }
        entry.members = config.members;
        entry.properties = config.properties;
        entry.events = config.events;

        self.insert_interface(entry)
    }

    /// Verify, transitively over `extends`, that the class satisfies
    /// every implemented interface (its own and its ancestors').
    fn verify_interfaces(
        &self,
        entry: &ClassEntry,
        ancestor: Option<&ClassShape>,
    ) -> Result<(), MetaError> {
        let class = entry.qualified_name.to_string();

        // Assembled surfaces: ancestors' flattened tables plus this
        // entry's local declarations and generated accessor names.
        let mut member_surface: FxHashSet<String> = FxHashSet::default();
        let mut property_surface: FxHashSet<String> = FxHashSet::default();
        let mut event_surface: FxHashSet<String> = FxHashSet::default();
        if let Some(shape) = ancestor {
            member_surface.extend(shape.members.keys().cloned());
            member_surface.extend(shape.accessors.keys().cloned());
            property_surface.extend(shape.properties.keys().cloned());
            event_surface.extend(shape.events.keys().cloned());
        }
        member_surface.extend(entry.members.keys().cloned());
        for decl in entry.properties.values() {
            property_surface.insert(decl.name.clone());
            for (accessor, _) in decl.accessor_names() {
                member_surface.insert(accessor);
            }
        }
        event_surface.extend(entry.events.keys().cloned());

        // Interfaces of the whole ancestor chain re-validate here, so a
        // concrete subclass closes requirements an abstract ancestor
        // left open.
        let mut to_check: Vec<DefHash> = entry.interfaces.clone();
        let mut ancestor_hash = entry.super_class;
        while let Some(hash) = ancestor_hash {
            let Some(class_entry) = self.class_by_hash(hash) else {
                break;
            };
            to_check.extend(class_entry.interfaces.iter().copied());
            ancestor_hash = class_entry.super_class;
        }

        let mut seen: FxHashSet<DefHash> = FxHashSet::default();
        while let Some(hash) = to_check.pop() {
            if !seen.insert(hash) {
                continue;
            }
            let iface = self
                .interface_by_hash(hash)
                .ok_or_else(|| LookupError::NoSuchClass(hash.to_string()))?;
            to_check.extend(iface.extend.iter().copied());

            let interface = iface.qualified_name.to_string();
            for member in &iface.members {
                if !member_surface.contains(member) {
                    return Err(ConfigError::UnsatisfiedInterface {
                        class,
                        interface,
                        requirement: "member",
                        name: member.clone(),
                    }
                    .into());
                }
            }
            for property in &iface.properties {
                if !property_surface.contains(property) {
                    return Err(ConfigError::UnsatisfiedInterface {
                        class,
                        interface,
                        requirement: "property",
                        name: property.clone(),
                    }
                    .into());
                }
            }
            for event in &iface.events {
                if !event_surface.contains(event) {
                    return Err(ConfigError::UnsatisfiedInterface {
                        class,
                        interface,
                        requirement: "event",
                        name: event.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn origin_of(&self, hash: DefHash) -> String {
        if let Some(entry) = self.class_by_hash(hash) {
            return entry.qualified_name.to_string();
        }
        if let Some(entry) = self.mixin_by_hash(hash) {
            return entry.qualified_name.to_string();
        }
        if let Some(entry) = self.interface_by_hash(hash) {
            return entry.qualified_name.to_string();
        }
        hash.to_string()
    }
}

fn conflict(
    class: &str,
    mixin: &str,
    what: &'static str,
    name: &str,
    origin: &str,
) -> ConfigError {
    ConfigError::MixinConflict {
        class: class.to_string(),
        mixin: mixin.to_string(),
        what,
        name: name.to_string(),
        origin: origin.to_string(),
    }
}
