//! Property engine: layered value resolution and mutation.
//!
//! Every property access resolves against the instance's
//! [`PropertySlots`](crate::instance::PropertySlots) in layer order
//! (runtime → inherited → user → themed → init override → class init),
//! falling back to the layout-parent chain for inheritable properties.
//! Mutations run the declared transform/validate/check pipeline, store
//! the layer, and fire observers only when the resolved value actually
//! changed.

use metaobj_core::{
    CheckKind, ContractError, DefHash, LookupError, MetaError, ObjectId, ObjectOps, PropertyDecl,
    PropertyGroup, Value,
};
use metaobj_registry::GroupAccessor;

use crate::runtime::Runtime;

/// Target layer of a property mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layer {
    Runtime,
    User,
    Themed,
    Init,
    Inherited,
}

impl Runtime {
    /// Declaration of a property from the target's flattened table.
    fn decl_of(&mut self, obj: ObjectId, property: &str) -> Result<PropertyDecl, MetaError> {
        let shape = self.shape_of(obj)?;
        shape
            .property(property)
            .map(|resolved| resolved.decl.clone())
            .ok_or_else(|| {
                LookupError::NoSuchProperty {
                    class: shape.class_name.to_string(),
                    property: property.to_string(),
                }
                .into()
            })
    }

    /// Layer-order resolution against the instance's own slots.
    fn local_value(&self, obj: ObjectId, decl: &PropertyDecl) -> Option<Value> {
        let instance = self.identity.get(obj)?;
        if let Some(slots) = instance.slots.get(&decl.name) {
            if let Some(value) = &slots.runtime {
                return Some(value.clone());
            }
            if decl.is_inheritable() {
                if let Some(value) = &slots.inherited {
                    return Some(value.clone());
                }
            }
            if let Some(value) = &slots.user {
                return Some(value.clone());
            }
            if decl.is_themeable() {
                if let Some(value) = &slots.themed {
                    return Some(value.clone());
                }
            }
            if let Some(value) = &slots.init_override {
                return Some(value.clone());
            }
        }
        decl.init.clone()
    }

    /// Resolve a property to `Some(value)` or `None` (undefined).
    pub(crate) fn try_resolve(
        &mut self,
        obj: ObjectId,
        property: &str,
    ) -> Result<Option<Value>, MetaError> {
        let decl = self.decl_of(obj, property)?;
        self.try_resolve_decl(obj, &decl)
    }

    fn try_resolve_decl(
        &mut self,
        obj: ObjectId,
        decl: &PropertyDecl,
    ) -> Result<Option<Value>, MetaError> {
        if let Some(value) = self.local_value(obj, decl) {
            return Ok(Some(value));
        }
        if decl.is_inheritable() {
            return self.parent_resolved(obj, &decl.name);
        }
        Ok(None)
    }

    /// Resolve an inheritable property on the layout-parent chain: the
    /// nearest ancestor declaring the property resolves for us, its own
    /// resolution recursing further up.
    fn parent_resolved(
        &mut self,
        obj: ObjectId,
        property: &str,
    ) -> Result<Option<Value>, MetaError> {
        let mut current = self.identity.get(obj).and_then(|i| i.parent);
        while let Some(parent) = current {
            let parent_shape = self.shape_of(parent)?;
            if parent_shape.property(property).is_some() {
                return self.try_resolve(parent, property);
            }
            current = self.identity.get(parent).and_then(|i| i.parent);
        }
        Ok(None)
    }

    /// Resolve a property, mapping "undefined" per declaration:
    /// `Null` for nullable/inheritable, an error otherwise.
    pub(crate) fn resolve_required(
        &mut self,
        obj: ObjectId,
        property: &str,
    ) -> Result<Value, MetaError> {
        let decl = self.decl_of(obj, property)?;
        if let Some(value) = self.try_resolve_decl(obj, &decl)? {
            return Ok(value);
        }
        if decl.is_nullable() || decl.is_inheritable() {
            return Ok(Value::Null);
        }
        let shape = self.shape_of(obj)?;
        Err(ContractError::PropertyNotReady {
            class: shape.class_name.to_string(),
            property: property.to_string(),
        }
        .into())
    }

    // ==========================================================================
    // Mutation
    // ==========================================================================

    /// Store a value into (or clear) one layer and fire observers when
    /// the resolved value changed.
    pub(crate) fn apply_layer(
        &mut self,
        obj: ObjectId,
        property: &str,
        layer: Layer,
        value: Option<Value>,
    ) -> Result<Value, MetaError> {
        let shape = self.shape_of(obj)?;
        let class_name = shape.class_name.to_string();
        let decl = shape
            .property(property)
            .map(|resolved| resolved.decl.clone())
            .ok_or_else(|| LookupError::NoSuchProperty {
                class: class_name.clone(),
                property: property.to_string(),
            })?;

        match layer {
            Layer::Themed if !decl.is_themeable() => {
                return Err(LookupError::NoSuchAccessor {
                    property: decl.name,
                    accessor: format!("set_themed_{property}"),
                }
                .into());
            }
            Layer::Init => {
                let constructed = self
                    .identity
                    .get(obj)
                    .map(|i| i.constructed)
                    .unwrap_or(false);
                if constructed {
                    return Err(ContractError::InitAfterConstruct {
                        class: class_name,
                        property: decl.name,
                    }
                    .into());
                }
            }
            _ => {}
        }

        let old = self.try_resolve_decl(obj, &decl)?;

        // The inherited layer carries already-resolved ancestor values;
        // refresh never argument-checks.
        let mut incoming = value;
        if layer != Layer::Inherited {
            if let Some(raw) = incoming {
                let transformed = match &decl.transform {
                    Some(member) => self.call(obj, member, std::slice::from_ref(&raw))?,
                    None => raw,
                };
                if let Some(member) = &decl.validate {
                    let verdict = self.call(obj, member, std::slice::from_ref(&transformed))?;
                    if !verdict.truthy() {
                        return Err(ContractError::ValidateFailed {
                            property: decl.name,
                            value: transformed.to_string(),
                        }
                        .into());
                    }
                }
                if transformed == Value::Null {
                    // Nullability is enforced in every environment.
                    if !decl.is_nullable() {
                        return Err(ContractError::NotNullable {
                            class: class_name,
                            property: decl.name,
                        }
                        .into());
                    }
                } else if self.env.debug_enabled() {
                    if let Some(check) = &decl.check {
                        self.run_check(check, &decl.name, &transformed)?;
                    }
                }
                incoming = Some(transformed);
            }
        }

        let is_local_layer = matches!(layer, Layer::Runtime | Layer::User | Layer::Themed);
        let is_local_clear = is_local_layer && incoming.is_none();
        {
            let instance = self
                .identity
                .get_mut(obj)
                .ok_or(ContractError::Disposed { object: obj })?;
            let slots = instance.slots_mut(&decl.name);
            let is_local_set = is_local_layer && incoming.is_some();
            match layer {
                Layer::Runtime => slots.runtime = incoming,
                Layer::User => slots.user = incoming,
                Layer::Themed => slots.themed = incoming,
                Layer::Init => slots.init_override = incoming,
                Layer::Inherited => slots.inherited = incoming,
            }
            // A local set takes over from the inheritance cascade.
            if is_local_set {
                slots.inherited = None;
            }
        }

        // Clearing the last local layer rejoins the inheritance cascade:
        // repopulate the inherited slot from the current parent chain so
        // the resolved value matches the documented layer order again.
        if is_local_clear && decl.is_inheritable() {
            let has_local = self
                .identity
                .get(obj)
                .and_then(|i| i.slots.get(&decl.name))
                .is_some_and(|s| s.has_local());
            if !has_local {
                let inherited = self.parent_resolved(obj, &decl.name)?;
                if let Some(instance) = self.identity.get_mut(obj) {
                    instance.slots_mut(&decl.name).inherited = inherited;
                }
            }
        }

        let new = self.try_resolve_decl(obj, &decl)?;
        if old == new {
            return Ok(new.unwrap_or(Value::Null));
        }
        let new_value = new.unwrap_or(Value::Null);
        let old_value = old.unwrap_or(Value::Null);

        if let Some(member) = &decl.apply {
            self.call(
                obj,
                member,
                &[
                    new_value.clone(),
                    old_value.clone(),
                    Value::str(&decl.name),
                ],
            )?;
        }

        if let Some(event_type) = &decl.event {
            if self.events.has_any_listener(obj, event_type) {
                self.fire_data_event(obj, event_type, new_value.clone(), Some(old_value))?;
            }
        }

        if decl.is_inheritable() {
            let children = self
                .identity
                .get(obj)
                .map(|i| i.children.clone())
                .unwrap_or_default();
            for child in children {
                self.refresh_from_parent(child, &decl.name, Some(new_value.clone()))?;
            }
        }

        Ok(new_value)
    }

    /// Push a resolved inherited value down to a child, unless the
    /// child overrides the property locally or does not declare it.
    pub(crate) fn refresh_from_parent(
        &mut self,
        child: ObjectId,
        property: &str,
        value: Option<Value>,
    ) -> Result<(), MetaError> {
        let Some((class, overridden)) = self.identity.get(child).map(|i| {
            (
                i.class,
                i.slots.get(property).is_some_and(|s| s.has_local()),
            )
        }) else {
            return Ok(());
        };
        if overridden {
            return Ok(());
        }
        let shape = self.registry.shape(class)?;
        let inheritable = shape
            .property(property)
            .is_some_and(|resolved| resolved.decl.is_inheritable());
        if !inheritable {
            return Ok(());
        }
        self.apply_layer(child, property, Layer::Inherited, value)?;
        Ok(())
    }

    fn run_check(&self, check: &CheckKind, property: &str, value: &Value) -> Result<(), MetaError> {
        let accepted = match check {
            CheckKind::InstanceOf(class_name) => match value {
                Value::Object(id) => {
                    let ancestor = DefHash::class_of(class_name);
                    self.identity
                        .get(*id)
                        .is_some_and(|i| self.registry.is_subclass(i.class, ancestor))
                }
                _ => false,
            },
            other => other.accepts_shallow(value),
        };
        if accepted {
            Ok(())
        } else {
            Err(ContractError::CheckFailed {
                property: property.to_string(),
                expected: check.expectation(),
                value: value.to_string(),
            }
            .into())
        }
    }

    // ==========================================================================
    // Public Property Surface
    // ==========================================================================

    /// Set several user-layer values; declaration order of the map is
    /// the application order.
    pub fn set_values(
        &mut self,
        obj: ObjectId,
        values: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<(), MetaError> {
        for (property, value) in values {
            self.apply_layer(obj, &property, Layer::User, Some(value))?;
        }
        Ok(())
    }

    /// Write the init-override layer; only valid before construction
    /// completes.
    pub fn init_value(
        &mut self,
        obj: ObjectId,
        property: &str,
        value: Value,
    ) -> Result<Value, MetaError> {
        self.apply_layer(obj, property, Layer::Init, Some(value))
    }

    /// Push an inherited value (or its absence) onto an inheritable
    /// property.
    pub fn refresh(
        &mut self,
        obj: ObjectId,
        property: &str,
        value: Option<Value>,
    ) -> Result<(), MetaError> {
        let decl = self.decl_of(obj, property)?;
        if !decl.is_inheritable() {
            return Err(LookupError::NoSuchAccessor {
                property: property.to_string(),
                accessor: format!("refresh_{property}"),
            }
            .into());
        }
        self.apply_layer(obj, property, Layer::Inherited, value)?;
        Ok(())
    }

    pub fn set_runtime_value(
        &mut self,
        obj: ObjectId,
        property: &str,
        value: Value,
    ) -> Result<Value, MetaError> {
        self.apply_layer(obj, property, Layer::Runtime, Some(value))
    }

    pub fn reset_runtime_value(&mut self, obj: ObjectId, property: &str) -> Result<(), MetaError> {
        self.apply_layer(obj, property, Layer::Runtime, None)?;
        Ok(())
    }

    pub fn set_themed(
        &mut self,
        obj: ObjectId,
        property: &str,
        value: Value,
    ) -> Result<Value, MetaError> {
        self.apply_layer(obj, property, Layer::Themed, Some(value))
    }

    pub fn reset_themed(&mut self, obj: ObjectId, property: &str) -> Result<(), MetaError> {
        self.apply_layer(obj, property, Layer::Themed, None)?;
        Ok(())
    }

    /// Resolved value of a boolean property. Like the generated `is_*`
    /// accessor, only boolean-checked declarations qualify.
    pub fn is_value(&mut self, obj: ObjectId, property: &str) -> Result<bool, MetaError> {
        self.boolean_decl(obj, property, "is")?;
        Ok(self.resolve_required(obj, property)?.truthy())
    }

    /// Set the negated resolved value of a boolean property; returns the
    /// new state.
    pub fn toggle(&mut self, obj: ObjectId, property: &str) -> Result<bool, MetaError> {
        self.boolean_decl(obj, property, "toggle")?;
        let current = self.resolve_required(obj, property)?.truthy();
        self.apply_layer(obj, property, Layer::User, Some(Value::Bool(!current)))?;
        Ok(!current)
    }

    fn boolean_decl(
        &mut self,
        obj: ObjectId,
        property: &str,
        prefix: &str,
    ) -> Result<(), MetaError> {
        let decl = self.decl_of(obj, property)?;
        if !decl.is_boolean() {
            return Err(LookupError::NoSuchAccessor {
                property: property.to_string(),
                accessor: format!("{prefix}_{property}"),
            }
            .into());
        }
        Ok(())
    }

    // ==========================================================================
    // Group Application
    // ==========================================================================

    /// Fan a group mutation out to its member properties in declaration
    /// order.
    pub(crate) fn apply_group(
        &mut self,
        obj: ObjectId,
        group: &PropertyGroup,
        accessor: GroupAccessor,
        args: &[Value],
    ) -> Result<(), MetaError> {
        match accessor {
            GroupAccessor::Set | GroupAccessor::SetThemed => {
                let values: Vec<Value> = if group.shorthand {
                    PropertyGroup::expand_shorthand(args)
                } else if args.len() == 1 {
                    vec![args[0].clone(); group.members.len()]
                } else {
                    args.to_vec()
                };
                let layer = if accessor == GroupAccessor::Set {
                    Layer::User
                } else {
                    Layer::Themed
                };
                for (member, value) in group.members.iter().zip(values) {
                    self.apply_layer(obj, member, layer, Some(value))?;
                }
            }
            GroupAccessor::Reset | GroupAccessor::ResetThemed => {
                let layer = if accessor == GroupAccessor::Reset {
                    Layer::User
                } else {
                    Layer::Themed
                };
                for member in &group.members {
                    self.apply_layer(obj, member, layer, None)?;
                }
            }
        }
        Ok(())
    }
}
