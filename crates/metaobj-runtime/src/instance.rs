//! Live object instances and per-property value slots.
//!
//! An [`Instance`] is pure state: the runtime owns all behavior and
//! resolves values against the instance's class shape. Property values
//! live in layered [`PropertySlots`]; absence of a layer is `None`,
//! `Value::Null` is a present null.

use rustc_hash::FxHashMap;

use metaobj_core::{DefHash, ObjectId, Value};

/// Layered storage of one property on one instance.
///
/// Resolution order: runtime → inherited → user → themed →
/// init override → class init. The inherited slot is only populated
/// while no local (runtime/user/themed) value exists; a local set
/// clears it so the local value stays authoritative.
#[derive(Debug, Clone, Default)]
pub struct PropertySlots {
    pub runtime: Option<Value>,
    pub user: Option<Value>,
    pub themed: Option<Value>,
    pub inherited: Option<Value>,
    pub init_override: Option<Value>,
}

impl PropertySlots {
    /// Whether a local (non-inherited, non-init) value overrides the
    /// inheritance cascade.
    pub fn has_local(&self) -> bool {
        self.runtime.is_some() || self.user.is_some() || self.themed.is_some()
    }

    /// Drop every stored layer.
    pub fn clear(&mut self) {
        self.runtime = None;
        self.user = None;
        self.themed = None;
        self.inherited = None;
        self.init_override = None;
    }
}

/// State of one live object.
#[derive(Debug)]
pub struct Instance {
    /// Class definition hash.
    pub class: DefHash,
    /// Property slots, created on first write.
    pub slots: FxHashMap<String, PropertySlots>,
    /// Layout parent (inheritable-property cascade source).
    pub parent: Option<ObjectId>,
    /// Layout children, in attach order.
    pub children: Vec<ObjectId>,
    /// Set once the constructor chain completed.
    pub constructed: bool,
    /// Set at dispose entry to make disposal reentrancy-safe.
    pub disposed: bool,
}

impl Instance {
    pub fn new(class: DefHash) -> Self {
        Self {
            class,
            slots: FxHashMap::default(),
            parent: None,
            children: Vec::new(),
            constructed: false,
            disposed: false,
        }
    }

    /// Slots of a property, created on demand.
    pub fn slots_mut(&mut self, property: &str) -> &mut PropertySlots {
        self.slots.entry(property.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_override_detection() {
        let mut slots = PropertySlots::default();
        assert!(!slots.has_local());

        slots.inherited = Some(Value::Int(1));
        assert!(!slots.has_local());

        slots.user = Some(Value::Int(2));
        assert!(slots.has_local());

        slots.clear();
        assert!(!slots.has_local());
        assert!(slots.inherited.is_none());
    }

    #[test]
    fn slots_created_on_demand() {
        let mut instance = Instance::new(DefHash::class("t.A"));
        assert!(instance.slots.is_empty());
        instance.slots_mut("color").user = Some(Value::str("red"));
        assert_eq!(
            instance.slots.get("color").unwrap().user,
            Some(Value::str("red"))
        );
    }
}
