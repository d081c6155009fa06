//! Native member functions and the runtime callback seam.
//!
//! Members, constructors, destructors and property callbacks are native
//! Rust closures. They receive a [`CallContext`] coupling the invocation
//! target (`this`) with an [`ObjectOps`] handle back into the runtime, so
//! core stays free of the concrete runtime type. Overridden members keep
//! a `base` back-reference resolved once at composition time, making
//! explicit super-calls (`ctx.call_base(...)`) a cached lookup rather
//! than a per-call search.

use std::rc::Rc;

use crate::entries::{MemberEntry, MemberKind};
use crate::{ListenerId, LookupError, MetaError, ObjectId, QualifiedName, Value};

/// Operations the runtime exposes to native member code.
///
/// Object-safe by design: member closures hold `&mut dyn ObjectOps`.
pub trait ObjectOps {
    /// Resolve a property's current value on a target.
    fn get(&mut self, target: ObjectId, property: &str) -> Result<Value, MetaError>;

    /// Set a property's user value on a target. Returns the stored value.
    fn set(&mut self, target: ObjectId, property: &str, value: Value) -> Result<Value, MetaError>;

    /// Reset a property's user value on a target.
    fn reset(&mut self, target: ObjectId, property: &str) -> Result<(), MetaError>;

    /// Invoke an instance member on a target.
    fn call(&mut self, target: ObjectId, member: &str, args: &[Value]) -> Result<Value, MetaError>;

    /// Fire a bubbling event. Returns `!default_prevented`.
    fn fire_event(&mut self, target: ObjectId, event_type: &str) -> Result<bool, MetaError>;

    /// Fire a non-bubbling data event carrying `data` (and the prior
    /// value, if any). Returns `!default_prevented`.
    fn fire_data_event(
        &mut self,
        target: ObjectId,
        event_type: &str,
        data: Value,
        old_data: Option<Value>,
    ) -> Result<bool, MetaError>;

    /// Remove an event listener registration by id. Removal during a
    /// dispatch affects only later dispatches, never the in-flight one.
    fn remove_listener_by_id(&mut self, id: ListenerId) -> Result<(), MetaError>;

    /// Dispose a target object (idempotent).
    fn dispose_object(&mut self, target: ObjectId) -> Result<(), MetaError>;

    /// Qualified class name of a live target.
    fn class_name_of(&self, target: ObjectId) -> Option<QualifiedName>;

    /// Layout parent of a live target.
    fn parent_of(&self, target: ObjectId) -> Option<ObjectId>;
}

/// Invocation context passed to every native member function.
pub struct CallContext<'a> {
    ops: &'a mut dyn ObjectOps,
    this: ObjectId,
    member_name: String,
    base: Option<Rc<MemberEntry>>,
}

impl<'a> CallContext<'a> {
    /// Context for a hook or callback with no base chain.
    pub fn new(ops: &'a mut dyn ObjectOps, this: ObjectId) -> Self {
        Self {
            ops,
            this,
            member_name: String::new(),
            base: None,
        }
    }

    /// Context for an instance member carrying its base back-reference.
    pub fn for_member(
        ops: &'a mut dyn ObjectOps,
        this: ObjectId,
        member_name: impl Into<String>,
        base: Option<Rc<MemberEntry>>,
    ) -> Self {
        Self {
            ops,
            this,
            member_name: member_name.into(),
            base,
        }
    }

    /// The invocation target.
    pub fn this(&self) -> ObjectId {
        self.this
    }

    /// Raw access to the runtime operations.
    pub fn ops(&mut self) -> &mut dyn ObjectOps {
        self.ops
    }

    // === Delegations bound to `this` ===

    pub fn get(&mut self, property: &str) -> Result<Value, MetaError> {
        self.ops.get(self.this, property)
    }

    pub fn set(&mut self, property: &str, value: Value) -> Result<Value, MetaError> {
        self.ops.set(self.this, property, value)
    }

    pub fn reset(&mut self, property: &str) -> Result<(), MetaError> {
        self.ops.reset(self.this, property)
    }

    pub fn call(&mut self, member: &str, args: &[Value]) -> Result<Value, MetaError> {
        self.ops.call(self.this, member, args)
    }

    pub fn fire_event(&mut self, event_type: &str) -> Result<bool, MetaError> {
        self.ops.fire_event(self.this, event_type)
    }

    pub fn fire_data_event(
        &mut self,
        event_type: &str,
        data: Value,
        old_data: Option<Value>,
    ) -> Result<bool, MetaError> {
        self.ops.fire_data_event(self.this, event_type, data, old_data)
    }

    /// Invoke the overridden ("base") implementation of the current member.
    ///
    /// The base chain is resolved at composition time; each level sees its
    /// own predecessor, so nested base calls walk the override stack.
    pub fn call_base(&mut self, args: &[Value]) -> Result<Value, MetaError> {
        let base = self.base.clone().ok_or_else(|| LookupError::NoBaseMember {
            member: self.member_name.clone(),
        })?;
        match &base.kind {
            MemberKind::Method(f) => {
                let f = f.clone();
                let mut ctx = CallContext::for_member(
                    &mut *self.ops,
                    self.this,
                    base.name.clone(),
                    base.base.clone(),
                );
                f(&mut ctx, args)
            }
            MemberKind::Constant(v) => Ok(v.clone()),
        }
    }
}

/// Native instance member function.
pub type MemberFn = Rc<dyn Fn(&mut CallContext<'_>, &[Value]) -> Result<Value, MetaError>>;

/// Constructor/destructor/mixin hook.
pub type HookFn = Rc<dyn Fn(&mut CallContext<'_>, &[Value]) -> Result<(), MetaError>>;

/// Static member function (not bound to an instance).
pub type StaticFn = Rc<dyn Fn(&mut dyn ObjectOps, &[Value]) -> Result<Value, MetaError>>;

/// Helper wrapping a closure into a [`MemberFn`].
pub fn member_fn<F>(f: F) -> MemberFn
where
    F: Fn(&mut CallContext<'_>, &[Value]) -> Result<Value, MetaError> + 'static,
{
    Rc::new(f)
}

/// Helper wrapping a closure into a [`HookFn`].
pub fn hook_fn<F>(f: F) -> HookFn
where
    F: Fn(&mut CallContext<'_>, &[Value]) -> Result<(), MetaError> + 'static,
{
    Rc::new(f)
}

/// Helper wrapping a closure into a [`StaticFn`].
pub fn static_fn<F>(f: F) -> StaticFn
where
    F: Fn(&mut dyn ObjectOps, &[Value]) -> Result<Value, MetaError> + 'static,
{
    Rc::new(f)
}
