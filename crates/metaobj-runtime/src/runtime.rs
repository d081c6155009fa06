//! The runtime facade.
//!
//! [`Runtime`] owns the definition registry, the identity registry, the
//! event manager and the environment. It implements [`ObjectOps`], the
//! seam native member code calls back through, and hosts the generic
//! string-dispatch surface: `call` resolves instance members first, then
//! property accessors, then group accessors.
//!
//! # Thread Safety
//!
//! Single-threaded and cooperative, like the registry it wraps. Member
//! closures re-enter the runtime through `&mut dyn ObjectOps`; nothing
//! here is `Send`.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use metaobj_core::{
    AccessorKind, CallContext, ClassConfig, ConfigError, ContractError, DefHash, Environment,
    InterfaceConfig, ListenerId, LookupError, MemberKind, MetaError, MixinConfig, ObjectId,
    ObjectOps, QualifiedName, StaticMember, Value,
};
use metaobj_registry::{ClassShape, DefinitionRegistry};

use crate::events::{
    EventDispatcher, EventManager, EventObject, EventTargetHandler, ListenerFn, Phase,
};
use crate::identity::IdentityRegistry;
use crate::properties::Layer;

/// Top-level runtime: definitions, live objects, events, environment.
pub struct Runtime {
    pub(crate) registry: DefinitionRegistry,
    pub(crate) identity: IdentityRegistry,
    pub(crate) events: EventManager,
    pub(crate) env: Environment,
    pub(crate) singletons: FxHashMap<DefHash, ObjectId>,
    pub(crate) shutting_down: bool,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::with_env(Environment::default())
    }
}

impl Runtime {
    /// Runtime with default environment (debug checks on) and the root
    /// object class pre-defined.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runtime with an explicit environment.
    pub fn with_env(env: Environment) -> Self {
        Self {
            registry: DefinitionRegistry::with_root(),
            identity: IdentityRegistry::new(),
            events: EventManager::new(),
            env,
            singletons: FxHashMap::default(),
            shutting_down: false,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DefinitionRegistry {
        &mut self.registry
    }

    /// Number of live objects.
    pub fn live_objects(&self) -> usize {
        self.identity.len()
    }

    /// Numeric hash code of an object token.
    pub fn to_hash_code(&self, obj: ObjectId) -> u32 {
        self.identity.to_hash_code(obj)
    }

    /// Resolve a hash code back to a live object; `None` once the
    /// object is disposed.
    pub fn from_hash_code(&self, code: u32) -> Option<ObjectId> {
        self.identity.from_hash_code(code)
    }

    // ==========================================================================
    // Definition Facade
    // ==========================================================================

    pub fn define_class(&mut self, config: ClassConfig) -> Result<DefHash, MetaError> {
        self.registry.define_class(config)
    }

    pub fn define_mixin(&mut self, config: MixinConfig) -> Result<DefHash, MetaError> {
        self.registry.define_mixin(config)
    }

    pub fn define_interface(&mut self, config: InterfaceConfig) -> Result<DefHash, MetaError> {
        self.registry.define_interface(config)
    }

    pub fn include_into(&mut self, class: &str, mixin: &str) -> Result<(), MetaError> {
        self.registry.include_into(class, mixin)
    }

    pub fn patch(&mut self, class: &str, mixin: &str) -> Result<(), MetaError> {
        self.registry.patch(class, mixin)
    }

    // ==========================================================================
    // Object Access
    // ==========================================================================

    /// Assembled shape of a live object's class.
    pub(crate) fn shape_of(&mut self, obj: ObjectId) -> Result<Rc<ClassShape>, MetaError> {
        let class = self
            .identity
            .get(obj)
            .map(|instance| instance.class)
            .ok_or(ContractError::Disposed { object: obj })?;
        self.registry.shape(class)
    }

    /// Qualified class name of a live object.
    pub fn class_of(&self, obj: ObjectId) -> Option<QualifiedName> {
        let instance = self.identity.get(obj)?;
        self.registry
            .class_by_hash(instance.class)
            .map(|entry| entry.qualified_name.clone())
    }

    /// Whether a live object's class equals or derives from a class.
    pub fn is_instance_of(&self, obj: ObjectId, class_name: &str) -> bool {
        self.identity
            .get(obj)
            .is_some_and(|i| self.registry.is_subclass(i.class, DefHash::class(class_name)))
    }

    /// Invoke a static member on a class.
    pub fn call_static(
        &mut self,
        class: &str,
        member: &str,
        args: &[Value],
    ) -> Result<Value, MetaError> {
        let entry = self
            .registry
            .class_by_name(class)
            .ok_or_else(|| LookupError::NoSuchClass(class.to_string()))?;
        let member_entry =
            entry
                .statics
                .get(member)
                .cloned()
                .ok_or_else(|| LookupError::NoSuchStatic {
                    class: class.to_string(),
                    member: member.to_string(),
                })?;
        match member_entry {
            StaticMember::Value(value) => Ok(value),
            StaticMember::Fn(f) => f(self, args),
        }
    }

    fn invoke_accessor(
        &mut self,
        obj: ObjectId,
        property: &str,
        kind: AccessorKind,
        accessor: &str,
        args: &[Value],
    ) -> Result<Value, MetaError> {
        let arg = |args: &[Value]| -> Result<Value, MetaError> {
            args.first().cloned().ok_or_else(|| {
                ConfigError::InvalidDeclaration(format!(
                    "accessor '{accessor}' expects one argument"
                ))
                .into()
            })
        };
        match kind {
            AccessorKind::Get => self.resolve_required(obj, property),
            AccessorKind::Set => self.apply_layer(obj, property, Layer::User, Some(arg(args)?)),
            AccessorKind::Reset => {
                self.apply_layer(obj, property, Layer::User, None)?;
                Ok(Value::Null)
            }
            AccessorKind::Init => self.apply_layer(obj, property, Layer::Init, Some(arg(args)?)),
            AccessorKind::Refresh => {
                self.apply_layer(obj, property, Layer::Inherited, args.first().cloned())?;
                Ok(Value::Null)
            }
            AccessorKind::SetRuntime => {
                self.apply_layer(obj, property, Layer::Runtime, Some(arg(args)?))
            }
            AccessorKind::ResetRuntime => {
                self.apply_layer(obj, property, Layer::Runtime, None)?;
                Ok(Value::Null)
            }
            AccessorKind::SetThemed => {
                self.apply_layer(obj, property, Layer::Themed, Some(arg(args)?))
            }
            AccessorKind::ResetThemed => {
                self.apply_layer(obj, property, Layer::Themed, None)?;
                Ok(Value::Null)
            }
            AccessorKind::Is => Ok(Value::Bool(self.resolve_required(obj, property)?.truthy())),
            AccessorKind::Toggle => {
                let current = self.resolve_required(obj, property)?.truthy();
                self.apply_layer(obj, property, Layer::User, Some(Value::Bool(!current)))
            }
        }
    }

    // ==========================================================================
    // Listener API
    // ==========================================================================

    pub fn add_listener(
        &mut self,
        target: ObjectId,
        event_type: &str,
        handler: ListenerFn,
        context: Option<ObjectId>,
        capture: bool,
    ) -> Result<ListenerId, MetaError> {
        if !self.identity.contains(target) {
            return Err(ContractError::Disposed { object: target }.into());
        }
        self.events
            .add_listener(target, event_type, handler, context, capture)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Result<(), MetaError> {
        self.events.remove_listener(id)
    }

    pub fn remove_all_listeners(&mut self, target: ObjectId) {
        self.events.remove_all_listeners(target);
    }

    pub fn has_listener(&self, target: ObjectId, event_type: &str, capture: bool) -> bool {
        self.events.has_listener(target, event_type, capture)
    }

    pub fn register_event_handler(&mut self, handler: Rc<dyn EventTargetHandler>) {
        self.events.register_handler(handler);
    }

    pub fn register_event_dispatcher(&mut self, dispatcher: Rc<dyn EventDispatcher>) {
        self.events.register_dispatcher(dispatcher);
    }

    // ==========================================================================
    // Event Firing
    // ==========================================================================

    /// Fire a non-bubbling event. Returns `!default_prevented`.
    pub fn fire_non_bubbling_event(
        &mut self,
        target: ObjectId,
        event_type: &str,
    ) -> Result<bool, MetaError> {
        self.fire(target, event_type, false, true, None, None)
    }

    fn fire(
        &mut self,
        target: ObjectId,
        event_type: &str,
        bubbles: bool,
        cancelable: bool,
        data: Option<Value>,
        old_data: Option<Value>,
    ) -> Result<bool, MetaError> {
        if !self.identity.contains(target) {
            return Err(ContractError::Disposed { object: target }.into());
        }
        // Declared-event check is a debug-only diagnostic.
        if self.env.debug_enabled() {
            let shape = self.shape_of(target)?;
            if !shape.has_event(event_type) {
                return Err(ContractError::UndeclaredEvent {
                    class: shape.class_name.to_string(),
                    event: event_type.to_string(),
                }
                .into());
            }
        }
        let mut event = self.events.acquire_event();
        event.init(event_type, target, bubbles, cancelable);
        event.data = data;
        event.old_data = old_data;
        self.dispatch_event(target, event)
    }

    /// Deliver a prepared event. Returns `!default_prevented`; the event
    /// is returned to the pool afterwards.
    pub fn dispatch_event(
        &mut self,
        target: ObjectId,
        mut event: Box<EventObject>,
    ) -> Result<bool, MetaError> {
        // Non-bubbling events with nobody listening never leave the pool
        // path.
        if !event.bubbles && !self.events.has_any_listener(target, &event.event_type) {
            self.events.release_event(event);
            return Ok(true);
        }

        let Some(dispatcher) = self.events.find_dispatcher(target, &event) else {
            let event_type = event.event_type.clone();
            self.events.release_event(event);
            return Err(LookupError::UndeliverableEvent { event_type, target }.into());
        };

        let snapshot = self
            .events
            .snapshot(target, &event.event_type, Phase::Bubble);
        let delivery = dispatcher.dispatch(self, target, &snapshot, &mut event);
        let ok = !event.is_default_prevented();
        self.events.release_event(event);
        delivery?;
        Ok(ok)
    }

    // ==========================================================================
    // Layout Parent Relation
    // ==========================================================================

    /// Link (or unlink with `None`) the layout parent of an object and
    /// refresh its inheritable properties from the new chain.
    pub fn set_layout_parent(
        &mut self,
        child: ObjectId,
        parent: Option<ObjectId>,
    ) -> Result<(), MetaError> {
        if !self.identity.contains(child) {
            return Err(ContractError::Disposed { object: child }.into());
        }
        if let Some(p) = parent {
            if !self.identity.contains(p) {
                return Err(ContractError::Disposed { object: p }.into());
            }
        }

        let old = self.identity.get(child).and_then(|i| i.parent);
        if old == parent {
            return Ok(());
        }
        if let Some(op) = old {
            if let Some(instance) = self.identity.get_mut(op) {
                instance.children.retain(|c| *c != child);
            }
        }
        if let Some(instance) = self.identity.get_mut(child) {
            instance.parent = parent;
        }
        if let Some(p) = parent {
            if let Some(instance) = self.identity.get_mut(p) {
                instance.children.push(child);
            }
        }

        let shape = self.shape_of(child)?;
        let inheritable: Vec<String> = shape
            .inheritable_properties()
            .map(str::to_string)
            .collect();
        for property in inheritable {
            let value = match parent {
                Some(p) => {
                    let parent_shape = self.shape_of(p)?;
                    if parent_shape.property(&property).is_some() {
                        self.try_resolve(p, &property)?
                    } else {
                        None
                    }
                }
                None => None,
            };
            self.refresh_from_parent(child, &property, value)?;
        }
        Ok(())
    }
}

impl ObjectOps for Runtime {
    fn get(&mut self, target: ObjectId, property: &str) -> Result<Value, MetaError> {
        self.resolve_required(target, property)
    }

    fn set(&mut self, target: ObjectId, property: &str, value: Value) -> Result<Value, MetaError> {
        self.apply_layer(target, property, Layer::User, Some(value))
    }

    fn reset(&mut self, target: ObjectId, property: &str) -> Result<(), MetaError> {
        self.apply_layer(target, property, Layer::User, None)?;
        Ok(())
    }

    fn call(&mut self, target: ObjectId, member: &str, args: &[Value]) -> Result<Value, MetaError> {
        let shape = self.shape_of(target)?;

        if let Some(entry) = shape.member(member) {
            match &entry.kind {
                MemberKind::Method(f) => {
                    let f = f.clone();
                    let base = entry.base.clone();
                    let name = entry.name.clone();
                    let mut ctx = CallContext::for_member(self, target, name, base);
                    return f(&mut ctx, args);
                }
                MemberKind::Constant(value) => return Ok(value.clone()),
            }
        }

        if let Some((property, kind)) = shape.accessors.get(member).cloned() {
            return self.invoke_accessor(target, &property, kind, member, args);
        }

        if let Some((group_name, kind)) = shape.group_accessors.get(member).cloned() {
            if let Some(group) = shape.groups.get(&group_name).cloned() {
                self.apply_group(target, &group, kind, args)?;
                return Ok(Value::Null);
            }
        }

        Err(LookupError::NoSuchMember {
            class: shape.class_name.to_string(),
            member: member.to_string(),
        }
        .into())
    }

    fn fire_event(&mut self, target: ObjectId, event_type: &str) -> Result<bool, MetaError> {
        self.fire(target, event_type, true, true, None, None)
    }

    fn fire_data_event(
        &mut self,
        target: ObjectId,
        event_type: &str,
        data: Value,
        old_data: Option<Value>,
    ) -> Result<bool, MetaError> {
        self.fire(target, event_type, false, true, Some(data), old_data)
    }

    fn remove_listener_by_id(&mut self, id: ListenerId) -> Result<(), MetaError> {
        self.events.remove_listener(id)
    }

    fn dispose_object(&mut self, target: ObjectId) -> Result<(), MetaError> {
        self.dispose(target)
    }

    fn class_name_of(&self, target: ObjectId) -> Option<QualifiedName> {
        self.class_of(target)
    }

    fn parent_of(&self, target: ObjectId) -> Option<ObjectId> {
        self.identity.get(target).and_then(|i| i.parent)
    }
}
