//! Object lifecycle: construction, disposal, shutdown.
//!
//! Constructor chains run root-first; at each level the class
//! constructor runs before the construct hooks of that level's directly
//! included mixins, in inclusion order. Destructor chains mirror this
//! most-derived first. Both chains come from the cached class shape, so
//! a mixin included after a class was defined reaches future instances
//! without any constructor rewriting.

use metaobj_core::{
    CallContext, ClassKind, ConfigError, ContractError, DefHash, LookupError, MetaError, ObjectId,
    Value,
};

use crate::instance::Instance;
use crate::runtime::Runtime;

impl Runtime {
    // ==========================================================================
    // Construction
    // ==========================================================================

    /// Create an instance of a class by qualified name.
    pub fn new_object(&mut self, class: &str, args: &[Value]) -> Result<ObjectId, MetaError> {
        let entry = self
            .registry
            .class_by_name(class)
            .ok_or_else(|| LookupError::NoSuchClass(class.to_string()))?;
        match entry.kind {
            ClassKind::Static => {
                return Err(ContractError::InstantiateStatic {
                    class: class.to_string(),
                }
                .into());
            }
            ClassKind::Abstract => {
                return Err(ContractError::InstantiateAbstract {
                    class: class.to_string(),
                }
                .into());
            }
            ClassKind::Singleton => {
                return Err(ContractError::SingletonConstructor {
                    class: class.to_string(),
                }
                .into());
            }
            ClassKind::Normal => {}
        }
        let hash = entry.hash;
        self.instantiate(hash, args)
    }

    /// Guarded singleton factory: creates on first call, afterwards
    /// returns the cached instance. A disposed singleton is recreated.
    pub fn get_instance(&mut self, class: &str) -> Result<ObjectId, MetaError> {
        let entry = self
            .registry
            .class_by_name(class)
            .ok_or_else(|| LookupError::NoSuchClass(class.to_string()))?;
        if entry.kind != ClassKind::Singleton {
            return Err(ConfigError::InvalidDeclaration(format!(
                "class '{class}' is not a singleton"
            ))
            .into());
        }
        let hash = entry.hash;

        if let Some(&cached) = self.singletons.get(&hash) {
            if self.identity.contains(cached) {
                return Ok(cached);
            }
            self.singletons.remove(&hash);
        }

        let id = self.instantiate(hash, &[])?;
        self.singletons.insert(hash, id);
        Ok(id)
    }

    fn instantiate(&mut self, class: DefHash, args: &[Value]) -> Result<ObjectId, MetaError> {
        let shape = self.registry.shape(class)?;
        let id = self.identity.register(Instance::new(class));

        // Root-first: every constructor sees fully initialized ancestors.
        for level in &shape.ctor_chain {
            if let Some(construct) = &level.construct {
                let construct = construct.clone();
                let mut ctx = CallContext::new(self, id);
                construct(&mut ctx, args)?;
            }
            for hook in &level.mixin_constructs {
                let hook = hook.clone();
                let mut ctx = CallContext::new(self, id);
                hook(&mut ctx, args)?;
            }
        }

        if let Some(instance) = self.identity.get_mut(id) {
            instance.constructed = true;
        }
        Ok(id)
    }

    // ==========================================================================
    // Disposal
    // ==========================================================================

    /// Dispose an object. Idempotent: a dead or already-disposing token
    /// is a no-op.
    pub fn dispose(&mut self, obj: ObjectId) -> Result<(), MetaError> {
        let Some(instance) = self.identity.get_mut(obj) else {
            return Ok(());
        };
        if instance.disposed {
            return Ok(());
        }
        instance.disposed = true;
        let class = instance.class;
        let parent = instance.parent;
        let children = instance.children.clone();

        let shape = self.registry.shape(class)?;

        // Most-derived first; class destructor before its mixins' hooks.
        // A failing hook aborts the chain but never the teardown: the
        // object is always unlinked and unregistered below.
        let mut teardown_error = None;
        'chain: for level in &shape.dtor_chain {
            if let Some(destruct) = &level.destruct {
                let destruct = destruct.clone();
                let mut ctx = CallContext::new(self, obj);
                if let Err(error) = destruct(&mut ctx, &[]) {
                    teardown_error = Some(error);
                    break 'chain;
                }
            }
            for hook in &level.mixin_destructs {
                let hook = hook.clone();
                let mut ctx = CallContext::new(self, obj);
                if let Err(error) = hook(&mut ctx, &[]) {
                    teardown_error = Some(error);
                    break 'chain;
                }
            }
        }

        // Break reference cycles through dereference-flagged properties.
        let dereference: Vec<String> = shape
            .properties
            .iter()
            .filter(|(_, resolved)| resolved.decl.is_dereference())
            .map(|(name, _)| name.clone())
            .collect();
        if let Some(instance) = self.identity.get_mut(obj) {
            for property in &dereference {
                if let Some(slots) = instance.slots.get_mut(property) {
                    slots.clear();
                }
            }
        }

        if self.shutting_down {
            self.events.discard_listeners(obj);
        } else {
            self.events.remove_all_listeners(obj);
        }

        if let Some(p) = parent {
            if let Some(parent_instance) = self.identity.get_mut(p) {
                parent_instance.children.retain(|c| *c != obj);
            }
        }
        for child in children {
            if let Some(child_instance) = self.identity.get_mut(child) {
                child_instance.parent = None;
            }
        }

        self.singletons.retain(|_, cached| *cached != obj);
        self.identity.unregister(obj);
        match teardown_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Dispose every live object in descending token order.
    ///
    /// One object's dispose error never aborts the teardown: the error
    /// is collected and disposal continues (`dispose` releases the
    /// object even when a destructor fails).
    pub fn shutdown(&mut self) -> Vec<MetaError> {
        self.shutting_down = true;
        let mut errors = Vec::new();
        while let Some(id) = self.identity.highest_live() {
            if let Err(error) = self.dispose(id) {
                errors.push(error);
            }
        }
        self.singletons.clear();
        self.shutting_down = false;
        errors
    }
}
