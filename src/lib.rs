//! metaobj — a dynamic object/metaobject runtime.
//!
//! Classes, mixins and interfaces are declared at run time, composed
//! with conflict detection, and instantiated into objects with layered
//! reactive properties and strategy-driven event dispatch.
//!
//! This crate is the facade: it re-exports the three layers and offers
//! no API of its own.
//!
//! # Quick start
//!
//! ```
//! use metaobj::{ClassConfig, ObjectOps, PropertyDecl, ROOT_CLASS, Runtime, Value};
//!
//! let mut runtime = Runtime::new();
//! runtime
//!     .define_class(
//!         ClassConfig::new("demo.Shape")
//!             .extend(ROOT_CLASS)
//!             .property(PropertyDecl::new("color").with_init("red")),
//!     )
//!     .unwrap();
//!
//! let shape = runtime.new_object("demo.Shape", &[]).unwrap();
//! assert_eq!(runtime.get(shape, "color").unwrap(), Value::str("red"));
//! ```

pub use metaobj_core::{
    AccessorKind, CallContext, CheckKind, ClassConfig, ClassEntry, ClassKind, ConfigError,
    ContractError, DefHash, DeferFn, Environment, EventEntry, HookFn, InterfaceConfig,
    InterfaceEntry, ListenerId, LookupError, MemberEntry, MemberFn, MemberKind, MetaError,
    MixinConfig, MixinEntry, ObjectId, ObjectOps, PropertyDecl, PropertyFlags, PropertyGroup,
    QualifiedName, ROOT_CLASS, StaticFn, StaticMember, Value, environment_keys, hash_domains,
    hook_fn, member_fn, static_fn,
};
pub use metaobj_registry::{
    ClassShape, CtorLevel, DefinitionRegistry, DtorLevel, GroupAccessor, NamespaceTree,
    ResolvedProperty, SymbolRef,
};
pub use metaobj_runtime::{
    DEFAULT_PRIORITY, DirectDispatcher, EventDispatcher, EventManager, EventObject, EventPool,
    EventTargetHandler, IdentityRegistry, Instance, ListenerEntry, ListenerFn, Phase,
    PropertySlots, Runtime, RuntimeObjectHandler, listener_fn,
};
