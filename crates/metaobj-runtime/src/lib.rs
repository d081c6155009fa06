//! Instance runtime for metaobj.
//!
//! Everything that exists at run time lives here: the [`Runtime`]
//! facade, live [`Instance`]s and their identity tokens, the layered
//! property engine, and the event engine with its pooled event objects
//! and strategy-driven dispatch.

mod events;
mod identity;
mod instance;
mod lifecycle;
mod properties;
mod runtime;

pub use events::{
    DEFAULT_PRIORITY, DirectDispatcher, EventDispatcher, EventKey, EventManager, EventObject,
    EventPool, EventTargetHandler, ListenerEntry, ListenerFn, Phase, RuntimeObjectHandler,
    listener_fn,
};
pub use identity::IdentityRegistry;
pub use instance::{Instance, PropertySlots};
pub use runtime::Runtime;
