//! Event engine: pooled event objects, listener tables and
//! strategy-driven registration/delivery.

mod dispatch;
mod event;
mod manager;

pub use dispatch::{
    DEFAULT_PRIORITY, DirectDispatcher, EventDispatcher, EventTargetHandler, RuntimeObjectHandler,
};
pub use event::{EventObject, EventPool, Phase};
pub use manager::{EventKey, EventManager, ListenerEntry, ListenerFn, listener_fn};
