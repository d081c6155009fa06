//! Event handler and dispatcher strategies.
//!
//! Registration and delivery are both strategy-driven: an
//! [`EventTargetHandler`] decides whether it is responsible for a
//! (target, event type) registration and observes bucket lifecycle; an
//! [`EventDispatcher`] decides whether it can deliver a concrete event
//! and performs the delivery over a snapshot of the listener bucket.
//! Strategies are probed in ascending priority order.

use metaobj_core::{CallContext, MetaError, ObjectId, ObjectOps};

use super::event::EventObject;
use super::manager::ListenerEntry;

/// Default strategy priority; lower probes first.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Strategy deciding responsibility for listener registration.
pub trait EventTargetHandler {
    /// Probe order; ascending, lowest first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Whether this handler is responsible for (target, event type)
    /// registrations.
    fn can_handle_event(&self, target: ObjectId, event_type: &str) -> bool;

    /// Called when the first listener of a bucket is added.
    fn register_event(&self, _target: ObjectId, _event_type: &str) {}

    /// Called when the last listener of a bucket is removed.
    fn unregister_event(&self, _target: ObjectId, _event_type: &str) {}
}

/// Strategy performing event delivery.
pub trait EventDispatcher {
    /// Probe order; ascending, lowest first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Whether this dispatcher can deliver the event to the target.
    fn can_dispatch(&self, target: ObjectId, event: &EventObject) -> bool;

    /// Deliver the event to a snapshot of the listener bucket.
    ///
    /// The snapshot is taken before delivery starts; listener removal
    /// during dispatch affects only the live bucket.
    fn dispatch(
        &self,
        ops: &mut dyn ObjectOps,
        target: ObjectId,
        snapshot: &[ListenerEntry],
        event: &mut EventObject,
    ) -> Result<(), MetaError>;
}

/// Built-in handler accepting every runtime object.
///
/// Registration bookkeeping needs no side effects for plain runtime
/// objects, so register/unregister keep their no-op defaults.
pub struct RuntimeObjectHandler;

impl EventTargetHandler for RuntimeObjectHandler {
    fn can_handle_event(&self, _target: ObjectId, _event_type: &str) -> bool {
        true
    }
}

/// Built-in dispatcher invoking bubble-phase listeners on the target
/// only, in registration order.
pub struct DirectDispatcher;

impl EventDispatcher for DirectDispatcher {
    fn can_dispatch(&self, _target: ObjectId, _event: &EventObject) -> bool {
        true
    }

    fn dispatch(
        &self,
        ops: &mut dyn ObjectOps,
        target: ObjectId,
        snapshot: &[ListenerEntry],
        event: &mut EventObject,
    ) -> Result<(), MetaError> {
        for entry in snapshot {
            if event.is_propagation_stopped() {
                break;
            }
            // The context object only rebinds `this` for the callback;
            // the event keeps reporting the dispatch target.
            event.current_target = Some(target);
            let handler = entry.handler.clone();
            let mut ctx = CallContext::new(&mut *ops, entry.context.unwrap_or(target));
            handler(&mut ctx, event)?;
        }
        Ok(())
    }
}
