//! Event objects and the event pool.
//!
//! Event objects are mutable envelopes handed to every listener of one
//! dispatch. They are pooled: after dispatch the manager resets and
//! returns them to a bounded free list, so steady-state firing allocates
//! nothing. Listeners that need to keep an event past the dispatch call
//! [`EventObject::clone_event`] for an independent copy.

use std::time::{SystemTime, UNIX_EPOCH};

use metaobj_core::{ObjectId, Value};

/// Dispatch phase of an event.
///
/// Delivery is direct (no tree walk); capture-phase registrations are
/// kept in separate buckets but only bubble-phase listeners are invoked
/// by the built-in dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    Capture,
    #[default]
    Bubble,
}

/// A dispatched event.
#[derive(Debug, Clone, Default)]
pub struct EventObject {
    pub event_type: String,
    pub target: Option<ObjectId>,
    pub related_target: Option<ObjectId>,
    pub current_target: Option<ObjectId>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    pub timestamp: u64,
    pub phase: Phase,
    /// Payload of data events.
    pub data: Option<Value>,
    /// Prior value carried by change events.
    pub old_data: Option<Value>,
}

impl EventObject {
    /// (Re-)initialize for dispatch. Clears any state left from a
    /// previous pooled use.
    pub fn init(
        &mut self,
        event_type: impl Into<String>,
        target: ObjectId,
        bubbles: bool,
        cancelable: bool,
    ) {
        self.reset();
        self.event_type = event_type.into();
        self.target = Some(target);
        self.current_target = Some(target);
        self.bubbles = bubbles;
        self.cancelable = cancelable;
        self.timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
    }

    /// Prevent the default action, if the event is cancelable.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop delivery to the remaining listeners of this dispatch.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Independent copy, safe to keep after the original returns to
    /// the pool.
    pub fn clone_event(&self) -> EventObject {
        self.clone()
    }

    /// Zero all fields (pool release path).
    pub fn reset(&mut self) {
        *self = EventObject::default();
    }
}

/// Bounded free list of event objects.
#[derive(Default)]
pub struct EventPool {
    free: Vec<Box<EventObject>>,
}

/// Pool retention cap; releases beyond it are dropped.
const POOL_CAP: usize = 32;

impl EventPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse a pooled event or allocate a fresh one.
    pub fn acquire(&mut self) -> Box<EventObject> {
        self.free.pop().unwrap_or_default()
    }

    /// Reset an event and return it to the pool (dropped when full).
    pub fn release(&mut self, mut event: Box<EventObject>) {
        if self.free.len() < POOL_CAP {
            event.reset();
            self.free.push(event);
        }
    }

    pub fn pooled(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prevent_default_respects_cancelable() {
        let mut event = EventObject::default();
        event.init("execute", ObjectId::from_raw(1), true, false);
        event.prevent_default();
        assert!(!event.is_default_prevented());

        event.init("execute", ObjectId::from_raw(1), true, true);
        event.prevent_default();
        assert!(event.is_default_prevented());
    }

    #[test]
    fn init_clears_previous_state() {
        let mut event = EventObject::default();
        event.init("a", ObjectId::from_raw(1), true, true);
        event.prevent_default();
        event.stop_propagation();
        event.data = Some(Value::Int(7));

        event.init("b", ObjectId::from_raw(2), false, true);
        assert_eq!(event.event_type, "b");
        assert!(!event.is_default_prevented());
        assert!(!event.is_propagation_stopped());
        assert!(event.data.is_none());
    }

    #[test]
    fn clone_is_independent_of_pool_reuse() {
        let mut pool = EventPool::new();
        let mut event = pool.acquire();
        event.init("changeColor", ObjectId::from_raw(3), false, false);
        event.data = Some(Value::str("blue"));

        let kept = event.clone_event();
        pool.release(event);

        let mut reused = pool.acquire();
        reused.init("other", ObjectId::from_raw(4), false, false);

        assert_eq!(kept.event_type, "changeColor");
        assert_eq!(kept.data, Some(Value::str("blue")));
        assert_eq!(reused.event_type, "other");
    }

    #[test]
    fn pool_is_bounded() {
        let mut pool = EventPool::new();
        let events: Vec<_> = (0..40).map(|_| pool.acquire()).collect();
        for event in events {
            pool.release(event);
        }
        assert_eq!(pool.pooled(), POOL_CAP);
    }
}
