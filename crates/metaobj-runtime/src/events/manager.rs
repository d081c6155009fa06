//! Listener tables and the event manager.
//!
//! One manager per runtime. Listeners are bucketed per target and per
//! `(event type, phase)` key, in registration order. The manager owns
//! the strategy lists and the event pool; delivery itself is driven by
//! the runtime, which snapshots a bucket here and hands it to the
//! first accepting dispatcher.
//!
//! # Storage Model
//!
//! - `listeners`: target → (type, phase) → ordered listener entries.
//! - `by_id`: listener id → (target, key), for O(1) removal by id.
//! - `handlers`/`dispatchers`: strategy lists, ascending priority.
//! - `pool`: bounded event free list.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use metaobj_core::{CallContext, DefHash, ListenerId, LookupError, MetaError, ObjectId};

use super::dispatch::{
    DirectDispatcher, EventDispatcher, EventTargetHandler, RuntimeObjectHandler,
};
use super::event::{EventObject, EventPool, Phase};

/// Native listener callback.
pub type ListenerFn =
    Rc<dyn Fn(&mut CallContext<'_>, &mut EventObject) -> Result<(), MetaError>>;

/// Helper wrapping a closure into a [`ListenerFn`].
pub fn listener_fn<F>(f: F) -> ListenerFn
where
    F: Fn(&mut CallContext<'_>, &mut EventObject) -> Result<(), MetaError> + 'static,
{
    Rc::new(f)
}

/// Bucket key: event type plus phase.
pub type EventKey = (String, Phase);

/// One registered listener.
#[derive(Clone)]
pub struct ListenerEntry {
    pub id: ListenerId,
    pub handler: ListenerFn,
    /// Execution context object; the target when absent.
    pub context: Option<ObjectId>,
}

/// Per-runtime listener registry and strategy host.
pub struct EventManager {
    listeners: FxHashMap<ObjectId, FxHashMap<EventKey, Vec<ListenerEntry>>>,
    by_id: FxHashMap<ListenerId, (ObjectId, EventKey)>,
    handlers: Vec<Rc<dyn EventTargetHandler>>,
    dispatchers: Vec<Rc<dyn EventDispatcher>>,
    pool: EventPool,
    seq: u32,
}

impl Default for EventManager {
    fn default() -> Self {
        let mut manager = Self {
            listeners: FxHashMap::default(),
            by_id: FxHashMap::default(),
            handlers: Vec::new(),
            dispatchers: Vec::new(),
            pool: EventPool::new(),
            seq: 0,
        };
        manager.register_handler(Rc::new(RuntimeObjectHandler));
        manager.register_dispatcher(Rc::new(DirectDispatcher));
        manager
    }
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Strategy Registration
    // ==========================================================================

    pub fn register_handler(&mut self, handler: Rc<dyn EventTargetHandler>) {
        self.handlers.push(handler);
        self.handlers.sort_by_key(|h| h.priority());
    }

    pub fn register_dispatcher(&mut self, dispatcher: Rc<dyn EventDispatcher>) {
        self.dispatchers.push(dispatcher);
        self.dispatchers.sort_by_key(|d| d.priority());
    }

    /// First dispatcher accepting the event, ascending priority.
    pub fn find_dispatcher(
        &self,
        target: ObjectId,
        event: &EventObject,
    ) -> Option<Rc<dyn EventDispatcher>> {
        self.dispatchers
            .iter()
            .find(|d| d.can_dispatch(target, event))
            .cloned()
    }

    fn find_handler(
        &self,
        target: ObjectId,
        event_type: &str,
    ) -> Option<Rc<dyn EventTargetHandler>> {
        self.handlers
            .iter()
            .find(|h| h.can_handle_event(target, event_type))
            .cloned()
    }

    // ==========================================================================
    // Listener Registration
    // ==========================================================================

    /// Register a listener. The first listener of a bucket notifies the
    /// responsible handler's `register_event`.
    pub fn add_listener(
        &mut self,
        target: ObjectId,
        event_type: &str,
        handler: ListenerFn,
        context: Option<ObjectId>,
        capture: bool,
    ) -> Result<ListenerId, MetaError> {
        let responsible =
            self.find_handler(target, event_type)
                .ok_or_else(|| LookupError::NoEventHandler {
                    event_type: event_type.to_string(),
                    target,
                })?;

        let phase = if capture { Phase::Capture } else { Phase::Bubble };
        let key: EventKey = (event_type.to_string(), phase);

        let bucket = self
            .listeners
            .entry(target)
            .or_default()
            .entry(key.clone())
            .or_default();
        if bucket.is_empty() {
            responsible.register_event(target, event_type);
        }

        self.seq = self.seq.wrapping_add(1);
        let id = ListenerId::pack(DefHash::event_fingerprint(event_type), capture, self.seq);
        bucket.push(ListenerEntry {
            id,
            handler,
            context,
        });
        self.by_id.insert(id, (target, key));
        Ok(id)
    }

    /// Remove a listener by id. Emptying a bucket notifies
    /// `unregister_event`.
    pub fn remove_listener(&mut self, id: ListenerId) -> Result<(), MetaError> {
        let (target, key) = self
            .by_id
            .remove(&id)
            .ok_or(LookupError::UnknownListener(id))?;

        let mut emptied = false;
        if let Some(buckets) = self.listeners.get_mut(&target) {
            if let Some(bucket) = buckets.get_mut(&key) {
                bucket.retain(|entry| entry.id != id);
                if bucket.is_empty() {
                    buckets.remove(&key);
                    emptied = true;
                }
            }
            if buckets.is_empty() {
                self.listeners.remove(&target);
            }
        }

        if emptied {
            if let Some(handler) = self.find_handler(target, &key.0) {
                handler.unregister_event(target, &key.0);
            }
        }
        Ok(())
    }

    /// Remove every listener of a target (object teardown path).
    pub fn remove_all_listeners(&mut self, target: ObjectId) {
        let Some(buckets) = self.listeners.remove(&target) else {
            return;
        };
        for (key, bucket) in buckets {
            for entry in &bucket {
                self.by_id.remove(&entry.id);
            }
            if let Some(handler) = self.find_handler(target, &key.0) {
                handler.unregister_event(target, &key.0);
            }
        }
    }

    /// Drop a target's listeners without unregister notifications
    /// (global shutdown fast path).
    pub fn discard_listeners(&mut self, target: ObjectId) {
        if let Some(buckets) = self.listeners.remove(&target) {
            for bucket in buckets.values() {
                for entry in bucket {
                    self.by_id.remove(&entry.id);
                }
            }
        }
    }

    pub fn has_listener(&self, target: ObjectId, event_type: &str, capture: bool) -> bool {
        let phase = if capture { Phase::Capture } else { Phase::Bubble };
        self.listeners
            .get(&target)
            .and_then(|buckets| buckets.get(&(event_type.to_string(), phase)))
            .is_some_and(|bucket| !bucket.is_empty())
    }

    /// Whether the target has listeners for a type in either phase.
    pub fn has_any_listener(&self, target: ObjectId, event_type: &str) -> bool {
        self.has_listener(target, event_type, false)
            || self.has_listener(target, event_type, true)
    }

    /// Snapshot of a bucket, in registration order. Removal during
    /// dispatch affects only the live bucket.
    pub fn snapshot(&self, target: ObjectId, event_type: &str, phase: Phase) -> Vec<ListenerEntry> {
        self.listeners
            .get(&target)
            .and_then(|buckets| buckets.get(&(event_type.to_string(), phase)))
            .cloned()
            .unwrap_or_default()
    }

    // ==========================================================================
    // Event Pool
    // ==========================================================================

    pub fn acquire_event(&mut self) -> Box<EventObject> {
        self.pool.acquire()
    }

    pub fn release_event(&mut self, event: Box<EventObject>) {
        self.pool.release(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn noop() -> ListenerFn {
        listener_fn(|_, _| Ok(()))
    }

    #[test]
    fn add_and_remove_round_trip() {
        let mut manager = EventManager::new();
        let target = ObjectId::from_raw(1);

        let id = manager
            .add_listener(target, "execute", noop(), None, false)
            .unwrap();
        assert!(manager.has_listener(target, "execute", false));
        assert!(!manager.has_listener(target, "execute", true));

        manager.remove_listener(id).unwrap();
        assert!(!manager.has_listener(target, "execute", false));

        let err = manager.remove_listener(id).unwrap_err();
        assert!(matches!(
            err,
            MetaError::Lookup(LookupError::UnknownListener(_))
        ));
    }

    #[test]
    fn listener_id_encodes_type_and_phase() {
        let mut manager = EventManager::new();
        let target = ObjectId::from_raw(1);
        let id = manager
            .add_listener(target, "changeColor", noop(), None, true)
            .unwrap();
        assert!(id.is_capture());
        assert_eq!(
            id.type_fingerprint(),
            DefHash::event_fingerprint("changeColor") & 0x7fff_ffff
        );
    }

    #[test]
    fn snapshot_preserves_registration_order() {
        let mut manager = EventManager::new();
        let target = ObjectId::from_raw(2);
        let a = manager
            .add_listener(target, "execute", noop(), None, false)
            .unwrap();
        let b = manager
            .add_listener(target, "execute", noop(), None, false)
            .unwrap();

        let snapshot = manager.snapshot(target, "execute", Phase::Bubble);
        assert_eq!(
            snapshot.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![a, b]
        );
    }

    #[test]
    fn remove_all_listeners_clears_ids() {
        let mut manager = EventManager::new();
        let target = ObjectId::from_raw(3);
        let id = manager
            .add_listener(target, "execute", noop(), None, false)
            .unwrap();
        manager
            .add_listener(target, "changeValue", noop(), None, false)
            .unwrap();

        manager.remove_all_listeners(target);
        assert!(!manager.has_any_listener(target, "execute"));
        assert!(manager.remove_listener(id).is_err());
    }

    #[test]
    fn bucket_lifecycle_notifies_handler() {
        struct CountingHandler {
            registered: RefCell<Vec<String>>,
            unregistered: RefCell<Vec<String>>,
        }
        impl EventTargetHandler for CountingHandler {
            fn priority(&self) -> i32 {
                0 // probe before the built-in
            }
            fn can_handle_event(&self, _target: ObjectId, _event_type: &str) -> bool {
                true
            }
            fn register_event(&self, _target: ObjectId, event_type: &str) {
                self.registered.borrow_mut().push(event_type.to_string());
            }
            fn unregister_event(&self, _target: ObjectId, event_type: &str) {
                self.unregistered.borrow_mut().push(event_type.to_string());
            }
        }

        let counting = Rc::new(CountingHandler {
            registered: RefCell::new(Vec::new()),
            unregistered: RefCell::new(Vec::new()),
        });
        let mut manager = EventManager::new();
        manager.register_handler(counting.clone());

        let target = ObjectId::from_raw(4);
        let a = manager
            .add_listener(target, "execute", noop(), None, false)
            .unwrap();
        let b = manager
            .add_listener(target, "execute", noop(), None, false)
            .unwrap();
        // Only the first listener of the bucket registers.
        assert_eq!(counting.registered.borrow().as_slice(), ["execute"]);

        manager.remove_listener(a).unwrap();
        assert!(counting.unregistered.borrow().is_empty());
        manager.remove_listener(b).unwrap();
        assert_eq!(counting.unregistered.borrow().as_slice(), ["execute"]);
    }

    #[test]
    fn pool_round_trip_through_manager() {
        let mut manager = EventManager::new();
        let mut event = manager.acquire_event();
        event.init("execute", ObjectId::from_raw(1), false, false);
        manager.release_event(event);

        let reused = manager.acquire_event();
        assert!(reused.event_type.is_empty());
    }
}
