//! Identity registry.
//!
//! Every live object holds a process-unique [`ObjectId`] token assigned
//! here. Storage is a slab indexed by the raw token with a free list for
//! recycling, so tokens stay dense and lookup is an array index.
//!
//! # Invariants
//!
//! - No two live objects share a token.
//! - A freed token may be reassigned to a later object; holders of stale
//!   tokens observe `None` (or a recycled object) rather than UB.

use metaobj_core::ObjectId;

use crate::instance::Instance;

/// Slab of live instances keyed by [`ObjectId`].
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    slots: Vec<Option<Instance>>,
    free: Vec<u32>,
    live: usize,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance, assigning a fresh or recycled token.
    pub fn register(&mut self, instance: Instance) -> ObjectId {
        self.live += 1;
        if let Some(raw) = self.free.pop() {
            self.slots[raw as usize] = Some(instance);
            return ObjectId::from_raw(raw);
        }
        let raw = self.slots.len() as u32;
        self.slots.push(Some(instance));
        ObjectId::from_raw(raw)
    }

    /// Remove an instance, freeing its token for recycling.
    pub fn unregister(&mut self, id: ObjectId) -> Option<Instance> {
        let slot = self.slots.get_mut(id.raw() as usize)?;
        let instance = slot.take()?;
        self.free.push(id.raw());
        self.live -= 1;
        Some(instance)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Instance> {
        self.slots.get(id.raw() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Instance> {
        self.slots.get_mut(id.raw() as usize)?.as_mut()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// The numeric hash code of a token.
    pub fn to_hash_code(&self, id: ObjectId) -> u32 {
        id.raw()
    }

    /// Resolve a hash code back to a live token.
    pub fn from_hash_code(&self, raw: u32) -> Option<ObjectId> {
        let id = ObjectId::from_raw(raw);
        self.contains(id).then_some(id)
    }

    /// Tokens of all live objects, ascending.
    pub fn live_ids(&self) -> Vec<ObjectId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(raw, slot)| slot.as_ref().map(|_| ObjectId::from_raw(raw as u32)))
            .collect()
    }

    /// Highest live token, if any. Shutdown disposes in descending
    /// token order.
    pub fn highest_live(&self) -> Option<ObjectId> {
        self.slots
            .iter()
            .rposition(Option::is_some)
            .map(|raw| ObjectId::from_raw(raw as u32))
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaobj_core::DefHash;

    fn instance() -> Instance {
        Instance::new(DefHash::class("t.A"))
    }

    #[test]
    fn tokens_unique_while_live() {
        let mut registry = IdentityRegistry::new();
        let a = registry.register(instance());
        let b = registry.register(instance());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn freed_tokens_are_recycled() {
        let mut registry = IdentityRegistry::new();
        let a = registry.register(instance());
        let _b = registry.register(instance());
        registry.unregister(a);
        assert!(!registry.contains(a));

        let c = registry.register(instance());
        assert_eq!(c, a);
        assert!(registry.contains(c));
    }

    #[test]
    fn hash_code_round_trip() {
        let mut registry = IdentityRegistry::new();
        let a = registry.register(instance());
        let code = registry.to_hash_code(a);
        assert_eq!(registry.from_hash_code(code), Some(a));

        registry.unregister(a);
        assert_eq!(registry.from_hash_code(code), None);
    }

    #[test]
    fn live_ids_ascending_and_highest() {
        let mut registry = IdentityRegistry::new();
        let a = registry.register(instance());
        let b = registry.register(instance());
        let c = registry.register(instance());
        registry.unregister(b);

        assert_eq!(registry.live_ids(), vec![a, c]);
        assert_eq!(registry.highest_live(), Some(c));
    }
}
