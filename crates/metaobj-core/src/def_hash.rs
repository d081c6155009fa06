//! Deterministic hash-based definition identity.
//!
//! [`DefHash`] is a 64-bit hash uniquely identifying a class, mixin or
//! interface definition. Hashes are computed deterministically from
//! qualified names with per-domain mixing constants, so:
//!
//! - a class and a mixin sharing a name never collide,
//! - forward references can be hashed before registration,
//! - reverse indexes need a single map, not secondary name→id tables.
//!
//! # Examples
//!
//! ```
//! use metaobj_core::DefHash;
//!
//! let a = DefHash::class("ui.form.Button");
//! let b = DefHash::class("ui.form.Button");
//! assert_eq!(a, b); // deterministic
//!
//! let m = DefHash::mixin("ui.form.Button");
//! assert_ne!(a, m); // domain-separated
//! ```

use std::fmt;

use xxhash_rust::xxh64::xxh64;

use crate::QualifiedName;

/// Domain mixing constants keeping definition kinds hash-disjoint.
pub mod hash_domains {
    /// Domain marker for class definitions.
    pub const CLASS: u64 = 0x6f2c_9a41_d3b8_5e17;
    /// Domain marker for mixin definitions.
    pub const MIXIN: u64 = 0x1d84_f7c2_a95e_3b60;
    /// Domain marker for interface definitions.
    pub const INTERFACE: u64 = 0xb35a_08e9_47c1_d2f4;
    /// Domain marker for member identities.
    pub const MEMBER: u64 = 0x58e1_3c76_f0a9_4bd2;
    /// Domain marker for event type fingerprints.
    pub const EVENT: u64 = 0x92d7_6b04_eac5_183f;
}

/// 64-bit definition identity hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefHash(u64);

impl DefHash {
    /// Construct from a raw hash value.
    pub const fn from_raw(raw: u64) -> Self {
        DefHash(raw)
    }

    /// The raw 64-bit value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    fn from_name(domain: u64, name: &str) -> Self {
        DefHash(xxh64(name.as_bytes(), domain))
    }

    /// Hash of a class definition by qualified name string.
    pub fn class(name: &str) -> Self {
        Self::from_name(hash_domains::CLASS, name)
    }

    /// Hash of a mixin definition by qualified name string.
    pub fn mixin(name: &str) -> Self {
        Self::from_name(hash_domains::MIXIN, name)
    }

    /// Hash of an interface definition by qualified name string.
    pub fn interface(name: &str) -> Self {
        Self::from_name(hash_domains::INTERFACE, name)
    }

    /// Hash of a class definition by [`QualifiedName`].
    pub fn class_of(name: &QualifiedName) -> Self {
        Self::class(&name.to_string())
    }

    /// Hash of a mixin definition by [`QualifiedName`].
    pub fn mixin_of(name: &QualifiedName) -> Self {
        Self::mixin(&name.to_string())
    }

    /// Hash of an interface definition by [`QualifiedName`].
    pub fn interface_of(name: &QualifiedName) -> Self {
        Self::interface(&name.to_string())
    }

    /// 32-bit fingerprint of an event type name, used inside listener ids.
    pub fn event_fingerprint(event_type: &str) -> u32 {
        (xxh64(event_type.as_bytes(), hash_domains::EVENT) >> 32) as u32
    }
}

impl fmt::Display for DefHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(DefHash::class("a.B"), DefHash::class("a.B"));
    }

    #[test]
    fn domain_separated() {
        let name = "util.Droppable";
        let class = DefHash::class(name);
        let mixin = DefHash::mixin(name);
        let iface = DefHash::interface(name);
        assert_ne!(class, mixin);
        assert_ne!(class, iface);
        assert_ne!(mixin, iface);
    }

    #[test]
    fn qualified_name_agrees_with_string() {
        let qname = QualifiedName::from_dotted("ui.Button");
        assert_eq!(DefHash::class_of(&qname), DefHash::class("ui.Button"));
    }

    #[test]
    fn event_fingerprint_stable() {
        assert_eq!(
            DefHash::event_fingerprint("changeColor"),
            DefHash::event_fingerprint("changeColor")
        );
        assert_ne!(
            DefHash::event_fingerprint("changeColor"),
            DefHash::event_fingerprint("changeValue")
        );
    }
}
