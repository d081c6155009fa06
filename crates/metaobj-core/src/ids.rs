//! Identity tokens.
//!
//! [`ObjectId`] is the process-unique token assigned to every registered
//! object instance. Freed tokens are recycled by the identity registry;
//! two live objects never share a token. [`ListenerId`] is the opaque id
//! returned by listener registration, packing the event-type fingerprint,
//! the phase bit and a process-unique sequence number.

use std::fmt;

/// Identity token for a registered object instance.
///
/// Used anywhere an object must be referenced without holding a direct
/// reference: listener bucket keys, property parent links, event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Construct from a raw token.
    pub const fn from_raw(raw: u32) -> Self {
        ObjectId(raw)
    }

    /// The raw token value ("hash code").
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Opaque listener registration id.
///
/// Bit layout: `[type fingerprint: 31][capture: 1][sequence: 32]`.
/// The fingerprint lets removal-by-id validate the bucket without a
/// string compare; the sequence keeps ids process-unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Pack an id from an event-type fingerprint, phase and sequence number.
    pub fn pack(type_fingerprint: u32, capture: bool, seq: u32) -> Self {
        let fp = (type_fingerprint as u64 & 0x7fff_ffff) << 33;
        let phase = (capture as u64) << 32;
        ListenerId(fp | phase | seq as u64)
    }

    /// The event-type fingerprint this id was registered under.
    pub fn type_fingerprint(self) -> u32 {
        ((self.0 >> 33) & 0x7fff_ffff) as u32
    }

    /// Whether the listener was registered for the capture phase.
    pub fn is_capture(self) -> bool {
        (self.0 >> 32) & 1 == 1
    }

    /// Process-unique sequence number.
    pub fn seq(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.seq())
    }
}
