//! Shared member and event entry types.

use std::fmt;
use std::rc::Rc;

use crate::{DefHash, MemberFn, StaticFn, Value};

/// Payload of an instance member.
#[derive(Clone)]
pub enum MemberKind {
    /// A native method.
    Method(MemberFn),
    /// A constant data member.
    Constant(Value),
}

impl fmt::Debug for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method(_) => write!(f, "Method(..)"),
            MemberKind::Constant(v) => write!(f, "Constant({v})"),
        }
    }
}

/// An instance member record.
///
/// Every member carries its defining class/mixin and, when it overrides
/// an inherited implementation, a `base` back-reference resolved once at
/// composition time and reused by every explicit super-call.
#[derive(Clone)]
pub struct MemberEntry {
    /// Member name.
    pub name: String,
    /// Method or constant payload.
    pub kind: MemberKind,
    /// Hash of the class or mixin that defined this implementation.
    pub defining: DefHash,
    /// Display name of the definer, for conflict diagnostics.
    pub origin: String,
    /// The implementation this one overrides, if any.
    pub base: Option<Rc<MemberEntry>>,
}

impl MemberEntry {
    pub fn method(
        name: impl Into<String>,
        f: MemberFn,
        defining: DefHash,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method(f),
            defining,
            origin: origin.into(),
            base: None,
        }
    }

    pub fn constant(
        name: impl Into<String>,
        value: Value,
        defining: DefHash,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Constant(value),
            defining,
            origin: origin.into(),
            base: None,
        }
    }

    /// Link this member over the implementation it overrides.
    pub fn with_base(mut self, base: Rc<MemberEntry>) -> Self {
        self.base = Some(base);
        self
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method(_))
    }
}

impl fmt::Debug for MemberEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .field("has_base", &self.base.is_some())
            .finish()
    }
}

/// A static member of a class: a value or a free function.
///
/// Statics are not instance-bound and are not inherited.
#[derive(Clone)]
pub enum StaticMember {
    Value(Value),
    Fn(StaticFn),
}

impl fmt::Debug for StaticMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticMember::Value(v) => write!(f, "Value({v})"),
            StaticMember::Fn(_) => write!(f, "Fn(..)"),
        }
    }
}

/// A declared event: name plus the payload type it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    /// Event type name (`execute`, `changeColor`, ...).
    pub name: String,
    /// Payload type name (`Event`, `Data`, ...).
    pub payload: String,
    /// Hash of the class or mixin that declared the event.
    pub defining: DefHash,
    /// Display name of the declarer, for conflict diagnostics.
    pub origin: String,
}

impl EventEntry {
    pub fn new(
        name: impl Into<String>,
        payload: impl Into<String>,
        defining: DefHash,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
            defining,
            origin: origin.into(),
        }
    }
}
