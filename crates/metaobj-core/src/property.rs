//! Property declarations, flags and accessor naming.
//!
//! A [`PropertyDecl`] attached to a class drives the property engine:
//! the declared flags decide which accessor variants exist, which value
//! layers the property can hold, and which observers fire on change.

use bitflags::bitflags;

use crate::{CheckKind, Value};

bitflags! {
    /// Behavioral flags of a property declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PropertyFlags: u8 {
        /// Value propagates down the layout-parent relation.
        const INHERITABLE = 1 << 0;
        /// Property accepts themed (skinning-origin) values.
        const THEMEABLE = 1 << 1;
        /// Null is a legitimate value.
        const NULLABLE = 1 << 2;
        /// Declaration narrows an ancestor declaration's init value only.
        const REFINE = 1 << 3;
        /// Stored layer values are cleared at dispose to break cycles.
        const DEREFERENCE = 1 << 4;
    }
}

/// Accessor variants a property can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Get,
    Set,
    Reset,
    Init,
    Refresh,
    SetRuntime,
    ResetRuntime,
    SetThemed,
    ResetThemed,
    Is,
    Toggle,
}

impl AccessorKind {
    /// Accessor name prefix (`get_`, `set_themed_`, ...).
    pub fn prefix(self) -> &'static str {
        match self {
            AccessorKind::Get => "get_",
            AccessorKind::Set => "set_",
            AccessorKind::Reset => "reset_",
            AccessorKind::Init => "init_",
            AccessorKind::Refresh => "refresh_",
            AccessorKind::SetRuntime => "set_runtime_",
            AccessorKind::ResetRuntime => "reset_runtime_",
            AccessorKind::SetThemed => "set_themed_",
            AccessorKind::ResetThemed => "reset_themed_",
            AccessorKind::Is => "is_",
            AccessorKind::Toggle => "toggle_",
        }
    }

    /// Compose the accessor name for a property.
    pub fn accessor_name(self, property: &str) -> String {
        format!("{}{}", self.prefix(), property)
    }
}

/// Declarative definition of a layered, observable instance field.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    /// Property name (`color`, `enabled`, ...).
    pub name: String,
    /// Declared type/shape constraint.
    pub check: Option<CheckKind>,
    /// Class default (the `init` layer's base value).
    pub init: Option<Value>,
    /// Member name invoked as `apply(new, old, name)` after a resolved change.
    pub apply: Option<String>,
    /// Event type fired after a resolved change (payload: new, old).
    pub event: Option<String>,
    /// Member name transforming incoming values before validation.
    pub transform: Option<String>,
    /// Member name validating incoming values (truthy result accepts).
    pub validate: Option<String>,
    /// Behavioral flags.
    pub flags: PropertyFlags,
}

impl PropertyDecl {
    /// Create a plain declaration with no flags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            check: None,
            init: None,
            apply: None,
            event: None,
            transform: None,
            validate: None,
            flags: PropertyFlags::empty(),
        }
    }

    // === Builder Methods ===

    pub fn with_check(mut self, check: CheckKind) -> Self {
        self.check = Some(check);
        self
    }

    pub fn with_init(mut self, init: impl Into<Value>) -> Self {
        self.init = Some(init.into());
        self
    }

    pub fn with_apply(mut self, member: impl Into<String>) -> Self {
        self.apply = Some(member.into());
        self
    }

    pub fn with_event(mut self, event_type: impl Into<String>) -> Self {
        self.event = Some(event_type.into());
        self
    }

    pub fn with_transform(mut self, member: impl Into<String>) -> Self {
        self.transform = Some(member.into());
        self
    }

    pub fn with_validate(mut self, member: impl Into<String>) -> Self {
        self.validate = Some(member.into());
        self
    }

    pub fn inheritable(mut self) -> Self {
        self.flags |= PropertyFlags::INHERITABLE;
        self
    }

    pub fn themeable(mut self) -> Self {
        self.flags |= PropertyFlags::THEMEABLE;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.flags |= PropertyFlags::NULLABLE;
        self
    }

    pub fn refine(mut self) -> Self {
        self.flags |= PropertyFlags::REFINE;
        self
    }

    pub fn dereference(mut self) -> Self {
        self.flags |= PropertyFlags::DEREFERENCE;
        self
    }

    // === Query Methods ===

    pub fn is_inheritable(&self) -> bool {
        self.flags.contains(PropertyFlags::INHERITABLE)
    }

    pub fn is_themeable(&self) -> bool {
        self.flags.contains(PropertyFlags::THEMEABLE)
    }

    pub fn is_nullable(&self) -> bool {
        self.flags.contains(PropertyFlags::NULLABLE)
    }

    pub fn is_refine(&self) -> bool {
        self.flags.contains(PropertyFlags::REFINE)
    }

    pub fn is_dereference(&self) -> bool {
        self.flags.contains(PropertyFlags::DEREFERENCE)
    }

    /// Boolean-checked properties generate `is`/`toggle` accessors.
    pub fn is_boolean(&self) -> bool {
        self.check.as_ref().is_some_and(|c| c.is_boolean())
    }

    /// A refine may only carry an init value; anything else is rejected
    /// at composition time.
    pub fn refine_touches_only_init(&self) -> bool {
        self.check.is_none()
            && self.apply.is_none()
            && self.event.is_none()
            && self.transform.is_none()
            && self.validate.is_none()
            && self.flags == PropertyFlags::REFINE
    }

    /// The accessor variants this declaration generates.
    pub fn accessor_kinds(&self) -> Vec<AccessorKind> {
        let mut kinds = vec![
            AccessorKind::Get,
            AccessorKind::Set,
            AccessorKind::Reset,
            AccessorKind::Init,
            AccessorKind::SetRuntime,
            AccessorKind::ResetRuntime,
        ];
        if self.is_themeable() {
            kinds.push(AccessorKind::SetThemed);
            kinds.push(AccessorKind::ResetThemed);
        }
        if self.is_inheritable() {
            kinds.push(AccessorKind::Refresh);
        }
        if self.is_boolean() {
            kinds.push(AccessorKind::Is);
            kinds.push(AccessorKind::Toggle);
        }
        kinds
    }

    /// Generated accessor names, used for interface satisfaction and the
    /// generic string-dispatch surface.
    pub fn accessor_names(&self) -> Vec<(String, AccessorKind)> {
        self.accessor_kinds()
            .into_iter()
            .map(|kind| (kind.accessor_name(&self.name), kind))
            .collect()
    }
}

/// A named alias fanning out to several underlying properties.
///
/// A shorthand group expands 1/2/3/4 values CSS-style over exactly four
/// member properties; a plain group applies positionally or broadcasts a
/// single value.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGroup {
    pub name: String,
    /// Member property names, in fan-out order.
    pub members: Vec<String>,
    /// CSS-shorthand expansion (requires exactly four members).
    pub shorthand: bool,
    /// Group generates themed setter/resetter variants. Requires every
    /// member to be themeable.
    pub themeable: bool,
}

impl PropertyGroup {
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
            shorthand: false,
            themeable: false,
        }
    }

    pub fn shorthand(mut self) -> Self {
        self.shorthand = true;
        self
    }

    pub fn themeable(mut self) -> Self {
        self.themeable = true;
        self
    }

    /// Expand shorthand values over the four members
    /// (top/right/bottom/left convention).
    pub fn expand_shorthand(values: &[Value]) -> Vec<Value> {
        match values {
            [a] => vec![a.clone(), a.clone(), a.clone(), a.clone()],
            [a, b] => vec![a.clone(), b.clone(), a.clone(), b.clone()],
            [a, b, c] => vec![a.clone(), b.clone(), c.clone(), b.clone()],
            _ => values.to_vec(),
        }
    }
}
