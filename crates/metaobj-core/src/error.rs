//! Unified error types for the metaobj runtime.
//!
//! This module provides a consistent error hierarchy for every phase of
//! the metaobject runtime: definition, composition, property access,
//! event dispatch and disposal.
//!
//! ## Error Hierarchy
//!
//! ```text
//! MetaError (top-level wrapper)
//! ├── ConfigError   - definition-time configuration errors
//! ├── ContractError - call-site contract violations
//! └── LookupError   - missing property/member/class/listener lookups
//! ```
//!
//! All errors are synchronous; the runtime has no transient-failure
//! surface and no retry convention. Every variant names the offending
//! class/property/mixin/interface and, where applicable, the value that
//! triggered the failure.

use thiserror::Error;

use crate::{ListenerId, ObjectId};

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors raised synchronously at definition time.
///
/// A configuration error is always fatal to the definition call that
/// raised it and is never deferred to instantiation (interface checks
/// against abstract ancestors being re-run at concrete-subclass
/// definition time, not deferred past it).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A referenced super class was not found.
    #[error("class '{class}': unknown super class '{extend}'")]
    UnknownSuperClass { class: String, extend: String },

    /// A referenced mixin was not found.
    #[error("class '{class}': unknown mixin '{mixin}'")]
    UnknownMixin { class: String, mixin: String },

    /// A referenced interface was not found.
    #[error("class '{class}': unknown interface '{interface}'")]
    UnknownInterface { class: String, interface: String },

    /// An instance-kind class was declared without a super class.
    #[error(
        "class '{class}': declares members, properties, mixins or interfaces \
         but no super class; extend the root object class"
    )]
    MissingExtend { class: String },

    /// A configuration key is not allowed for the declared class kind.
    #[error("class '{class}' ({kind}): configuration key '{key}' is not allowed")]
    DisallowedKey {
        class: String,
        kind: &'static str,
        key: &'static str,
    },

    /// A member/property/event name is already taken in the class.
    #[error("class '{class}': duplicate {what} '{name}' (already defined by '{origin}')")]
    Duplicate {
        class: String,
        what: &'static str,
        name: String,
        origin: String,
    },

    /// A mixin declaration collides with an existing one.
    #[error("class '{class}': mixin '{mixin}' {what} '{name}' conflicts with '{origin}'")]
    MixinConflict {
        class: String,
        mixin: String,
        what: &'static str,
        name: String,
        origin: String,
    },

    /// An event was redeclared with a different payload type.
    #[error(
        "class '{class}': event '{event}' redeclared with payload '{incoming}' \
         (was '{existing}')"
    )]
    EventPayloadConflict {
        class: String,
        event: String,
        existing: String,
        incoming: String,
    },

    /// A refine targets a property no ancestor declares.
    #[error("class '{class}': refine of unknown property '{property}'")]
    RefineUnknownProperty { class: String, property: String },

    /// A refine touches more than the inherited init value.
    #[error(
        "class '{class}': refine of property '{property}' may only override \
         the init value"
    )]
    RefineBeyondInit { class: String, property: String },

    /// A class does not satisfy an implemented interface.
    #[error(
        "class '{class}': interface '{interface}' requires {requirement} '{name}'"
    )]
    UnsatisfiedInterface {
        class: String,
        interface: String,
        requirement: &'static str,
        name: String,
    },

    /// A dotted name collides with a non-container definition.
    #[error("name '{name}': path component '{component}' is already a definition")]
    NamespaceCollision { name: String, component: String },

    /// A property group references a property that does not exist.
    #[error("class '{class}': group '{group}' references unknown property '{member}'")]
    UnknownGroupMember {
        class: String,
        group: String,
        member: String,
    },

    /// A themeable property group contains a non-themeable member.
    #[error(
        "class '{class}': themeable group '{group}' contains non-themeable \
         property '{member}'"
    )]
    GroupMemberNotThemeable {
        class: String,
        group: String,
        member: String,
    },

    /// The declaration is malformed in some other way.
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),
}

// ============================================================================
// Contract Violations
// ============================================================================

/// Errors raised synchronously at the call site for contract violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    /// Direct instantiation of an abstract class.
    #[error("class '{class}' is abstract and cannot be instantiated directly")]
    InstantiateAbstract { class: String },

    /// Instantiation of a static (namespace) class.
    #[error("class '{class}' is static and cannot be instantiated")]
    InstantiateStatic { class: String },

    /// Singleton construction outside the guarded factory.
    #[error("class '{class}' is a singleton; use get_instance()")]
    SingletonConstructor { class: String },

    /// An init accessor was invoked after construction completed.
    #[error("property '{property}' of class '{class}': init after construction")]
    InitAfterConstruct { class: String, property: String },

    /// A non-nullable property was set to null.
    #[error("property '{property}' of class '{class}' is not nullable")]
    NotNullable { class: String, property: String },

    /// A declared type/shape check rejected the value.
    #[error("property '{property}': check expected {expected}, got {value}")]
    CheckFailed {
        property: String,
        expected: String,
        value: String,
    },

    /// A declared validate member rejected the value.
    #[error("property '{property}': validation rejected value {value}")]
    ValidateFailed { property: String, value: String },

    /// A non-nullable, non-inheritable property was read before any value
    /// became authoritative.
    #[error("property '{property}' of class '{class}' is not ready")]
    PropertyNotReady { class: String, property: String },

    /// An event type not declared on the target's class was fired
    /// (debug-only check).
    #[error("class '{class}': event '{event}' is not declared")]
    UndeclaredEvent { class: String, event: String },

    /// Access through a token whose object was disposed or never existed.
    #[error("object {object} is disposed or was never registered")]
    Disposed { object: ObjectId },
}

// ============================================================================
// Lookup Errors
// ============================================================================

/// Errors raised when a name or id fails to resolve.
///
/// Callers expecting uncertainty should probe via the corresponding
/// `has_*`/`contains_*` query first.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    /// No class registered under this name.
    #[error("no such class: '{0}'")]
    NoSuchClass(String),

    /// No property with this name in the class's flattened property table.
    #[error("class '{class}': no such property '{property}'")]
    NoSuchProperty { class: String, property: String },

    /// The property exists but does not generate this accessor variant.
    #[error("property '{property}' does not generate accessor '{accessor}'")]
    NoSuchAccessor { property: String, accessor: String },

    /// No member with this name in the class's flattened member table.
    #[error("class '{class}': no such member '{member}'")]
    NoSuchMember { class: String, member: String },

    /// No static member with this name on the class.
    #[error("class '{class}': no such static '{member}'")]
    NoSuchStatic { class: String, member: String },

    /// A base (super) call was made from a member with no overridden
    /// implementation.
    #[error("member '{member}' has no base implementation")]
    NoBaseMember { member: String },

    /// No registered dispatcher strategy accepted the event.
    #[error("undeliverable event '{event_type}' on {target}")]
    UndeliverableEvent {
        event_type: String,
        target: ObjectId,
    },

    /// No registered handler strategy accepted the (target, type) pair.
    #[error("no event handler accepts '{event_type}' on {target}")]
    NoEventHandler {
        event_type: String,
        target: ObjectId,
    },

    /// A listener id did not resolve to a live registration.
    #[error("unknown listener id {0}")]
    UnknownListener(ListenerId),
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error wrapper for unified handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl MetaError {
    /// Check if this is a definition-time configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, MetaError::Config(_))
    }

    /// Check if this is a call-site contract violation.
    pub fn is_contract(&self) -> bool {
        matches!(self, MetaError::Contract(_))
    }

    /// Check if this is a lookup failure.
    pub fn is_lookup(&self) -> bool {
        matches!(self, MetaError::Lookup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message_names_offender() {
        let err = ConfigError::Duplicate {
            class: "ui.Button".into(),
            what: "property",
            name: "label".into(),
            origin: "ui.Widget".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ui.Button"));
        assert!(msg.contains("label"));
        assert!(msg.contains("ui.Widget"));
    }

    #[test]
    fn contract_error_carries_value() {
        let err = ContractError::CheckFailed {
            property: "radius".into(),
            expected: "number".into(),
            value: "\"five\"".into(),
        };
        assert!(err.to_string().contains("\"five\""));
    }

    #[test]
    fn meta_error_classification() {
        let e: MetaError = ConfigError::InvalidDeclaration("x".into()).into();
        assert!(e.is_config());
        assert!(!e.is_contract());

        let e: MetaError = LookupError::NoSuchClass("a.B".into()).into();
        assert!(e.is_lookup());
    }

    #[test]
    fn undeliverable_event_message() {
        let err = LookupError::UndeliverableEvent {
            event_type: "execute".into(),
            target: ObjectId::from_raw(7),
        };
        assert!(err.to_string().contains("obj#7"));
        assert!(err.to_string().contains("execute"));
    }
}
