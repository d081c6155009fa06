//! Core types for the metaobj runtime.
//!
//! This crate is the leaf of the workspace: the dynamic [`Value`] model,
//! dotted [`QualifiedName`]s, hash-based definition identity
//! ([`DefHash`]), identity tokens, property declarations, definition
//! entries, the native-callback seam ([`ObjectOps`]/[`CallContext`]) and
//! the unified error taxonomy.

mod check;
mod def_hash;
pub mod entries;
mod environment;
mod error;
mod ids;
mod native_fn;
mod property;
mod qualified_name;
mod value;

pub use check::CheckKind;
pub use def_hash::{DefHash, hash_domains};
pub use entries::{
    ClassConfig, ClassEntry, ClassKind, DeferFn, EventEntry, InterfaceConfig, InterfaceEntry,
    MemberEntry, MemberKind, MixinConfig, MixinEntry, ROOT_CLASS, StaticMember,
};
pub use environment::{Environment, keys as environment_keys};
pub use error::{ConfigError, ContractError, LookupError, MetaError};
pub use ids::{ListenerId, ObjectId};
pub use native_fn::{
    CallContext, HookFn, MemberFn, ObjectOps, StaticFn, hook_fn, member_fn, static_fn,
};
pub use property::{AccessorKind, PropertyDecl, PropertyFlags, PropertyGroup};
pub use qualified_name::QualifiedName;
pub use value::Value;
