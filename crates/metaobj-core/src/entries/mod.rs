//! Definition entries: classes, mixins, interfaces, members, events.

mod class;
mod common;
mod interface;
mod mixin;

pub use class::{ClassConfig, ClassEntry, ClassKind, DeferFn, ROOT_CLASS};
pub use common::{EventEntry, MemberEntry, MemberKind, StaticMember};
pub use interface::{InterfaceConfig, InterfaceEntry};
pub use mixin::{MixinConfig, MixinEntry};
