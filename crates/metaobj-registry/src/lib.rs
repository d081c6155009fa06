//! Definition registry and composition engine for the metaobj runtime.
//!
//! Classes, mixins and interfaces declared through the config types in
//! `metaobj-core` are validated and assembled here: the
//! [`DefinitionRegistry`] stores definitions under a petgraph-backed
//! namespace tree, the composition engine (`define_class` and friends)
//! enforces every definition-time contract, and [`ClassShape`] is the
//! flattened per-class view the runtime executes against.

mod compose;
mod namespace_tree;
mod registry;
mod shape;

pub use namespace_tree::{NamespaceTree, SymbolRef};
pub use registry::DefinitionRegistry;
pub use shape::{ClassShape, CtorLevel, DtorLevel, GroupAccessor, ResolvedProperty};
