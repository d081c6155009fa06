//! Namespace tree - hierarchical storage for definition names.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: [`NamespaceData`] (definitions registered at that level)
//! - Edges: `Contains(name)` for hierarchy
//!
//! Dotted names create intermediate container nodes implicitly on first
//! use. An intermediate path component that names an existing definition
//! (a non-container leaf) is a configuration error; redefining a leaf of
//! the same name overwrites it.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use metaobj_core::{ConfigError, DefHash, QualifiedName};

/// A registered definition reference stored at a namespace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRef {
    Class(DefHash),
    Mixin(DefHash),
    Interface(DefHash),
}

impl SymbolRef {
    pub fn hash(self) -> DefHash {
        match self {
            SymbolRef::Class(h) | SymbolRef::Mixin(h) | SymbolRef::Interface(h) => h,
        }
    }

    pub fn kind_label(self) -> &'static str {
        match self {
            SymbolRef::Class(_) => "class",
            SymbolRef::Mixin(_) => "mixin",
            SymbolRef::Interface(_) => "interface",
        }
    }
}

/// Edge type in the namespace graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEdge {
    /// Parent namespace contains child namespace; the String is the
    /// child's simple name.
    Contains(String),
}

/// Data stored in each namespace node.
#[derive(Debug, Default)]
pub struct NamespaceData {
    /// Definitions registered at this level, by simple name.
    pub symbols: FxHashMap<String, SymbolRef>,
}

/// Hierarchical namespace storage.
#[derive(Debug)]
pub struct NamespaceTree {
    graph: DiGraph<NamespaceData, NamespaceEdge>,
    root: NodeIndex,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    /// Create a tree with an empty global namespace.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(NamespaceData::default());
        Self { graph, root }
    }

    /// The global namespace node.
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Find a direct child namespace node by simple name.
    fn child_of(&self, node: NodeIndex, name: &str) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|e| {
                let NamespaceEdge::Contains(child) = e.weight();
                child == name
            })
            .map(|e| e.target())
    }

    /// Resolve an existing namespace path to its node.
    pub fn node_for(&self, path: &[String]) -> Option<NodeIndex> {
        let mut node = self.root;
        for segment in path {
            node = self.child_of(node, segment)?;
        }
        Some(node)
    }

    /// Resolve a path, creating intermediate containers implicitly.
    ///
    /// Fails if a path component names an existing definition.
    fn node_for_or_create(&mut self, name: &QualifiedName) -> Result<NodeIndex, ConfigError> {
        let mut node = self.root;
        for segment in name.namespace_path() {
            if self.graph[node].symbols.contains_key(segment) {
                return Err(ConfigError::NamespaceCollision {
                    name: name.to_string(),
                    component: segment.clone(),
                });
            }
            node = match self.child_of(node, segment) {
                Some(child) => child,
                None => {
                    let child = self.graph.add_node(NamespaceData::default());
                    self.graph
                        .add_edge(node, child, NamespaceEdge::Contains(segment.clone()));
                    child
                }
            };
        }
        Ok(node)
    }

    /// Register a definition under its qualified name.
    ///
    /// Overwrites an existing leaf of the same name (hot redefinition).
    pub fn insert(&mut self, name: &QualifiedName, symbol: SymbolRef) -> Result<(), ConfigError> {
        let node = self.node_for_or_create(name)?;
        self.graph[node]
            .symbols
            .insert(name.simple_name().to_string(), symbol);
        Ok(())
    }

    /// Remove a definition. Container nodes are kept; namespaces are
    /// never garbage collected.
    pub fn remove(&mut self, name: &QualifiedName) -> Option<SymbolRef> {
        let node = self.node_for(name.namespace_path())?;
        self.graph[node].symbols.remove(name.simple_name())
    }

    /// Look up a definition by qualified name.
    pub fn lookup(&self, name: &QualifiedName) -> Option<SymbolRef> {
        let node = self.node_for(name.namespace_path())?;
        self.graph[node].symbols.get(name.simple_name()).copied()
    }

    /// Whether a namespace path exists as a container.
    pub fn contains_namespace(&self, path: &[String]) -> bool {
        self.node_for(path).is_some()
    }

    /// All definitions registered directly in a namespace.
    pub fn symbols_in(&self, path: &[String]) -> Vec<(String, SymbolRef)> {
        match self.node_for(path) {
            Some(node) => {
                let mut symbols: Vec<_> = self.graph[node]
                    .symbols
                    .iter()
                    .map(|(k, v)| (k.clone(), *v))
                    .collect();
                symbols.sort_by(|a, b| a.0.cmp(&b.0));
                symbols
            }
            None => Vec::new(),
        }
    }

    /// Direct child namespace names of a container.
    pub fn child_namespaces(&self, path: &[String]) -> Vec<String> {
        match self.node_for(path) {
            Some(node) => {
                let mut names: Vec<String> = self
                    .graph
                    .edges_directed(node, Direction::Outgoing)
                    .map(|e| {
                        let NamespaceEdge::Contains(name) = e.weight();
                        name.clone()
                    })
                    .collect();
                names.sort();
                names
            }
            None => Vec::new(),
        }
    }
}
