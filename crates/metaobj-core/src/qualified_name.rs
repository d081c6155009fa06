//! Dotted qualified names.
//!
//! Definitions live in a dotted namespace hierarchy (`ui.form.Button`).
//! [`QualifiedName`] is the primary key for registry lookup; intermediate
//! namespace containers are created implicitly on first use.

use std::fmt;

/// Qualified name for class/mixin/interface identity.
///
/// # Examples
///
/// ```
/// use metaobj_core::QualifiedName;
///
/// let button = QualifiedName::from_dotted("ui.form.Button");
/// assert_eq!(button.simple_name(), "Button");
/// assert_eq!(button.namespace_string(), "ui.form");
/// assert_eq!(button.to_string(), "ui.form.Button");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Simple name (e.g., "Button").
    pub name: String,
    /// Namespace path (e.g., ["ui", "form"]). Empty for the global namespace.
    pub namespace: Vec<String>,
}

impl QualifiedName {
    /// Create a new qualified name with a namespace path.
    pub fn new(name: impl Into<String>, namespace: Vec<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    /// Create a qualified name in the global namespace.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Vec::new(),
        }
    }

    /// Parse from a dotted string (e.g., "ui.form.Button").
    ///
    /// The last segment is the simple name, the rest the namespace path.
    /// Empty segments (leading/trailing/doubled dots) are dropped.
    pub fn from_dotted(s: &str) -> Self {
        let parts: Vec<&str> = s.split('.').filter(|p| !p.is_empty()).collect();
        match parts.split_last() {
            None => Self::global(""),
            Some((name, [])) => Self::global(*name),
            Some((name, namespace)) => Self {
                name: name.to_string(),
                namespace: namespace.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    /// Check if this is in the global namespace.
    pub fn is_global(&self) -> bool {
        self.namespace.is_empty()
    }

    /// Get the simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Get the namespace path.
    pub fn namespace_path(&self) -> &[String] {
        &self.namespace
    }

    /// Get the namespace as a joined dotted string.
    pub fn namespace_string(&self) -> String {
        self.namespace.join(".")
    }

    /// Create a child name within this name treated as a namespace.
    ///
    /// Example: `ui.form` + `Button` = `ui.form.Button`
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut child_ns = self.namespace.clone();
        child_ns.push(self.name.clone());
        Self {
            name: name.into(),
            namespace: child_ns,
        }
    }

    /// Get the parent namespace as a QualifiedName (if any).
    ///
    /// Example: `ui.form.Button` -> Some(`ui.form`)
    pub fn parent(&self) -> Option<Self> {
        let (name, namespace) = self.namespace.split_last()?;
        Some(Self {
            name: name.clone(),
            namespace: namespace.to_vec(),
        })
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace.join("."), self.name)
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::from_dotted(s)
    }
}
