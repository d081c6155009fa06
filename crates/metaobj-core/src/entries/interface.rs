//! Interface configuration and entry.
//!
//! An interface is a structural contract checked against a class's
//! assembled member/property/event surface at definition time.
//! Satisfaction is transitive over `extends`.

use crate::{DefHash, QualifiedName};

/// Declarative interface configuration.
#[derive(Debug, Clone, Default)]
pub struct InterfaceConfig {
    pub name: String,
    /// Interfaces this one extends.
    pub extend: Vec<String>,
    /// Required member names (satisfied by a member or a generated
    /// property accessor).
    pub members: Vec<String>,
    /// Required property names.
    pub properties: Vec<String>,
    /// Required event names.
    pub events: Vec<String>,
}

impl InterfaceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn extend(mut self, interface: impl Into<String>) -> Self {
        self.extend.push(interface.into());
        self
    }

    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.push(name.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(name.into());
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.events.push(name.into());
        self
    }
}

/// Registered interface definition.
#[derive(Debug, Clone)]
pub struct InterfaceEntry {
    pub name: String,
    pub qualified_name: QualifiedName,
    pub hash: DefHash,
    /// Extended interface hashes, in declaration order.
    pub extend: Vec<DefHash>,
    pub members: Vec<String>,
    pub properties: Vec<String>,
    pub events: Vec<String>,
}

impl InterfaceEntry {
    pub fn new(qualified_name: QualifiedName) -> Self {
        let hash = DefHash::interface_of(&qualified_name);
        Self {
            name: qualified_name.simple_name().to_string(),
            qualified_name,
            hash,
            extend: Vec::new(),
            members: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_collects_requirements() {
        let config = InterfaceConfig::new("ICanSpeak")
            .member("speak")
            .property("volume")
            .event("spoke");
        assert_eq!(config.members, vec!["speak"]);
        assert_eq!(config.properties, vec!["volume"]);
        assert_eq!(config.events, vec!["spoke"]);
    }

    #[test]
    fn entry_hash_uses_interface_domain() {
        let entry = InterfaceEntry::new(QualifiedName::from_dotted("a.IThing"));
        assert_eq!(entry.hash, DefHash::interface("a.IThing"));
        assert_ne!(entry.hash, DefHash::class("a.IThing"));
    }
}
