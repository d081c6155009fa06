//! Environment flag map.
//!
//! The runtime consults a flat string→value configuration map for
//! build-mode switches. Debug-only diagnostics (type/shape checks,
//! declared-event checks) exist only while `debug.enabled` is true;
//! code must not rely on their side effects.

use rustc_hash::FxHashMap;

use crate::Value;

/// Well-known environment keys.
pub mod keys {
    /// Enables argument/type assertions and declared-event checks.
    pub const DEBUG: &str = "debug.enabled";
    /// Enables aspect instrumentation hooks.
    pub const ASPECTS: &str = "aspects.enabled";
}

/// Boolean/string configuration map consumed by the core.
#[derive(Debug, Clone)]
pub struct Environment {
    flags: FxHashMap<String, Value>,
}

impl Default for Environment {
    fn default() -> Self {
        let mut flags = FxHashMap::default();
        flags.insert(keys::DEBUG.to_string(), Value::Bool(true));
        flags.insert(keys::ASPECTS.to_string(), Value::Bool(false));
        Self { flags }
    }
}

impl Environment {
    /// Environment with default flags (debug checks enabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Production environment: debug checks compiled out of the paths
    /// that consult them.
    pub fn production() -> Self {
        let mut env = Self::default();
        env.set(keys::DEBUG, Value::Bool(false));
        env
    }

    /// Get a raw flag value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.flags.get(key)
    }

    /// Set a flag value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.flags.insert(key.into(), value);
    }

    /// Boolean flag, `false` when absent or non-boolean.
    pub fn bool_flag(&self, key: &str) -> bool {
        self.flags.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// String flag, `None` when absent or non-string.
    pub fn str_flag(&self, key: &str) -> Option<&str> {
        self.flags.get(key).and_then(Value::as_str)
    }

    /// Whether debug-only validation paths are active.
    pub fn debug_enabled(&self) -> bool {
        self.bool_flag(keys::DEBUG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_debug() {
        let env = Environment::new();
        assert!(env.debug_enabled());
        assert!(!env.bool_flag(keys::ASPECTS));
    }

    #[test]
    fn production_disables_debug() {
        let env = Environment::production();
        assert!(!env.debug_enabled());
    }

    #[test]
    fn custom_flags() {
        let mut env = Environment::new();
        env.set("engine.name", Value::str("metaobj"));
        assert_eq!(env.str_flag("engine.name"), Some("metaobj"));
        assert!(!env.bool_flag("engine.name"));
        assert!(env.get("missing").is_none());
    }
}
