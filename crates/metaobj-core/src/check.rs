//! Declarative property value checks.
//!
//! A property declaration may carry a [`CheckKind`] constraining the
//! values its setters accept. Structural kinds are validated here;
//! `InstanceOf` needs class-graph knowledge and is finished by the
//! runtime against the definition registry.

use crate::{QualifiedName, Value};

/// Declared type/shape constraint for a property.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckKind {
    /// Boolean values only. Boolean-checked properties additionally
    /// generate `is`/`toggle` accessors.
    Bool,
    /// Integer values only.
    Int,
    /// Integer or float values.
    Number,
    /// String values only.
    Str,
    /// Array values only.
    Array,
    /// Map values only.
    Map,
    /// Any object reference.
    Object,
    /// Object reference whose class is (a subclass of) the named class.
    /// The subclass test is performed by the runtime.
    InstanceOf(QualifiedName),
    /// One of a fixed set of values.
    OneOf(Vec<Value>),
}

impl CheckKind {
    /// Human-readable expectation for error messages.
    pub fn expectation(&self) -> String {
        match self {
            CheckKind::Bool => "bool".into(),
            CheckKind::Int => "int".into(),
            CheckKind::Number => "number".into(),
            CheckKind::Str => "string".into(),
            CheckKind::Array => "array".into(),
            CheckKind::Map => "map".into(),
            CheckKind::Object => "object".into(),
            CheckKind::InstanceOf(name) => format!("instance of {name}"),
            CheckKind::OneOf(values) => {
                let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("one of [{}]", list.join(", "))
            }
        }
    }

    /// Structural acceptance test.
    ///
    /// `InstanceOf` passes any object reference here; the class test is
    /// completed by the runtime, which can see the definition registry.
    pub fn accepts_shallow(&self, value: &Value) -> bool {
        match self {
            CheckKind::Bool => matches!(value, Value::Bool(_)),
            CheckKind::Int => matches!(value, Value::Int(_)),
            CheckKind::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            CheckKind::Str => matches!(value, Value::Str(_)),
            CheckKind::Array => matches!(value, Value::Array(_)),
            CheckKind::Map => matches!(value, Value::Map(_)),
            CheckKind::Object | CheckKind::InstanceOf(_) => matches!(value, Value::Object(_)),
            CheckKind::OneOf(values) => values.iter().any(|v| v == value),
        }
    }

    /// Whether this check marks a boolean property.
    pub fn is_boolean(&self) -> bool {
        matches!(self, CheckKind::Bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_kinds() {
        assert!(CheckKind::Bool.accepts_shallow(&Value::Bool(true)));
        assert!(!CheckKind::Bool.accepts_shallow(&Value::Int(1)));
        assert!(CheckKind::Number.accepts_shallow(&Value::Int(1)));
        assert!(CheckKind::Number.accepts_shallow(&Value::Float(1.5)));
        assert!(!CheckKind::Number.accepts_shallow(&Value::str("1")));
        assert!(CheckKind::Str.accepts_shallow(&Value::str("x")));
    }

    #[test]
    fn one_of() {
        let check = CheckKind::OneOf(vec![Value::str("left"), Value::str("right")]);
        assert!(check.accepts_shallow(&Value::str("left")));
        assert!(!check.accepts_shallow(&Value::str("center")));
        assert!(check.expectation().contains("left"));
    }

    #[test]
    fn instance_of_is_shallow_here() {
        use crate::ObjectId;
        let check = CheckKind::InstanceOf(QualifiedName::from_dotted("ui.Widget"));
        assert!(check.accepts_shallow(&Value::Object(ObjectId::from_raw(1))));
        assert!(!check.accepts_shallow(&Value::Int(1)));
    }
}
