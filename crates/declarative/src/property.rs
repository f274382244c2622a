//! Property descriptors
//!
//! Static metadata for one property of one resource kind: its type,
//! mutability class, validator and default, plus the wire codec that
//! turns typed values into the device's string fields and back.

use crate::error::{DecodeError, ValidationError};
use crate::types::{Mutability, Value, ValueType};
use crate::validate::Validator;

/// Metadata for a single property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    wire_name: String,
    value_type: ValueType,
    mutability: Mutability,
    validator: Option<Validator>,
    default: Option<Value>,
    required: bool,
    description: String,
}

impl PropertyDescriptor {
    /// Create a read-write property.
    ///
    /// The wire name is derived from the name by replacing `_` with `-`
    /// (`auto_negotiation` is sent as `auto-negotiation`).
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        Self {
            wire_name: name.replace('_', "-"),
            name,
            value_type,
            mutability: Mutability::ReadWrite,
            validator: None,
            default: None,
            required: false,
            description: String::new(),
        }
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Int)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String)
    }

    pub fn ordered_list(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::OrderedList)
    }

    pub fn unordered_list(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::UnorderedList)
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    /// Mark as computed by the device.
    pub fn read_only(mut self) -> Self {
        self.mutability = Mutability::ReadOnly;
        self
    }

    /// Mark as settable only at creation.
    pub fn force_new(mut self) -> Self {
        self.mutability = Mutability::WriteOnceForceReplace;
        self
    }

    /// Must be present in desired state when creating.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value the device assumes when the property is not sent.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Shorthand for a [`Validator::OneOf`] validator.
    pub fn one_of(self, values: &[&str]) -> Self {
        self.validate_with(Validator::one_of(values))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the derived wire name.
    pub fn wire(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_writable(&self) -> bool {
        self.mutability.is_writable()
    }

    pub fn is_force_new(&self) -> bool {
        self.mutability == Mutability::WriteOnceForceReplace
    }

    // -------------------------------------------------------------------------
    // Contract
    // -------------------------------------------------------------------------

    /// Check a candidate value against the declared type and validator.
    pub fn validate(&self, candidate: &Value) -> Result<(), ValidationError> {
        if !self.value_type.accepts(candidate) {
            return Err(ValidationError::new(
                &self.name,
                format!(
                    "expected {}, got {}",
                    self.value_type,
                    candidate.type_name()
                ),
            ));
        }

        if let Value::List(items) = candidate
            && let Some(item) = items.iter().find(|item| !is_wire_safe_item(item))
        {
            return Err(ValidationError::new(
                &self.name,
                format!("list element {item:?} must be non-empty, without commas or surrounding spaces"),
            ));
        }

        match &self.validator {
            Some(validator) => validator
                .check(candidate)
                .map_err(|message| ValidationError::new(&self.name, message)),
            None => Ok(()),
        }
    }

    /// Encode a value for the device.
    ///
    /// Returns `None` for read-only properties, which never go upstream.
    pub fn encode(&self, value: &Value) -> Option<String> {
        if !self.is_writable() {
            return None;
        }
        Some(encode_value(value))
    }

    /// Decode a device string into a value of the declared type.
    pub fn decode(&self, raw: &str) -> Result<Value, DecodeError> {
        let fail = |message: &str| DecodeError {
            property: self.name.clone(),
            raw: raw.to_string(),
            message: message.to_string(),
        };

        match self.value_type {
            ValueType::Bool => match raw {
                "true" | "yes" => Ok(Value::Bool(true)),
                "false" | "no" => Ok(Value::Bool(false)),
                _ => Err(fail("expected true/false")),
            },
            ValueType::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| fail("expected integer")),
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::OrderedList | ValueType::UnorderedList => Ok(Value::List(split_list(raw))),
        }
    }
}

/// Wire form of a value: lists are comma-joined, booleans `true`/`false`.
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::String(s) => s.clone(),
        Value::List(items) => items.join(","),
    }
}

/// Whether a list element survives the comma-joined wire form unchanged.
fn is_wire_safe_item(item: &str) -> bool {
    !item.is_empty() && !item.contains(',') && item.trim() == item
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_name_derived() {
        let p = PropertyDescriptor::bool("auto_negotiation");
        assert_eq!(p.wire_name(), "auto-negotiation");
        let p = PropertyDescriptor::int("sfp_shutdown_temperature").wire("sfp-shutdown-temperature");
        assert_eq!(p.wire_name(), "sfp-shutdown-temperature");
    }

    #[test]
    fn test_validate_type_mismatch() {
        let p = PropertyDescriptor::int("mtu");
        let err = p.validate(&Value::from("1500")).unwrap_err();
        assert_eq!(err.property, "mtu");
        assert!(err.message.contains("expected int"));
    }

    #[test]
    fn test_validate_rejects_unsplittable_list_elements() {
        let p = PropertyDescriptor::unordered_list("slaves");
        assert!(p.validate(&Value::list(["ether3", "ether4"])).is_ok());
        assert!(p.validate(&Value::List(vec![])).is_ok());

        for bad in [
            Value::list(["ether3,ether4"]),
            Value::list(["ether3", " ether5"]),
            Value::list(["ether5 "]),
            Value::list(["ether3", ""]),
        ] {
            let err = p.validate(&bad).unwrap_err();
            assert_eq!(err.property, "slaves");
        }

        // accepted elements come back unchanged from the wire form
        let value = Value::list(["ether3", "ether4"]);
        let wire = p.encode(&value).unwrap();
        assert_eq!(p.decode(&wire).unwrap(), value);
    }

    #[test]
    fn test_validate_runs_validator() {
        let p = PropertyDescriptor::string("mode").one_of(&["none", "dynamic-keys"]);
        assert!(p.validate(&Value::from("none")).is_ok());
        assert!(p.validate(&Value::from("open")).is_err());
    }

    #[test]
    fn test_encode_skips_read_only() {
        let p = PropertyDescriptor::bool("running").read_only();
        assert_eq!(p.encode(&Value::Bool(true)), None);
        let p = PropertyDescriptor::string("name").force_new();
        assert_eq!(p.encode(&Value::from("bond1")), Some("bond1".to_string()));
    }

    #[test]
    fn test_encode_values() {
        assert_eq!(encode_value(&Value::Bool(false)), "false");
        assert_eq!(encode_value(&Value::Int(-3)), "-3");
        assert_eq!(encode_value(&Value::list(["ether3", "ether4"])), "ether3,ether4");
        assert_eq!(encode_value(&Value::list(Vec::<String>::new())), "");
    }

    #[test]
    fn test_decode_bool_accepts_yes_no() {
        let p = PropertyDescriptor::bool("disabled");
        assert_eq!(p.decode("yes").unwrap(), Value::Bool(true));
        assert_eq!(p.decode("false").unwrap(), Value::Bool(false));
        let err = p.decode("maybe").unwrap_err();
        assert_eq!(err.property, "disabled");
        assert_eq!(err.raw, "maybe");
    }

    #[test]
    fn test_decode_int() {
        let p = PropertyDescriptor::int("l2mtu");
        assert_eq!(p.decode("1592").unwrap(), Value::Int(1592));
        assert!(p.decode("auto").is_err());
    }

    #[test]
    fn test_decode_list() {
        let p = PropertyDescriptor::unordered_list("slaves");
        assert_eq!(p.decode("ether3,ether4").unwrap(), Value::list(["ether3", "ether4"]));
        assert_eq!(p.decode("").unwrap(), Value::list(Vec::<String>::new()));
        assert_eq!(p.decode("a, b").unwrap(), Value::list(["a", "b"]));
    }
}
