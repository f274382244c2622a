//! Value validators
//!
//! Validators are plain data so property tables can be declared statically
//! and shared across threads.

use crate::types::Value;
use regex::Regex;
use std::sync::LazyLock;

static MAC_ADDRESS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:[0-9A-Fa-f]{2}:){5}|(?:[0-9A-Fa-f]{2}-){5})[0-9A-Fa-f]{2}$").ok()
});

/// A predicate over a candidate value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validator {
    /// String must be one of the listed values
    OneOf(Vec<String>),
    /// Integer (or integer-looking list element) within an inclusive range
    IntBetween(i64, i64),
    /// Colon- or dash-separated 48-bit MAC address
    MacAddress,
    /// List must have at least this many elements
    MinItems(usize),
    /// Every list element must pass the inner validator
    Each(Box<Validator>),
    /// Every validator must pass
    All(Vec<Validator>),
}

impl Validator {
    pub fn one_of(values: &[&str]) -> Self {
        Self::OneOf(values.iter().map(|v| (*v).to_string()).collect())
    }

    pub fn each(inner: Validator) -> Self {
        Self::Each(Box::new(inner))
    }

    /// Check a value, returning a description of the failure.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::OneOf(allowed) => {
                let s = expect_str(value)?;
                if allowed.iter().any(|a| a == s) {
                    Ok(())
                } else {
                    Err(format!("{s:?} is not one of: {}", allowed.join(", ")))
                }
            }
            Self::IntBetween(min, max) => {
                let n = match value {
                    Value::Int(n) => *n,
                    Value::String(s) => s
                        .parse::<i64>()
                        .map_err(|_| format!("{s:?} is not an integer"))?,
                    other => return Err(format!("expected int, got {}", other.type_name())),
                };
                if (*min..=*max).contains(&n) {
                    Ok(())
                } else {
                    Err(format!("{n} is not between {min} and {max}"))
                }
            }
            Self::MacAddress => {
                let s = expect_str(value)?;
                if MAC_ADDRESS.as_ref().is_some_and(|re| re.is_match(s)) {
                    Ok(())
                } else {
                    Err(format!("{s:?} is not a MAC address"))
                }
            }
            Self::MinItems(min) => {
                let items = expect_list(value)?;
                if items.len() >= *min {
                    Ok(())
                } else {
                    Err(format!("needs at least {min} item(s), got {}", items.len()))
                }
            }
            Self::Each(inner) => {
                for item in expect_list(value)? {
                    inner
                        .check(&Value::String(item.clone()))
                        .map_err(|e| format!("element {item:?}: {e}"))?;
                }
                Ok(())
            }
            Self::All(validators) => validators.iter().try_for_each(|v| v.check(value)),
        }
    }
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected string, got {}", value.type_name()))
}

fn expect_list(value: &Value) -> Result<&[String], String> {
    value
        .as_list()
        .ok_or_else(|| format!("expected list, got {}", value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_of() {
        let v = Validator::one_of(&["none", "static-keys-required", "dynamic-keys"]);
        assert!(v.check(&Value::from("static-keys-required")).is_ok());
        let err = v.check(&Value::from("wpa3")).unwrap_err();
        assert!(err.contains("wpa3"));
        assert!(v.check(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_int_between() {
        let v = Validator::IntBetween(0, 65535);
        assert!(v.check(&Value::Int(1500)).is_ok());
        assert!(v.check(&Value::Int(65535)).is_ok());
        assert!(v.check(&Value::Int(-1)).is_err());
        assert!(v.check(&Value::Int(70000)).is_err());
    }

    #[test]
    fn test_mac_address() {
        assert!(MAC_ADDRESS.is_some());
        let v = Validator::MacAddress;
        assert!(v.check(&Value::from("4C:5E:0C:12:34:56")).is_ok());
        assert!(v.check(&Value::from("4c-5e-0c-12-34-56")).is_ok());
        assert!(v.check(&Value::from("4C:5E:0C-12:34:56")).is_err());
        assert!(v.check(&Value::from("not-a-mac")).is_err());
    }

    #[test]
    fn test_each_and_min_items() {
        let v = Validator::All(vec![
            Validator::MinItems(1),
            Validator::each(Validator::one_of(&["wpa-psk", "wpa2-psk"])),
        ]);
        assert!(v.check(&Value::list(["wpa2-psk"])).is_ok());
        assert!(v.check(&Value::list(Vec::<String>::new())).is_err());
        let err = v.check(&Value::list(["wpa2-psk", "wep"])).unwrap_err();
        assert!(err.contains("\"wep\""));
    }

    #[test]
    fn test_each_int_elements() {
        let v = Validator::each(Validator::IntBetween(0, 7));
        assert!(v.check(&Value::list(["0", "5", "7"])).is_ok());
        assert!(v.check(&Value::list(["8"])).is_err());
        assert!(v.check(&Value::list(["x"])).is_err());
    }
}
