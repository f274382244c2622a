//! State mapping between typed state and device records
//!
//! The device speaks flat string maps keyed by wire names. Everything typed
//! lives on this side of the boundary.

use crate::client::{Fields, RemoteRecord};
use crate::error::DecodeError;
use crate::resource::ResourceDescriptor;
use crate::types::State;

/// Encode desired state into a write payload.
///
/// Read-only properties are never included. With `skip_defaults`, values
/// equal to the descriptor default are left out as well since the device
/// already assumes them; create uses this, update does not.
pub fn to_remote(desired: &State, descriptor: &ResourceDescriptor, skip_defaults: bool) -> Fields {
    let mut fields = Fields::new();

    for prop in descriptor.properties() {
        let Some(value) = desired.get(prop.name()) else {
            continue;
        };
        if skip_defaults && prop.default() == Some(value) {
            continue;
        }
        if let Some(wire) = prop.encode(value) {
            fields.insert(prop.wire_name().to_string(), wire);
        }
    }

    fields
}

/// Decode a device record into typed state.
///
/// Best effort: a property that fails to decode is reported and left out,
/// and decoding carries on with the rest. Keys the descriptor does not know
/// are ignored. Declared properties missing from the record take their
/// default when there is one, otherwise stay absent.
pub fn from_remote(record: &RemoteRecord, descriptor: &ResourceDescriptor) -> (State, Vec<DecodeError>) {
    let mut state = State::new();
    let mut errors = Vec::new();

    for prop in descriptor.properties() {
        match record.get(prop.wire_name()) {
            Some(raw) => match prop.decode(raw) {
                Ok(value) => {
                    state.insert(prop.name().to_string(), value);
                }
                Err(e) => {
                    log::warn!("{}: {}", descriptor.kind(), e);
                    errors.push(e);
                }
            },
            None => {
                if let Some(default) = prop.default() {
                    state.insert(prop.name().to_string(), default.clone());
                }
            }
        }
    }

    (state, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyDescriptor;
    use crate::types::Value;

    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::builder("interface_bonding", "/interface/bonding")
            .identity("name")
            .property(PropertyDescriptor::string("name").force_new())
            .property(PropertyDescriptor::unordered_list("slaves"))
            .property(PropertyDescriptor::int("mtu").default_value(1500))
            .property(PropertyDescriptor::bool("disabled").default_value(false))
            .property(PropertyDescriptor::string("mac_address").read_only())
            .property(PropertyDescriptor::string("transmit_hash_policy"))
            .build()
            .unwrap()
    }

    fn record(pairs: &[(&str, &str)]) -> RemoteRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_to_remote_excludes_read_only() {
        let mut desired = State::new();
        desired.insert("name".into(), Value::from("bond1"));
        desired.insert("mac_address".into(), Value::from("00:11:22:33:44:55"));
        let fields = to_remote(&desired, &descriptor(), false);
        assert_eq!(fields.get("name").map(String::as_str), Some("bond1"));
        assert!(!fields.contains_key("mac-address"));
    }

    #[test]
    fn test_to_remote_skips_defaults_on_request() {
        let mut desired = State::new();
        desired.insert("name".into(), Value::from("bond1"));
        desired.insert("mtu".into(), Value::Int(1500));
        desired.insert("disabled".into(), Value::Bool(true));

        let fields = to_remote(&desired, &descriptor(), true);
        assert!(!fields.contains_key("mtu"));
        assert_eq!(fields.get("disabled").map(String::as_str), Some("true"));

        let fields = to_remote(&desired, &descriptor(), false);
        assert_eq!(fields.get("mtu").map(String::as_str), Some("1500"));
    }

    #[test]
    fn test_to_remote_uses_wire_names() {
        let mut desired = State::new();
        desired.insert("transmit_hash_policy".into(), Value::from("layer-2"));
        desired.insert("slaves".into(), Value::list(["ether3", "ether4"]));
        let fields = to_remote(&desired, &descriptor(), false);
        assert_eq!(
            fields.get("transmit-hash-policy").map(String::as_str),
            Some("layer-2")
        );
        assert_eq!(fields.get("slaves").map(String::as_str), Some("ether3,ether4"));
    }

    #[test]
    fn test_from_remote_ignores_unknown_keys() {
        let rec = record(&[
            (".id", "*1"),
            ("name", "bond1"),
            ("slaves", "ether3,ether4"),
            ("lacp-user-key", "0"),
        ]);
        let (state, errors) = from_remote(&rec, &descriptor());
        assert!(errors.is_empty());
        assert_eq!(state["name"], Value::from("bond1"));
        assert_eq!(state["slaves"], Value::list(["ether3", "ether4"]));
        assert!(!state.contains_key("lacp-user-key"));
        assert!(!state.contains_key("lacp_user_key"));
    }

    #[test]
    fn test_from_remote_fills_defaults_and_absent() {
        let rec = record(&[("name", "bond1")]);
        let (state, _) = from_remote(&rec, &descriptor());
        assert_eq!(state["mtu"], Value::Int(1500));
        assert_eq!(state["disabled"], Value::Bool(false));
        assert!(!state.contains_key("mac_address"));
        assert!(!state.contains_key("slaves"));
    }

    #[test]
    fn test_from_remote_best_effort() {
        let rec = record(&[
            ("name", "bond1"),
            ("mtu", "auto"),
            ("disabled", "sometimes"),
            ("mac-address", "00:11:22:33:44:55"),
        ]);
        let (state, errors) = from_remote(&rec, &descriptor());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].property, "mtu");
        assert_eq!(errors[1].property, "disabled");
        assert_eq!(state["name"], Value::from("bond1"));
        assert_eq!(state["mac_address"], Value::from("00:11:22:33:44:55"));
        assert!(!state.contains_key("mtu"));
    }
}
