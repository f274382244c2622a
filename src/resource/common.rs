//! Properties shared by most interface menus

use declarative::{PropertyDescriptor, Validator};

pub const NAME: &str = "name";

/// Interface name. Renaming means a different interface.
pub fn name() -> PropertyDescriptor {
    PropertyDescriptor::string(NAME)
        .force_new()
        .required()
        .describe("Name of the interface.")
}

pub fn comment() -> PropertyDescriptor {
    PropertyDescriptor::string("comment")
}

pub fn disabled() -> PropertyDescriptor {
    PropertyDescriptor::bool("disabled")
        .default_value(false)
        .describe("Whether the interface is disabled.")
}

pub fn running() -> PropertyDescriptor {
    PropertyDescriptor::bool("running")
        .read_only()
        .describe("Whether the interface has link.")
}

pub fn arp() -> PropertyDescriptor {
    PropertyDescriptor::string("arp")
        .one_of(&["disabled", "enabled", "local-proxy-arp", "proxy-arp", "reply-only"])
        .describe("Address Resolution Protocol mode.")
}

pub fn arp_timeout() -> PropertyDescriptor {
    PropertyDescriptor::string("arp_timeout")
        .describe("How long an ARP record is kept if no packets are received from the host, e.g. `auto` or `30s`.")
}

pub fn mtu() -> PropertyDescriptor {
    PropertyDescriptor::int("mtu")
        .validate_with(Validator::IntBetween(0, 65535))
        .describe("Layer3 Maximum transmission unit.")
}

pub fn l2mtu() -> PropertyDescriptor {
    PropertyDescriptor::int("l2mtu")
        .validate_with(Validator::IntBetween(0, 65535))
        .describe("Layer2 Maximum transmission unit.")
}

pub fn actual_mtu() -> PropertyDescriptor {
    PropertyDescriptor::int("actual_mtu").read_only()
}

pub fn mac_address() -> PropertyDescriptor {
    PropertyDescriptor::string("mac_address")
        .validate_with(Validator::MacAddress)
        .describe("Media Access Control number of an interface.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Mutability, Value};

    #[test]
    fn test_name_is_force_new() {
        let name = name();
        assert_eq!(name.mutability(), Mutability::WriteOnceForceReplace);
        assert!(name.is_required());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(arp_timeout().wire_name(), "arp-timeout");
        assert_eq!(mac_address().wire_name(), "mac-address");
        assert_eq!(l2mtu().wire_name(), "l2mtu");
    }

    #[test]
    fn test_mtu_range() {
        assert!(mtu().validate(&Value::Int(1500)).is_ok());
        assert!(mtu().validate(&Value::Int(70000)).is_err());
    }
}
