//! `/interface/wireless/security-profiles`

use declarative::{PropertyDescriptor, ResourceDescriptor, Result, Validator};

use super::common;

pub const KIND: &str = "interface_wireless_security_profiles";

const CIPHERS: &[&str] = &["tkip", "aes-ccm"];
const STATIC_ALGOS: &[&str] = &["none", "40bit-wep", "104bit-wep", "tkip", "aes-ccm"];

pub fn descriptor() -> Result<ResourceDescriptor> {
    let mut builder = ResourceDescriptor::builder(KIND, "/interface/wireless/security-profiles")
        .identity(common::NAME)
        .property(common::name())
        .property(
            PropertyDescriptor::string("mode")
                .required()
                .one_of(&["none", "static-keys-optional", "static-keys-required", "dynamic-keys"])
                .describe("Encryption mode for the security profile."),
        )
        .property(PropertyDescriptor::string("default").read_only())
        .property(common::comment())
        // WPA PSK
        .property(
            PropertyDescriptor::unordered_list("authentication_types")
                .required()
                .validate_with(Validator::All(vec![
                    Validator::MinItems(1),
                    Validator::each(Validator::one_of(&["wpa-psk", "wpa2-psk", "wpa-eap", "wpa2-eap"])),
                ]))
                .describe("Set of supported authentication types."),
        )
        .property(
            PropertyDescriptor::bool("disable_pmkid")
                .describe("Whether to leave PMKID out of EAPOL frames sent by the Access Point."),
        )
        .property(
            PropertyDescriptor::unordered_list("unicast_ciphers")
                .validate_with(Validator::each(Validator::one_of(CIPHERS)))
                .describe("Ciphers the Access Point advertises for unicast frames."),
        )
        .property(
            PropertyDescriptor::unordered_list("group_ciphers")
                .validate_with(Validator::each(Validator::one_of(CIPHERS)))
                .describe("Ciphers the Access Point may use for broadcast and multicast frames."),
        )
        .property(
            PropertyDescriptor::string("group_key_update")
                .default_value("5m")
                .describe("How often the Access Point updates the group key."),
        )
        .property(PropertyDescriptor::string("wpa_pre_shared_key"))
        .property(PropertyDescriptor::string("wpa2_pre_shared_key"))
        // WPA EAP
        .property(
            PropertyDescriptor::unordered_list("eap_methods")
                .validate_with(Validator::each(Validator::one_of(&[
                    "eap-tls",
                    "eap-ttls-mschapv2",
                    "passthrough",
                    "peap",
                ])))
                .describe("Allowed authentication methods, Access Points only."),
        )
        .property(PropertyDescriptor::string("supplicant_identity"))
        .property(PropertyDescriptor::string("mschapv2_username"))
        .property(PropertyDescriptor::string("mschapv2_password"))
        .property(PropertyDescriptor::string("tls_mode").one_of(&[
            "verify-certificate",
            "dont-verify-certificate",
            "no-certificates",
            "verify-certificate-with-crl",
        ]))
        .property(PropertyDescriptor::string("tls_certificate"))
        .property(PropertyDescriptor::bool("management_protection"))
        .property(PropertyDescriptor::string("management_protection_key"))
        // RADIUS
        .property(PropertyDescriptor::bool("radius_mac_authentication"))
        .property(PropertyDescriptor::bool("radius_mac_accounting"))
        .property(PropertyDescriptor::bool("radius_eap_accounting"))
        .property(PropertyDescriptor::string("radius_called_format"))
        .property(PropertyDescriptor::string("interim_update"))
        .property(PropertyDescriptor::string("radius_mac_format").one_of(&[
            "XX:XX:XX:XX:XX:XX",
            "XXXX:XXXX:XXXX",
            "XXXXXX:XXXXXX",
            "XX-XX-XX-XX-XX-XX",
            "XXXXXX-XXXXXX",
            "XXXXXXXXXXXX",
            "XX XX XX XX XX XX",
        ]))
        .property(PropertyDescriptor::string("radius_mac_mode").one_of(&["as-username", "as-username-and-password"]))
        .property(PropertyDescriptor::string("radius_mac_caching"));

    // WEP
    for slot in 0..4 {
        builder = builder
            .property(PropertyDescriptor::string(format!("static_key_{slot}")))
            .property(PropertyDescriptor::string(format!("static_algo_{slot}")).one_of(STATIC_ALGOS));
    }

    builder
        .property(PropertyDescriptor::string("static_transmit_key").one_of(&["key-0", "key-1", "key-2", "key-3"]))
        .property(PropertyDescriptor::string("static_sta_private_key"))
        .property(PropertyDescriptor::string("static_sta_private_algo").one_of(STATIC_ALGOS))
        .build()
}
