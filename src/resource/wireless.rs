//! `/interface/wireless`
//!
//! Legacy wireless package interfaces. Physical radios exist in hardware;
//! virtual APs are added with `master_interface` set.

use declarative::{PropertyDescriptor, ResourceDescriptor, Result, Validator};

use super::common;

pub const KIND: &str = "interface_wireless";

const YES_NO: &[&str] = &["yes", "no"];
const ENABLED_DISABLED: &[&str] = &["enabled", "disabled"];

pub fn descriptor() -> Result<ResourceDescriptor> {
    ResourceDescriptor::builder(KIND, "/interface/wireless")
        .identity(common::NAME)
        .property(common::name())
        .property(common::actual_mtu())
        .property(
            PropertyDescriptor::string("adaptive_noise_immunity")
                .one_of(&["ap-and-client-mode", "client-mode", "none"])
                .describe("Only effective for cards based on Atheros chipset."),
        )
        .property(
            PropertyDescriptor::string("allow_sharedkey")
                .one_of(YES_NO)
                .describe("Allow WEP Shared Key clients to connect."),
        )
        .property(
            PropertyDescriptor::ordered_list("ampdu_priorities")
                .validate_with(Validator::each(Validator::IntBetween(0, 7)))
                .describe("Frame priorities for which AMPDU sending should get negotiated and used."),
        )
        .property(
            PropertyDescriptor::int("amsdu_limit")
                .validate_with(Validator::IntBetween(0, 8192))
                .describe("Max AMSDU that device is allowed to prepare when negotiated."),
        )
        .property(
            PropertyDescriptor::int("amsdu_threshold")
                .validate_with(Validator::IntBetween(0, 8192))
                .describe("Max frame size to allow including in AMSDU."),
        )
        .property(PropertyDescriptor::string("antenna_gain"))
        .property(
            PropertyDescriptor::string("antenna_mode").one_of(&["ant-a", "ant-b", "rxa-txb", "txa-rxb"]),
        )
        .property(PropertyDescriptor::string("area"))
        .property(common::arp())
        .property(common::arp_timeout())
        .property(
            PropertyDescriptor::string("band")
                .one_of(&[
                    "2ghz-b",
                    "2ghz-b/g",
                    "2ghz-b/g/n",
                    "2ghz-onlyg",
                    "2ghz-onlyn",
                    "5ghz-a",
                    "5ghz-a/n",
                    "5ghz-onlyn",
                    "5ghz-a/n/ac",
                    "5ghz-onlyac",
                    "5ghz-n/ac",
                ])
                .describe("Defines set of used data rates, channel frequencies and widths."),
        )
        .property(
            PropertyDescriptor::unordered_list("basic_rates_a_g")
                .validate_with(Validator::each(Validator::one_of(&[
                    "12Mbps", "18Mbps", "24Mbps", "36Mbps", "48Mbps", "54Mbps", "6Mbps", "9Mbps",
                ])))
                .wire("basic-rates-a/g"),
        )
        .property(
            PropertyDescriptor::unordered_list("basic_rates_b").validate_with(Validator::each(
                Validator::one_of(&["11Mbps", "1Mbps", "2Mbps", "5.5Mbps"]),
            )),
        )
        .property(
            PropertyDescriptor::string("bridge_mode")
                .one_of(&["disabled", "enabled"])
                .default_value("enabled")
                .describe("Allows to use station-bridge mode."),
        )
        .property(PropertyDescriptor::string("channel_width"))
        .property(common::comment())
        .property(PropertyDescriptor::string("compression").one_of(YES_NO))
        .property(
            PropertyDescriptor::string("country")
                .describe("Limits available bands, frequencies and maximum transmit power for each frequency."),
        )
        .property(PropertyDescriptor::string("default_authentication").one_of(YES_NO))
        .property(PropertyDescriptor::string("default_forwarding").one_of(YES_NO))
        .property(common::disabled())
        .property(PropertyDescriptor::string("distance"))
        .property(PropertyDescriptor::string("frequency"))
        .property(
            PropertyDescriptor::string("frequency_mode").one_of(&["regulatory-domain", "manual-txpower", "superchannel"]),
        )
        .property(PropertyDescriptor::string("guard_interval").one_of(&["any", "long"]))
        .property(
            PropertyDescriptor::string("hide_ssid")
                .one_of(&["no", "yes"])
                .describe("Whether the SSID is left out of beacon frames."),
        )
        .property(
            PropertyDescriptor::string("hw_protection_mode").one_of(&["cts-to-self", "none", "rts-cts"]),
        )
        .property(
            PropertyDescriptor::int("hw_retries")
                .validate_with(Validator::IntBetween(0, 15))
                .describe("Number of times sending frame is retried without considering it a transmission failure."),
        )
        .property(PropertyDescriptor::string("installation").one_of(&["any", "indoor", "outdoor"]))
        .property(PropertyDescriptor::string("keepalive_frames").one_of(ENABLED_DISABLED))
        .property(common::l2mtu())
        .property(common::mac_address())
        .property(
            PropertyDescriptor::string("master_interface")
                .describe("Physical interface a virtual AP runs on."),
        )
        .property(
            PropertyDescriptor::int("max_station_count")
                .validate_with(Validator::IntBetween(1, 2007)),
        )
        .property(
            PropertyDescriptor::string("mode")
                .one_of(&[
                    "station",
                    "station-wds",
                    "ap-bridge",
                    "bridge",
                    "alignment-only",
                    "nstreme-dual-slave",
                    "wds-slave",
                    "station-pseudobridge",
                    "station-pseudobridge-clone",
                    "station-bridge",
                ])
                .describe("Selection between different station and access point (AP) modes."),
        )
        .property(common::mtu())
        .property(PropertyDescriptor::string("multicast_buffering").one_of(ENABLED_DISABLED))
        .property(PropertyDescriptor::string("multicast_helper").one_of(&["default", "disabled", "full"]))
        .property(
            PropertyDescriptor::int("noise_floor_threshold").validate_with(Validator::IntBetween(-128, 127)),
        )
        .property(PropertyDescriptor::string("preamble_mode").one_of(&["both", "long", "short"]))
        .property(PropertyDescriptor::string("radio_name"))
        .property(PropertyDescriptor::string("rate_set").one_of(&["configured", "default"]))
        .property(
            PropertyDescriptor::string("scan_list")
                .describe("Frequencies used in scan, as comma-separated ranges."),
        )
        .property(
            PropertyDescriptor::string("security_profile")
                .describe("Name of the profile from the security-profiles menu."),
        )
        .property(
            PropertyDescriptor::string("ssid")
                .describe("Name of the wireless network."),
        )
        .property(
            PropertyDescriptor::string("skip_dfs_channels").one_of(&["disabled", "all", "10min-cac"]),
        )
        .property(
            PropertyDescriptor::unordered_list("supported_rates_a_g")
                .validate_with(Validator::each(Validator::one_of(&[
                    "6Mbps", "9Mbps", "12Mbps", "18Mbps", "24Mbps", "36Mbps", "48Mbps", "54Mbps",
                ])))
                .wire("supported-rates-a/g"),
        )
        .property(
            PropertyDescriptor::unordered_list("supported_rates_b").validate_with(Validator::each(
                Validator::one_of(&["11Mbps", "1Mbps", "2Mbps", "5.5Mbps"]),
            )),
        )
        .property(PropertyDescriptor::int("tx_power").validate_with(Validator::IntBetween(-30, 40)))
        .property(
            PropertyDescriptor::string("tx_power_mode")
                .one_of(&["default", "card-rates", "all-rates-fixed", "manual-table"]),
        )
        .property(
            PropertyDescriptor::string("wds_mode")
                .one_of(&["disabled", "dynamic", "dynamic-mesh", "static", "static-mesh"]),
        )
        .property(
            PropertyDescriptor::string("wireless_protocol").one_of(&[
                "802.11",
                "any",
                "nstreme",
                "nv2",
                "nv2-nstreme",
                "nv2-nstreme-802.11",
                "unspecified",
            ]),
        )
        .property(PropertyDescriptor::string("wmm_support").one_of(&["disabled", "enabled", "required"]))
        .property(
            PropertyDescriptor::string("wps_mode").one_of(&["disabled", "push-button", "push-button-virtual-only"]),
        )
        .property(PropertyDescriptor::string("interface_type").read_only())
        .property(common::running())
        .build()
}
