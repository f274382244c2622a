//! `/interface/bonding`

use declarative::{PropertyDescriptor, ResourceDescriptor, Result, Validator};

use super::common;

pub const KIND: &str = "interface_bonding";

pub fn descriptor() -> Result<ResourceDescriptor> {
    ResourceDescriptor::builder(KIND, "/interface/bonding")
        .identity(common::NAME)
        .property(common::name())
        .property(
            PropertyDescriptor::unordered_list("slaves")
                .required()
                .validate_with(Validator::MinItems(1))
                .describe("Interfaces used in bonding. Order carries no meaning."),
        )
        .property(
            PropertyDescriptor::string("mode")
                .one_of(&[
                    "802.3ad",
                    "active-backup",
                    "balance-alb",
                    "balance-rr",
                    "balance-tlb",
                    "balance-xor",
                    "broadcast",
                ])
                .default_value("balance-rr")
                .describe("Interface bonding mode."),
        )
        .property(common::arp())
        .property(
            PropertyDescriptor::string("arp_interval")
                .describe("Time between ARP monitoring probes."),
        )
        .property(
            PropertyDescriptor::unordered_list("arp_ip_targets")
                .describe("IP addresses probed when link monitoring is arp."),
        )
        .property(common::comment())
        .property(common::disabled())
        .property(PropertyDescriptor::string("down_delay"))
        .property(
            PropertyDescriptor::string("lacp_rate")
                .one_of(&["1sec", "30secs"])
                .describe("Link Aggregation Control Protocol rate, 802.3ad only."),
        )
        .property(
            PropertyDescriptor::string("link_monitoring")
                .one_of(&["arp", "mii", "none"])
                .default_value("mii"),
        )
        .property(PropertyDescriptor::string("mii_interval"))
        .property(
            PropertyDescriptor::int("min_links")
                .validate_with(Validator::IntBetween(0, 4_294_967_295))
                .describe("How many active slave links are needed for the bonding to become active."),
        )
        .property(common::mtu())
        .property(
            PropertyDescriptor::string("primary")
                .describe("Slave that carries traffic in active-backup mode."),
        )
        .property(
            PropertyDescriptor::string("transmit_hash_policy")
                .one_of(&["layer-2", "layer-2-and-3", "layer-3-and-4"])
                .describe("Slave selection policy for balance-xor and 802.3ad."),
        )
        .property(PropertyDescriptor::string("up_delay"))
        .property(common::actual_mtu())
        .property(common::mac_address().read_only())
        .property(common::running())
        .build()
}
