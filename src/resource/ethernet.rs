//! `/interface/ethernet`
//!
//! Ethernet ports exist in hardware. Create here means claiming a port
//! that is already present, which the router refuses, so in practice these
//! are imported and then updated.

use declarative::{PropertyDescriptor, ResourceDescriptor, Result, Validator};

use super::common;

pub const KIND: &str = "interface_ethernet";

pub fn descriptor() -> Result<ResourceDescriptor> {
    ResourceDescriptor::builder(KIND, "/interface/ethernet")
        .identity(common::NAME)
        .property(common::name())
        .property(
            PropertyDescriptor::string("advertise")
                .one_of(&[
                    "10M-full",
                    "10M-half",
                    "100M-full",
                    "100M-half",
                    "1000M-full",
                    "1000M-half",
                    "2500M-full",
                    "5000M-full",
                    "10000M-full",
                ])
                .describe("Advertised speed and duplex modes, only applies when auto-negotiation is enabled."),
        )
        .property(common::arp())
        .property(
            PropertyDescriptor::bool("auto_negotiation")
                .describe("Advertise maximum capabilities to achieve the best connection possible."),
        )
        .property(
            PropertyDescriptor::string("bandwidth")
                .describe("Max rx/tx bandwidth in kbps handled by the interface."),
        )
        .property(
            PropertyDescriptor::string("cable_settings")
                .one_of(&["default", "short", "standard"])
                .describe("Cable length setting (only applicable to NS DP83815/6 cards)."),
        )
        .property(
            PropertyDescriptor::string("combo_mode")
                .one_of(&["auto", "copper", "sfp"])
                .describe("Which cage of a combo port establishes the link."),
        )
        .property(common::comment())
        .property(common::disabled())
        .property(
            PropertyDescriptor::bool("disable_running_check")
                .describe("Disable running check (only applicable to x86)."),
        )
        .property(
            PropertyDescriptor::string("tx_flow_control")
                .one_of(&["on", "off", "auto"])
                .describe("Generate pause frames to the upstream device when congested."),
        )
        .property(
            PropertyDescriptor::string("rx_flow_control")
                .one_of(&["on", "off", "auto"])
                .describe("Process received pause frames and suspend transmission if required."),
        )
        .property(
            PropertyDescriptor::bool("full_duplex")
                .describe("Transmit in both directions simultaneously, only applies when auto-negotiation is disabled."),
        )
        .property(common::l2mtu())
        .property(common::mac_address())
        .property(
            PropertyDescriptor::string("master_port")
                .describe("Outdated property, see the Master-port page."),
        )
        .property(
            PropertyDescriptor::bool("mdix_enable")
                .describe("Whether MDI/X auto cross over cable correction is enabled for the port."),
        )
        .property(common::mtu())
        .property(
            PropertyDescriptor::string("poe_out")
                .one_of(&["auto-on", "forced-on", "off"])
                .describe("PoE Out settings."),
        )
        .property(
            PropertyDescriptor::int("poe_priority")
                .validate_with(Validator::IntBetween(0, 99))
                .describe("PoE Out priority."),
        )
        .property(
            PropertyDescriptor::int("sfp_shutdown_temperature")
                .describe("Temperature in Celsius at which the interface is turned off due to SFP module heat."),
        )
        .property(
            PropertyDescriptor::string("speed")
                .one_of(&["10Mbps", "10Gbps", "100Mbps", "1Gbps"])
                .describe("Data rate, only applies when auto-negotiation is disabled."),
        )
        .property(
            PropertyDescriptor::string("orig_mac_address")
                .read_only()
                .describe("Original Media Access Control number of an interface."),
        )
        .property(common::running())
        .property(
            PropertyDescriptor::bool("slave")
                .read_only()
                .describe("Whether the interface is a slave of another interface, for example a bonding."),
        )
        .property(
            PropertyDescriptor::int("switch")
                .read_only()
                .describe("ID of the switch chip the interface belongs to."),
        )
        .build()
}
