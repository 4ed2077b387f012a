//! Vendor fact getters.

use std::fmt;

/// Device facts a driver can retrieve.
///
/// Getters return the raw, normalized output of the vendor's show command;
/// turning it into structured data is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Getter {
    Facts,
    Interfaces,
    InterfacesIp,
    InterfacesCounters,
    LldpNeighbors,
    LldpNeighborsDetail,
    BgpNeighbors,
    BgpNeighborsDetail,
    Environment,
    ArpTable,
    Ipv6NeighborsTable,
    NtpPeers,
    NtpServers,
    NtpStats,
    MacAddressTable,
    ProbesConfig,
    SnmpInformation,
    Users,
    Optics,
    NetworkInstances,
}

impl Getter {
    /// Every getter, in declaration order.
    pub const ALL: [Getter; 20] = [
        Getter::Facts,
        Getter::Interfaces,
        Getter::InterfacesIp,
        Getter::InterfacesCounters,
        Getter::LldpNeighbors,
        Getter::LldpNeighborsDetail,
        Getter::BgpNeighbors,
        Getter::BgpNeighborsDetail,
        Getter::Environment,
        Getter::ArpTable,
        Getter::Ipv6NeighborsTable,
        Getter::NtpPeers,
        Getter::NtpServers,
        Getter::NtpStats,
        Getter::MacAddressTable,
        Getter::ProbesConfig,
        Getter::SnmpInformation,
        Getter::Users,
        Getter::Optics,
        Getter::NetworkInstances,
    ];

    /// Operation name, as used in `NotImplemented` errors.
    pub fn operation(self) -> &'static str {
        match self {
            Getter::Facts => "get_facts",
            Getter::Interfaces => "get_interfaces",
            Getter::InterfacesIp => "get_interfaces_ip",
            Getter::InterfacesCounters => "get_interfaces_counters",
            Getter::LldpNeighbors => "get_lldp_neighbors",
            Getter::LldpNeighborsDetail => "get_lldp_neighbors_detail",
            Getter::BgpNeighbors => "get_bgp_neighbors",
            Getter::BgpNeighborsDetail => "get_bgp_neighbors_detail",
            Getter::Environment => "get_environment",
            Getter::ArpTable => "get_arp_table",
            Getter::Ipv6NeighborsTable => "get_ipv6_neighbors_table",
            Getter::NtpPeers => "get_ntp_peers",
            Getter::NtpServers => "get_ntp_servers",
            Getter::NtpStats => "get_ntp_stats",
            Getter::MacAddressTable => "get_mac_address_table",
            Getter::ProbesConfig => "get_probes_config",
            Getter::SnmpInformation => "get_snmp_information",
            Getter::Users => "get_users",
            Getter::Optics => "get_optics",
            Getter::NetworkInstances => "get_network_instances",
        }
    }
}

impl fmt::Display for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}
