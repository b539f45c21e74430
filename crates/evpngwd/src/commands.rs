//! Shell command builders for link, bridge VLAN and FRR operations

use evpn_gw_common::shell::{self, shellquote};
use evpn_types::{IpPrefix, VlanId, Vni};

use crate::backend::{FrrVrfConfig, LinkKind, LinkSpec, TaggingMode};

/// Build link creation command
///
/// Creates the device only; enslaving and bring-up are separate commands.
pub fn build_link_add_cmd(spec: &LinkSpec) -> String {
    let mut cmd = format!("{} link add {}", shell::IP_CMD, shellquote(&spec.name));
    if let Some(address) = &spec.address {
        cmd.push_str(&format!(" address {}", address));
    }
    match &spec.kind {
        LinkKind::Vrf { table } => {
            cmd.push_str(&format!(" type vrf table {}", table));
        }
        LinkKind::Bridge { vlan_filtering } => {
            cmd.push_str(&format!(
                " type bridge vlan_filtering {}",
                u8::from(*vlan_filtering)
            ));
        }
        LinkKind::Vxlan { vni, local, dstport } => {
            cmd.push_str(&format!(" type vxlan id {}", vni));
            if let Some(local) = local {
                cmd.push_str(&format!(" local {}", local));
            }
            cmd.push_str(&format!(" dstport {} nolearning", dstport));
        }
        LinkKind::Dummy => cmd.push_str(" type dummy"),
    }
    cmd
}

/// Build link enslave command
pub fn build_link_set_master_cmd(name: &str, master: &str) -> String {
    format!(
        "{} link set {} master {}",
        shell::IP_CMD,
        shellquote(name),
        shellquote(master)
    )
}

/// Build link bring-up command
pub fn build_link_set_up_cmd(name: &str) -> String {
    format!("{} link set {} up", shell::IP_CMD, shellquote(name))
}

/// Build link deletion command
pub fn build_link_del_cmd(name: &str) -> String {
    format!("{} link del {}", shell::IP_CMD, shellquote(name))
}

/// Build link query command
///
/// JSON output with details, parsed by the iproute2 adapter.
pub fn build_link_show_cmd(name: &str) -> String {
    format!("{} -j -d link show dev {}", shell::IP_CMD, shellquote(name))
}

/// Build address assignment command
pub fn build_addr_add_cmd(name: &str, prefix: &IpPrefix) -> String {
    format!(
        "{} address add {} dev {}",
        shell::IP_CMD,
        prefix,
        shellquote(name)
    )
}

/// Build bridge VLAN add command
///
/// `on_bridge` targets the bridge device itself (`self`) instead of a port.
pub fn build_bridge_vlan_add_cmd(
    dev: &str,
    vlan: VlanId,
    mode: TaggingMode,
    on_bridge: bool,
) -> String {
    let mut cmd = format!(
        "{} vlan add vid {} dev {}",
        shell::BRIDGE_CMD,
        vlan,
        shellquote(dev)
    );
    let mode_args = mode.to_bridge_cmd();
    if !mode_args.is_empty() {
        cmd.push(' ');
        cmd.push_str(mode_args);
    }
    if on_bridge {
        cmd.push_str(" self");
    }
    cmd
}

/// Build bridge VLAN removal command
pub fn build_bridge_vlan_del_cmd(dev: &str, vlan: VlanId, on_bridge: bool) -> String {
    let mut cmd = format!(
        "{} vlan del vid {} dev {}",
        shell::BRIDGE_CMD,
        vlan,
        shellquote(dev)
    );
    if on_bridge {
        cmd.push_str(" self");
    }
    cmd
}

/// Build a vtysh invocation running `lines` in configuration mode
pub fn build_vtysh_cmd(lines: &[String]) -> String {
    let mut cmd = format!("{} -c {}", shell::VTYSH_CMD, shellquote("configure terminal"));
    for line in lines {
        cmd.push_str(" -c ");
        cmd.push_str(&shellquote(line));
    }
    cmd
}

/// FRR configuration lines binding a VRF to its L3 VNI and advertising it
/// over EVPN
pub fn frr_vrf_config_lines(vrf: &FrrVrfConfig, vni: Vni) -> Vec<String> {
    let mut lines = vec![
        format!("vrf {}", vrf.name),
        format!("vni {}", vni),
        "exit-vrf".to_string(),
        format!("router bgp {} vrf {}", vrf.local_as, vrf.name),
    ];
    if let Some(router_id) = vrf.router_id {
        lines.push(format!("bgp router-id {}", router_id));
    }
    lines.extend(
        [
            "no bgp ebgp-requires-policy",
            "address-family ipv4 unicast",
            "redistribute connected",
            "exit-address-family",
            "address-family l2vpn evpn",
            "advertise ipv4 unicast",
            "exit-address-family",
            "exit",
        ]
        .map(String::from),
    );
    lines
}

/// FRR configuration lines undoing [`frr_vrf_config_lines`]
pub fn frr_vrf_remove_lines(vrf: &FrrVrfConfig, vni: Vni) -> Vec<String> {
    vec![
        format!("no router bgp {} vrf {}", vrf.local_as, vrf.name),
        format!("vrf {}", vrf.name),
        format!("no vni {}", vni),
        "exit-vrf".to_string(),
        format!("no vrf {}", vrf.name),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use evpn_types::MacAddress;

    #[test]
    fn test_build_add_vrf_cmd() {
        let spec = LinkSpec::new("blue", LinkKind::Vrf { table: 1003 })
            .with_address(MacAddress::new([2, 0, 0, 0, 0, 1]));
        let cmd = build_link_add_cmd(&spec);
        assert_eq!(
            cmd,
            "/sbin/ip link add \"blue\" address 02:00:00:00:00:01 type vrf table 1003"
        );
    }

    #[test]
    fn test_build_add_vxlan_cmd() {
        let spec = LinkSpec::new(
            "vni100",
            LinkKind::Vxlan {
                vni: Vni::new(100).unwrap(),
                local: Some("10.0.0.1".parse().unwrap()),
                dstport: 4789,
            },
        );
        let cmd = build_link_add_cmd(&spec);
        assert!(cmd.contains("type vxlan id 100 local 10.0.0.1 dstport 4789 nolearning"));
    }

    #[test]
    fn test_build_add_bridge_and_dummy_cmd() {
        let bridge = LinkSpec::new("br-tenant", LinkKind::Bridge { vlan_filtering: true });
        assert!(build_link_add_cmd(&bridge).ends_with("type bridge vlan_filtering 1"));
        let port = LinkSpec::new("port1", LinkKind::Dummy);
        assert!(build_link_add_cmd(&port).ends_with("type dummy"));
    }

    #[test]
    fn test_build_link_set_cmds() {
        assert_eq!(
            build_link_set_master_cmd("vni100", "br-tenant"),
            "/sbin/ip link set \"vni100\" master \"br-tenant\""
        );
        assert_eq!(build_link_set_up_cmd("blue"), "/sbin/ip link set \"blue\" up");
        assert_eq!(build_link_del_cmd("blue"), "/sbin/ip link del \"blue\"");
        assert_eq!(
            build_link_show_cmd("blue"),
            "/sbin/ip -j -d link show dev \"blue\""
        );
    }

    #[test]
    fn test_build_addr_add_cmd() {
        let prefix: IpPrefix = "10.0.0.1/32".parse().unwrap();
        assert_eq!(
            build_addr_add_cmd("blue", &prefix),
            "/sbin/ip address add 10.0.0.1/32 dev \"blue\""
        );
    }

    #[test]
    fn test_build_bridge_vlan_cmds() {
        let vlan = VlanId::new(10).unwrap();
        assert_eq!(
            build_bridge_vlan_add_cmd("br-tenant", vlan, TaggingMode::Tagged, true),
            "/sbin/bridge vlan add vid 10 dev \"br-tenant\" self"
        );
        assert_eq!(
            build_bridge_vlan_add_cmd("port1", vlan, TaggingMode::Untagged, false),
            "/sbin/bridge vlan add vid 10 dev \"port1\" pvid untagged"
        );
        assert_eq!(
            build_bridge_vlan_del_cmd("br-tenant", vlan, true),
            "/sbin/bridge vlan del vid 10 dev \"br-tenant\" self"
        );
    }

    #[test]
    fn test_frr_lines_with_vni() {
        let vni = Vni::new(1000).unwrap();
        let vrf = FrrVrfConfig {
            name: "blue".to_string(),
            vni: Some(vni),
            local_as: 65000,
            router_id: Some("10.0.0.1".parse().unwrap()),
        };
        let lines = frr_vrf_config_lines(&vrf, vni);
        assert_eq!(lines[0], "vrf blue");
        assert_eq!(lines[1], "vni 1000");
        assert!(lines.contains(&"router bgp 65000 vrf blue".to_string()));
        assert!(lines.contains(&"bgp router-id 10.0.0.1".to_string()));
        assert!(lines.contains(&"advertise ipv4 unicast".to_string()));

        let remove = frr_vrf_remove_lines(&vrf, vni);
        assert_eq!(remove[0], "no router bgp 65000 vrf blue");
        assert!(remove.contains(&"no vni 1000".to_string()));
        assert_eq!(remove.last().map(String::as_str), Some("no vrf blue"));
    }

    #[test]
    fn test_build_vtysh_cmd_quotes_lines() {
        let cmd = build_vtysh_cmd(&["vrf blue".to_string(), "vni 10".to_string()]);
        assert_eq!(
            cmd,
            "/usr/bin/vtysh -c \"configure terminal\" -c \"vrf blue\" -c \"vni 10\""
        );
    }

    #[test]
    fn test_shellquote_safety() {
        let cmd = build_link_del_cmd("x\"; rm -rf /");
        assert!(cmd.contains("\"x\\\"; rm -rf /\""));
    }
}
