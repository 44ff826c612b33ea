use std::collections::BTreeSet;
use std::io;
use std::net::Ipv4Addr;

use if_addrs::{get_if_addrs, IfAddr};

use crate::config::NetworkPrefix;

/// Detect the /24 prefixes of all local non-loopback IPv4 interfaces.
///
/// For example, an interface IP `192.168.1.42` yields `192.168.1`.
/// Duplicates are removed and the result is sorted for stable output.
pub fn detect_local_prefixes() -> io::Result<Vec<NetworkPrefix>> {
    let ips = get_if_addrs()?.into_iter().filter_map(|iface| match iface.addr {
        IfAddr::V4(v4) => Some(v4.ip),
        IfAddr::V6(_) => None,
    });
    Ok(prefixes_from_ips(ips))
}

/// First detected local prefix, if any interface qualifies.
pub fn detect_local_prefix() -> Option<NetworkPrefix> {
    match detect_local_prefixes() {
        Ok(prefixes) => prefixes.into_iter().next(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to enumerate network interfaces");
            None
        }
    }
}

fn prefixes_from_ips(ips: impl IntoIterator<Item = Ipv4Addr>) -> Vec<NetworkPrefix> {
    let set: BTreeSet<[u8; 3]> = ips
        .into_iter()
        .filter(|ip| !ip.is_loopback() && !ip.is_unspecified())
        .map(|ip| {
            let o = ip.octets();
            [o[0], o[1], o[2]]
        })
        .collect();
    set.into_iter()
        .map(|[a, b, c]| NetworkPrefix::new(a, b, c))
        .collect()
}
