use crate::config::MonitorConfig;
use crate::types::Endpoint;

/// Every endpoint one cycle probes: for each host index in the configured
/// range, one endpoint per configured port.
///
/// Pure function of the configuration. An empty host range or port list
/// yields an empty list.
pub fn enumerate_endpoints(config: &MonitorConfig) -> Vec<Endpoint> {
    let mut out = Vec::with_capacity(config.endpoint_count());
    for i in config.host_range() {
        let host = config.network.host(i);
        for &port in &config.ports {
            out.push(Endpoint::new(host.clone(), port));
        }
    }
    out
}
