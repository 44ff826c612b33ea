//! Monitor configuration.
//!
//! Built once at startup and shared read-only with the scheduler and every
//! cycle it runs.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::ports;

/// First three octets of the watched /24, e.g. `192.168.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkPrefix([u8; 3]);

impl NetworkPrefix {
    pub const fn new(a: u8, b: u8, c: u8) -> Self {
        Self([a, b, c])
    }

    /// The /24 network that contains `ip`.
    pub fn containing(ip: Ipv4Addr) -> Self {
        let o = ip.octets();
        Self([o[0], o[1], o[2]])
    }

    /// Dotted address of host index `i` inside this prefix.
    pub fn host(&self, i: u8) -> String {
        let [a, b, c] = self.0;
        format!("{a}.{b}.{c}.{i}")
    }
}

impl Default for NetworkPrefix {
    fn default() -> Self {
        Self::new(192, 168, 1)
    }
}

impl fmt::Display for NetworkPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}.{b}.{c}")
    }
}

impl FromStr for NetworkPrefix {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidNetwork {
            value: s.to_string(),
        };

        if s.contains('/') {
            let net: Ipv4Net = s.parse().map_err(|_| invalid())?;
            if net.prefix_len() != 24 {
                return Err(invalid());
            }
            return Ok(Self::containing(net.network()));
        }

        let octets: Vec<&str> = s.split('.').collect();
        if octets.len() != 3 {
            return Err(invalid());
        }
        let mut out = [0u8; 3];
        for (slot, part) in out.iter_mut().zip(octets) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        Ok(Self(out))
    }
}

/// Which endpoints produce an output line each cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Report every open endpoint.
    #[default]
    AllOpen,
    /// Report only endpoints whose reachability changed since the previous cycle.
    ChangeOnly,
}

/// Rendering of event lines on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EventFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub network: NetworkPrefix,
    /// Inclusive host index bounds; `host_start > host_end` means no hosts.
    pub host_start: u8,
    pub host_end: u8,
    pub ports: Vec<u16>,
    /// Per-probe connect timeout.
    pub timeout: Duration,
    /// Ceiling on simultaneously active probes.
    pub max_concurrency: usize,
    /// Sleep between the end of one cycle and the start of the next.
    pub interval: Duration,
    pub mode: OutputMode,
    pub format: EventFormat,
    /// Stop after this many cycles; `None` runs until interrupted.
    pub max_cycles: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            network: NetworkPrefix::default(),
            host_start: 1,
            host_end: 254,
            ports: ports::default_ports(),
            timeout: Duration::from_secs(1),
            max_concurrency: 500,
            interval: Duration::from_secs(30),
            mode: OutputMode::AllOpen,
            format: EventFormat::Text,
            max_cycles: None,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn host_range(&self) -> RangeInclusive<u8> {
        self.host_start..=self.host_end
    }

    pub fn host_count(&self) -> usize {
        self.host_range().count()
    }

    /// Number of endpoints one cycle probes.
    pub fn endpoint_count(&self) -> usize {
        self.host_count() * self.ports.len()
    }

    pub fn change_only(&self) -> bool {
        self.mode == OutputMode::ChangeOnly
    }
}

/// Parse a host index range such as `1-254` or a single index such as `7`.
pub fn parse_host_range(s: &str) -> Result<(u8, u8)> {
    let invalid = || ConfigError::InvalidHostRange(s.to_string());
    let s = s.trim();
    match s.split_once('-') {
        Some((a, b)) => {
            let start = a.trim().parse().map_err(|_| invalid())?;
            let end = b.trim().parse().map_err(|_| invalid())?;
            Ok((start, end))
        }
        None => {
            let single = s.parse().map_err(|_| invalid())?;
            Ok((single, single))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.network.to_string(), "192.168.1");
        assert_eq!(config.host_range(), 1..=254);
        assert_eq!(config.ports, vec![80, 443, 445, 8000, 8800]);
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.max_concurrency, 500);
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.mode, OutputMode::AllOpen);
        assert_eq!(config.endpoint_count(), 254 * 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn prefix_from_dotted_and_cidr() {
        let dotted: NetworkPrefix = "10.1.2".parse().unwrap();
        let cidr: NetworkPrefix = "10.1.2.0/24".parse().unwrap();
        assert_eq!(dotted, cidr);
        assert_eq!(dotted.host(9), "10.1.2.9");
    }

    #[test]
    fn prefix_rejects_garbage() {
        for bad in ["10.1", "10.1.2.3", "10.1.300", "10.0.0.0/16", "lan"] {
            assert!(bad.parse::<NetworkPrefix>().is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn host_range_forms() {
        assert_eq!(parse_host_range("1-254").unwrap(), (1, 254));
        assert_eq!(parse_host_range(" 7 ").unwrap(), (7, 7));
        assert!(parse_host_range("1-256").is_err());
    }

    #[test]
    fn reversed_host_range_is_empty_not_error() {
        let config = MonitorConfig {
            host_start: 10,
            host_end: 5,
            ..Default::default()
        };
        assert_eq!(config.host_count(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_and_timeout_rejected() {
        let config = MonitorConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroConcurrency)));
        let config = MonitorConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }
}
