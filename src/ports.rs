use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Ports watched when nothing else is configured.
pub const DEFAULT_PORTS: &[u16] = &[80, 443, 445, 8000, 8800];

/// Parse a ports list into a deduplicated list of TCP ports (1..=65535).
///
/// Entries are separated by newlines or commas. Supported forms:
/// - single port number: `80`
/// - inclusive range: `8000-8010`
/// - comments: everything after `#` on a line is ignored
/// - whitespace and blank entries are ignored
///
/// First appearance wins, so the output keeps the order the ports were written in.
pub fn parse_ports_str(s: &str) -> Result<Vec<u16>> {
    let mut out: Vec<u16> = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw_line) in s.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.split('#').next().map(str::trim).unwrap_or("");
        for item in line.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            for p in parse_item(item).map_err(|e| ConfigError::PortsLine {
                line: line_no,
                message: e.to_string(),
            })? {
                if seen.insert(p) {
                    out.push(p);
                }
            }
        }
    }

    Ok(out)
}

/// Load a ports list from a file path. Errors if the file cannot be read or parsed.
pub fn load_ports_from_path(path: impl AsRef<Path>) -> Result<Vec<u16>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::PortsFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_ports_str(&content)
}

pub fn default_ports() -> Vec<u16> {
    DEFAULT_PORTS.to_vec()
}

fn parse_item(item: &str) -> Result<Vec<u16>> {
    if let Some((a, b)) = item.split_once('-') {
        let start = parse_port_str(a.trim())?;
        let end = parse_port_str(b.trim())?;
        if start > end {
            return Err(ConfigError::InvalidPort(format!(
                "range {start}-{end} (start > end)"
            )));
        }
        return Ok((start..=end).collect());
    }
    Ok(vec![parse_port_str(item)?])
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s
        .parse()
        .map_err(|_| ConfigError::InvalidPort(s.to_string()))?;
    if val == 0 || val > 65535 {
        return Err(ConfigError::InvalidPort(format!("{val} out of range")));
    }
    Ok(val as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_ports() {
        let input = "80\n22\n   443  \n";
        let ports = parse_ports_str(input).unwrap();
        assert_eq!(ports, vec![80, 22, 443]);
    }

    #[test]
    fn parse_comma_list_with_ranges() {
        let ports = parse_ports_str("80, 443,8000-8002,443").unwrap();
        assert_eq!(ports, vec![80, 443, 8000, 8001, 8002]);
    }

    #[test]
    fn parse_with_comments_and_whitespace() {
        let input = r#"
            # web
            80  # http
            443 # https
            8000-8002   # dev servers

        "#;
        let ports = parse_ports_str(input).unwrap();
        assert_eq!(ports, vec![80, 443, 8000, 8001, 8002]);
    }

    #[test]
    fn errors_carry_line_number() {
        let err = parse_ports_str("80\n70000\n").unwrap_err();
        match err {
            ConfigError::PortsLine { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reversed_range_rejected() {
        assert!(parse_ports_str("9000-8000").is_err());
    }

    #[test]
    fn empty_input_is_empty_list() {
        assert!(parse_ports_str("  # nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn defaults_match_watch_list() {
        assert_eq!(default_ports(), vec![80, 443, 445, 8000, 8800]);
    }
}
