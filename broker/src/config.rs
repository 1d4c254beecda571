use crate::error::{BrokerError, BrokerResult};

const USAGE: &str = "Usage: broker connections [portnum]";
const MIN_PORT: u32 = 1024;
const MAX_PORT: u32 = 65535;

/// The validated launch surface: how many concurrent sessions the admission
/// gate allows (0 = unlimited) and which port to listen on (0 = any free
/// port, reported back on the diagnostic stream once bound).
#[derive(Debug, Clone, Copy)]
pub struct Config {
    connections: usize,
    port: u16,
}

impl Config {
    /// Parses the two positional launch arguments (program name excluded).
    pub fn parse(args: &[String]) -> BrokerResult<Self> {
        if args.is_empty() || args.len() > 2 {
            return Err(BrokerError::ArgumentError(USAGE.to_string()));
        }

        let connections = parse_non_negative(&args[0])
            .ok_or_else(|| BrokerError::ArgumentError(USAGE.to_string()))?;

        let port = match args.get(1) {
            Some(raw) => {
                parse_port(raw).ok_or_else(|| BrokerError::ArgumentError(USAGE.to_string()))?
            }
            None => 0,
        };

        Ok(Config { connections, port })
    }

    pub fn connections(&self) -> usize {
        self.connections
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

fn parse_non_negative(value: &str) -> Option<usize> {
    value.parse::<usize>().ok()
}

fn parse_port(value: &str) -> Option<u16> {
    let parsed: u32 = value.parse().ok()?;
    if parsed == 0 || (MIN_PORT..=MAX_PORT).contains(&parsed) {
        Some(parsed as u16)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_connections_only() {
        let config = Config::parse(&args(&["5"])).unwrap();
        assert_eq!(config.connections(), 5);
        assert_eq!(config.port(), 0);
    }

    #[test]
    fn parses_connections_and_port() {
        let config = Config::parse(&args(&["0", "8080"])).unwrap();
        assert_eq!(config.connections(), 0);
        assert_eq!(config.port(), 8080);
    }

    #[test]
    fn zero_port_is_allowed() {
        let config = Config::parse(&args(&["1", "0"])).unwrap();
        assert_eq!(config.port(), 0);
    }

    #[test]
    fn rejects_port_below_range() {
        assert!(Config::parse(&args(&["1", "1023"])).is_err());
    }

    #[test]
    fn rejects_port_above_range() {
        assert!(Config::parse(&args(&["1", "65536"])).is_err());
    }

    #[test]
    fn rejects_negative_connections() {
        assert!(Config::parse(&args(&["-1"])).is_err());
    }

    #[test]
    fn rejects_missing_arguments() {
        assert!(Config::parse(&args(&[])).is_err());
    }

    #[test]
    fn rejects_too_many_arguments() {
        assert!(Config::parse(&args(&["1", "1024", "extra"])).is_err());
    }
}
