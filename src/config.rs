//! Tabserve - Server configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{bail, Result};

pub const DEFAULT_DATA_PATH: &str = "data_complete.csv";
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000);
pub const DEFAULT_FAILURE_PROBABILITY: f64 = 0.5;

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Dataset file, loaded once at startup
    pub data_path: PathBuf,
    /// Listen address
    pub bind: SocketAddr,
    /// Chance that a `/faulty` request fails, in `[0, 1]`
    pub failure_probability: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind: DEFAULT_BIND,
            failure_probability: DEFAULT_FAILURE_PROBABILITY,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        let p = self.failure_probability;
        if !(0.0..=1.0).contains(&p) {
            bail!("failure probability must be within [0, 1], got {}", p);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_rejects_bad_probability() {
        for p in [-0.1, 1.01, f64::NAN] {
            let config = ServerConfig {
                failure_probability: p,
                ..ServerConfig::default()
            };
            assert!(config.validate().is_err(), "{} accepted", p);
        }
    }
}
