//! `host:port` server descriptors.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Address of a peer node or of a candidate server for a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerDescriptor {
    /// Hostname or IP literal (IPv6 without brackets).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl ServerDescriptor {
    /// Build a descriptor from parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse every argument, keeping the valid descriptors in order and
    /// collecting the errors for the rest.
    pub fn parse_all<I, S>(inputs: I) -> (Vec<ServerDescriptor>, Vec<ProtocolError>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Vec::new();
        let mut rejected = Vec::new();
        for input in inputs {
            match input.as_ref().parse() {
                Ok(descriptor) => parsed.push(descriptor),
                Err(e) => rejected.push(e),
            }
        }
        (parsed, rejected)
    }
}

impl FromStr for ServerDescriptor {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ProtocolError::InvalidDescriptor {
            input: s.to_string(),
            reason,
        };

        let (host, port) = s.trim().rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        if host.chars().any(char::is_whitespace) {
            return Err(invalid("host contains whitespace"));
        }

        let port: u16 = port.parse().map_err(|_| invalid("port is not a number"))?;
        if port == 0 {
            return Err(invalid("port 0 is not connectable"));
        }

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
