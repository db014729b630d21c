//! Positional command-line arguments.
//!
//! Malformed descriptors are returned to the caller for reporting instead of
//! aborting, so one typo does not discard the remaining peers or servers.

use chatmesh_proto::{ProtocolError, ServerDescriptor};

use super::types::{ClientConfig, ClientTuning, ConfigError, ServerConfig, ServerTuning};

pub const SERVER_USAGE: &str = "usage: chatmeshd <port> <node-name> [peer-host:port ...]\n\
                                example: chatmeshd 5000 Server1 localhost:5001 localhost:5002";

pub const CLIENT_USAGE: &str = "usage: chatmesh-client <host:port> [host:port ...]\n\
                                example: chatmesh-client localhost:5000 localhost:5001";

impl ServerConfig {
    /// Build from `<port> <name> [peer...]` (program name already stripped).
    pub fn from_args<I>(
        args: I,
        tuning: ServerTuning,
    ) -> Result<(Self, Vec<ProtocolError>), ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let port = args.next().ok_or(ConfigError::MissingArgument("port"))?;
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        let name = args.next().ok_or(ConfigError::MissingArgument("node-name"))?;
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidName);
        }

        let (peers, rejected) = ServerDescriptor::parse_all(args);
        Ok((
            Self {
                port,
                name,
                peers,
                tuning,
            },
            rejected,
        ))
    }
}

impl ClientConfig {
    /// Build from `<host:port>...` (program name already stripped).
    pub fn from_args<I>(
        args: I,
        tuning: ClientTuning,
    ) -> Result<(Self, Vec<ProtocolError>), ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let (servers, rejected) = ServerDescriptor::parse_all(args);
        if servers.is_empty() {
            return Err(ConfigError::NoServers);
        }
        Ok((Self { servers, tuning }, rejected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_server_args() {
        let (config, rejected) = ServerConfig::from_args(
            args(&["5000", "Server1", "localhost:5001", "bogus", "10.0.0.2:5002"]),
            ServerTuning::default(),
        )
        .unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.name, "Server1");
        assert_eq!(
            config.peers,
            vec![
                ServerDescriptor::new("localhost", 5001),
                ServerDescriptor::new("10.0.0.2", 5002)
            ]
        );
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn test_server_args_standalone() {
        let (config, rejected) =
            ServerConfig::from_args(args(&["5000", "solo"]), ServerTuning::default()).unwrap();
        assert!(config.peers.is_empty());
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_server_args_errors() {
        assert!(matches!(
            ServerConfig::from_args(args(&[]), ServerTuning::default()),
            Err(ConfigError::MissingArgument("port"))
        ));
        assert!(matches!(
            ServerConfig::from_args(args(&["5000"]), ServerTuning::default()),
            Err(ConfigError::MissingArgument("node-name"))
        ));
        assert!(matches!(
            ServerConfig::from_args(args(&["cinco", "n"]), ServerTuning::default()),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            ServerConfig::from_args(args(&["5000", "  "]), ServerTuning::default()),
            Err(ConfigError::InvalidName)
        ));
    }

    #[test]
    fn test_client_args() {
        let (config, rejected) = ClientConfig::from_args(
            args(&["localhost:5000", "nope", "localhost:5001"]),
            ClientTuning::default(),
        )
        .unwrap();
        assert_eq!(config.servers.len(), 2);
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn test_client_args_require_a_server() {
        assert!(matches!(
            ClientConfig::from_args(args(&["nope", "also:bad"]), ClientTuning::default()),
            Err(ConfigError::NoServers)
        ));
    }
}
