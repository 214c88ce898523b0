use std::net::SocketAddr;

/// Configuration for one agent process.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Address of the coordinating server for the outbound session
    /// connection.
    pub coordinator_addr: SocketAddr,
    /// Local address the request listener binds. The port must match what
    /// the coordinator dials; it is identical across all agents.
    pub listen_addr: SocketAddr,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            // SAFETY: hardcoded valid addresses that always parse
            coordinator_addr: "127.0.0.1:12038"
                .parse()
                .expect("default coordinator address is valid"),
            listen_addr: "0.0.0.0:12345"
                .parse()
                .expect("default listen address is valid"),
        }
    }
}

impl AgentConfig {
    pub fn new(coordinator_addr: SocketAddr, listen_addr: SocketAddr) -> Self {
        Self {
            coordinator_addr,
            listen_addr,
        }
    }

    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_addr.set_port(port);
        self
    }
}
