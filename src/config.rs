use std::env;

/// Node settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub http_host: String,
    pub http_port: u16,
    pub p2p_host: String,
    pub p2p_port: u16,
    /// `ws://host:port` addresses dialed once at startup.
    pub peers: Vec<String>,
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = |key: &str, default: u16| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        Self {
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            http_port: port("HTTP_PORT", 3001),
            p2p_host: lookup("P2P_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            p2p_port: port("P2P_PORT", 6001),
            peers: lookup("PEERS")
                .map(|v| parse_peers(&v))
                .unwrap_or_default(),
        }
    }
}

fn parse_peers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> NodeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.http_host, "127.0.0.1");
        assert_eq!(c.http_port, 3001);
        assert_eq!(c.p2p_port, 6001);
        assert!(c.peers.is_empty());
    }

    #[test]
    fn overrides_and_peer_list() {
        let c = config(&[
            ("HTTP_PORT", "8080"),
            ("P2P_PORT", "not a port"),
            ("PEERS", "ws://a:6001, ,ws://b:6002"),
        ]);
        assert_eq!(c.http_port, 8080);
        assert_eq!(c.p2p_port, 6001);
        assert_eq!(c.peers, vec!["ws://a:6001", "ws://b:6002"]);
    }
}
