use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::acl::{self, Acl, Permissions};
use crate::flags::NodeFlags;

pub const DEFAULT_SERVER: &str = "localhost:2181";
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials added to every session right after the handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub scheme: String,
    pub credential: String,
}

impl AuthConfig {
    pub fn new(scheme: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            credential: credential.into(),
        }
    }

    /// `digest` auth with `user:password` as the credential
    pub fn digest(user: &str, password: &str) -> Self {
        Self::new(acl::DIGEST_SCHEME, format!("{}:{}", user, password))
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `host` or `host:port` entries, tried in order
    pub servers: Vec<String>,
    pub auth: Option<AuthConfig>,
    pub session_timeout: Duration,
    pub connect_timeout: Duration,
    /// Upper bound on a single request/reply exchange
    pub operation_timeout: Duration,
    /// Creation mode for nodes created by this client
    pub flags: NodeFlags,
    /// ACL applied when a create call does not name one
    pub acl: Vec<Acl>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            servers: vec![DEFAULT_SERVER.to_string()],
            auth: None,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            flags: NodeFlags::None,
            acl: acl::world_acl(Permissions::ALL),
        }
    }
}

impl ClientConfig {
    pub fn set_servers(&mut self, servers: Vec<String>) {
        self.servers = servers;
    }

    pub fn set_auth(&mut self, auth: AuthConfig) {
        tracing::debug!("setting auth for scheme {}", auth.scheme);
        self.auth = Some(auth);
    }

    /// Out-of-range values fall back to [`NodeFlags::None`]
    pub fn set_flags(&mut self, value: i32) {
        self.flags = NodeFlags::normalize(value);
    }

    pub fn set_ephemeral(&mut self) {
        self.flags = NodeFlags::Ephemeral;
    }

    pub fn set_sequential(&mut self) {
        self.flags = NodeFlags::Sequential;
    }

    pub fn set_acl(&mut self, acl: Vec<Acl>) {
        self.acl = acl;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.servers, vec!["localhost:2181".to_string()]);
        assert_eq!(config.flags, NodeFlags::None);
        assert_eq!(acl::encode(&config.acl), vec!["world:anyone:cdrwa"]);
    }

    #[test]
    fn test_set_flags_normalizes() {
        let mut config = ClientConfig::default();
        config.set_flags(2);
        assert_eq!(config.flags, NodeFlags::Sequential);
        config.set_flags(9);
        assert_eq!(config.flags, NodeFlags::None);
        config.set_ephemeral();
        assert!(config.flags.is_ephemeral());
    }

    #[test]
    fn test_digest_auth() {
        let auth = AuthConfig::digest("alice", "secret");
        assert_eq!(auth.scheme, "digest");
        assert_eq!(auth.credential, "alice:secret");
    }
}
