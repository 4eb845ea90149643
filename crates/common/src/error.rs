use crate::acl::AclParseError;

/// Terminal failure of a namespace operation.
#[derive(Debug, thiserror::Error)]
pub enum NamespaceError {
    /// The session could not be established or was lost
    #[error("connection error: {0}")]
    Connection(String),
    #[error("node does not exist: {0}")]
    NoNode(String),
    #[error("node already exists: {0}")]
    NodeExists(String),
    #[error("node has children: {0}")]
    NotEmpty(String),
    #[error("version mismatch: {0}")]
    BadVersion(String),
    #[error("ephemeral nodes may not have children: {0}")]
    NoChildrenForEphemerals(String),
    #[error("not authorized: {0}")]
    NoAuth(String),
    #[error("authentication failed")]
    AuthFailed,
    #[error("invalid ACL: {0}")]
    InvalidAcl(String),
    #[error("bad arguments: {0}")]
    BadArguments(String),
    /// Any server error code without a dedicated variant
    #[error("server error {code} on {path}")]
    Server { code: i32, path: String },
    /// The server sent something that does not decode
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error(transparent)]
    AclParse(#[from] AclParseError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NamespaceError {
    pub fn is_no_node(&self) -> bool {
        matches!(self, Self::NoNode(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Io(_) | Self::Protocol(_))
    }
}
