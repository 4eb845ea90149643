//! The remote session capability every higher-level operation runs on.
//!
//! A [`Connector`] opens a [`Session`]; a session exposes the one-shot
//! primitives of the coordination service. Recursive operations hold a
//! single session for their whole run.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::acl::Acl;
use crate::error::NamespaceError;
use crate::flags::NodeFlags;

pub mod memory;
pub mod tcp;

pub use memory::{JournalEntry, MemoryNamespace, MemorySession, Operation};
pub use tcp::{TcpConnector, TcpSession};

/// Node metadata as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stat {
    pub czxid: i64,
    pub mzxid: i64,
    pub ctime: i64,
    pub mtime: i64,
    pub version: i32,
    pub cversion: i32,
    pub aversion: i32,
    pub ephemeral_owner: i64,
    pub data_length: i32,
    pub num_children: i32,
    pub pzxid: i64,
}

#[async_trait]
pub trait Session: Send {
    /// Metadata for `path`, or `None` if the node is absent
    async fn exists(&mut self, path: &str) -> Result<Option<Stat>, NamespaceError>;

    async fn get(&mut self, path: &str) -> Result<(Vec<u8>, Stat), NamespaceError>;

    /// Names of the immediate children, in server order
    async fn children(&mut self, path: &str) -> Result<Vec<String>, NamespaceError>;

    /// Create a single node and return its actual path, which differs
    ///  from `path` for sequential nodes
    async fn create(
        &mut self,
        path: &str,
        data: &[u8],
        flags: NodeFlags,
        acl: &[Acl],
    ) -> Result<String, NamespaceError>;

    /// `version` of `None` matches any version
    async fn set_data(
        &mut self,
        path: &str,
        data: &[u8],
        version: Option<i32>,
    ) -> Result<Stat, NamespaceError>;

    async fn get_acl(&mut self, path: &str) -> Result<(Vec<Acl>, Stat), NamespaceError>;

    async fn set_acl(
        &mut self,
        path: &str,
        acl: &[Acl],
        version: Option<i32>,
    ) -> Result<Stat, NamespaceError>;

    async fn delete(&mut self, path: &str, version: Option<i32>) -> Result<(), NamespaceError>;

    /// End the session. Safe to call more than once.
    async fn close(&mut self) -> Result<(), NamespaceError>;
}

#[async_trait]
pub trait Connector: Send + Sync + Debug + Clone + 'static {
    type Session: Session;

    async fn open(&self) -> Result<Self::Session, NamespaceError>;
}
