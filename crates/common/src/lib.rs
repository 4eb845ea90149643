/**
 * Access-control entries, permission masks and
 *  their textual encodings.
 */
pub mod acl;
pub mod client;
pub mod config;
/**
 * Creation with on-demand ancestors, and the
 *  "ensure this ACL" variant of set-ACL built on it.
 */
pub mod create;
pub mod error;
pub mod flags;
pub mod path;
/**
 * The remote session capability.
 *  - `Session` / `Connector` traits
 *  - an in-memory namespace for tests and dry runs
 *  - the TCP wire transport
 */
pub mod session;
/**
 * Recursive listing and leaves-first deletion.
 */
pub mod tree;
/**
 * Helper for reporting build version information
 *  baked in at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::acl::{Acl, AclParseError, Permissions};
    pub use crate::client::NamespaceClient;
    pub use crate::config::{AuthConfig, ClientConfig};
    pub use crate::error::NamespaceError;
    pub use crate::flags::NodeFlags;
    pub use crate::session::{Connector, MemoryNamespace, Session, Stat, TcpConnector};
    pub use crate::version::BuildInfo;
}
