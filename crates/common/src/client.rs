use crate::acl::{self, Acl};
use crate::config::ClientConfig;
use crate::create;
use crate::error::NamespaceError;
use crate::flags::NodeFlags;
use crate::path;
use crate::session::{Connector, Session, Stat};
use crate::tree;

/// Path-oriented operations against the namespace.
///
/// Each public call opens its own session and closes it before returning,
/// on success and on error alike. Recursive calls run entirely on that one
/// session.
#[derive(Debug, Clone)]
pub struct NamespaceClient<C> {
    connector: C,
    flags: NodeFlags,
    acl: Vec<Acl>,
}

impl<C: Connector> NamespaceClient<C> {
    pub fn new(connector: C, config: &ClientConfig) -> Self {
        Self {
            connector,
            flags: config.flags,
            acl: config.acl.clone(),
        }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Out-of-range values fall back to [`NodeFlags::None`]
    pub fn set_flags(&mut self, value: i32) {
        self.flags = NodeFlags::normalize(value);
    }

    pub fn default_acl(&self) -> &[Acl] {
        &self.acl
    }

    async fn open(&self) -> Result<C::Session, NamespaceError> {
        self.connector.open().await
    }

    async fn release(&self, mut session: C::Session) {
        if let Err(e) = session.close().await {
            tracing::warn!("failed to close session: {}", e);
        }
    }

    pub async fn exists(&self, path: &str) -> Result<bool, NamespaceError> {
        let mut session = self.open().await?;
        let result = session.exists(path).await;
        self.release(session).await;
        Ok(result?.is_some())
    }

    pub async fn get(&self, path: &str) -> Result<Vec<u8>, NamespaceError> {
        let mut session = self.open().await?;
        let result = session.get(path).await;
        self.release(session).await;
        result.map(|(data, _)| data)
    }

    /// Immediate children, in the order the server returns them
    pub async fn children(&self, path: &str) -> Result<Vec<String>, NamespaceError> {
        let mut session = self.open().await?;
        let result = session.children(path).await;
        self.release(session).await;
        result
    }

    pub async fn has_children(&self, path: &str) -> Result<bool, NamespaceError> {
        Ok(!self.children(path).await?.is_empty())
    }

    /// See [`tree::list_recursive`]
    pub async fn list_recursive(&self, path: &str) -> Result<Vec<String>, NamespaceError> {
        let mut session = self.open().await?;
        let result = tree::list_recursive(&mut session, path).await;
        self.release(session).await;
        result
    }

    /// Create exactly one node. The root is reported as created without
    ///  contacting the server.
    pub async fn create_single(
        &self,
        path: &str,
        data: &[u8],
        flags: NodeFlags,
        acl: &[Acl],
    ) -> Result<String, NamespaceError> {
        if path == path::ROOT {
            return Ok(path::ROOT.to_string());
        }
        let mut session = self.open().await?;
        let result = session.create(path, data, flags, acl).await;
        self.release(session).await;
        result
    }

    /// Create `path` with an ACL given in text form; empty text means the
    ///  client's default ACL. With `force`, missing ancestors are created.
    pub async fn create(
        &self,
        path: &str,
        data: &[u8],
        acl_text: &str,
        force: bool,
    ) -> Result<String, NamespaceError> {
        let acl = if acl_text.is_empty() {
            self.acl.clone()
        } else {
            acl::decode(acl_text)?
        };
        self.create_with_acl(path, data, force, &acl).await
    }

    /// See [`create::create_with_auto_parent`]
    pub async fn create_with_acl(
        &self,
        path: &str,
        data: &[u8],
        force: bool,
        acl: &[Acl],
    ) -> Result<String, NamespaceError> {
        let mut session = self.open().await?;
        let result =
            create::create_with_auto_parent(&mut session, path, data, self.flags, acl, force)
                .await;
        self.release(session).await;
        result
    }

    /// Overwrite the payload regardless of the node's current version
    pub async fn set_data(&self, path: &str, data: &[u8]) -> Result<Stat, NamespaceError> {
        let mut session = self.open().await?;
        let result = session.set_data(path, data, None).await;
        self.release(session).await;
        result
    }

    pub async fn get_acl(&self, path: &str) -> Result<Vec<Acl>, NamespaceError> {
        let mut session = self.open().await?;
        let result = session.get_acl(path).await;
        self.release(session).await;
        result.map(|(acl, _)| acl)
    }

    /// ACL entries rendered as `scheme:id:<cdrwa letters>`
    pub async fn get_acl_strings(&self, path: &str) -> Result<Vec<String>, NamespaceError> {
        Ok(acl::encode(&self.get_acl(path).await?))
    }

    /// See [`create::set_acl_or_create`]
    pub async fn set_acl(
        &self,
        path: &str,
        acl_text: &str,
        force: bool,
    ) -> Result<String, NamespaceError> {
        let acl = acl::decode(acl_text)?;
        let mut session = self.open().await?;
        let result = create::set_acl_or_create(&mut session, path, &acl, self.flags, force).await;
        self.release(session).await;
        result
    }

    /// Delete a single node; fails if it has children
    pub async fn delete_single(&self, path: &str) -> Result<(), NamespaceError> {
        let mut session = self.open().await?;
        let result = session.delete(path, None).await;
        self.release(session).await;
        result
    }

    /// See [`tree::delete_recursive`]
    pub async fn delete_recursive(&self, path: &str) -> Result<(), NamespaceError> {
        let mut session = self.open().await?;
        let result = tree::delete_recursive(&mut session, path).await;
        self.release(session).await;
        result
    }
}
