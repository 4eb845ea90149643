use clap::Args;
use common::error::NamespaceError;

/// Replace a node's ACL; with --force a missing node is created with it
#[derive(Args, Debug, Clone)]
pub struct SetAcl {
    /// Node path
    pub path: String,

    /// ACL entries as `scheme:id:perms,...`, perms as letters (cdrwa) or a number
    pub acl: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SetAclError {
    #[error("setacl failed: {0}")]
    Namespace(#[from] NamespaceError),
}

#[async_trait::async_trait]
impl crate::op::Op for SetAcl {
    type Error = SetAclError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = ctx.client.set_acl(&self.path, &self.acl, ctx.force).await?;
        tracing::info!("set ACL on {}", path);
        Ok(String::new())
    }
}
