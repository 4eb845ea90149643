use clap::Args;
use common::error::NamespaceError;

#[derive(Args, Debug, Clone)]
pub struct GetAcl {
    /// Node path
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetAclError {
    #[error("getacl failed: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for GetAcl {
    type Error = GetAclError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let entries = ctx.client.get_acl_strings(&self.path).await?;
        Ok(ctx.render(&entries, |entries| entries.join("\n"))?)
    }
}
