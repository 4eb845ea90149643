use clap::Args;
use common::error::NamespaceError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Node path
    pub path: String,
}

#[derive(Args, Debug, Clone)]
pub struct Lsr {
    /// Root of the subtree to list
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error("listing failed: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let children = ctx.client.children(&self.path).await?;
        Ok(ctx.render(&children, |names| names.join("\n"))?)
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Lsr {
    type Error = LsError;
    type Output = String;

    /// Every descendant, relative to `path`, parents before children
    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let listing = ctx.client.list_recursive(&self.path).await?;
        Ok(ctx.render(&listing, |names| names.join("\n"))?)
    }
}
