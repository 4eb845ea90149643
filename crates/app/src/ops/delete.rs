use clap::Args;
use common::error::NamespaceError;

#[derive(Args, Debug, Clone)]
pub struct Delete {
    /// Node path; the node must have no children
    pub path: String,
}

/// Delete a node and everything below it
#[derive(Args, Debug, Clone)]
pub struct Rmr {
    /// Root of the subtree to delete
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("delete failed: {0}")]
    Namespace(#[from] NamespaceError),
}

#[async_trait::async_trait]
impl crate::op::Op for Delete {
    type Error = DeleteError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.delete_single(&self.path).await?;
        tracing::info!("deleted {}", self.path);
        Ok(String::new())
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Rmr {
    type Error = DeleteError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.delete_recursive(&self.path).await?;
        tracing::info!("deleted {} recursively", self.path);
        Ok(String::new())
    }
}
