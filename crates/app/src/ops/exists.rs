use clap::Args;
use common::error::NamespaceError;

#[derive(Args, Debug, Clone)]
pub struct Exists {
    /// Node path
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ExistsError {
    #[error("exists failed: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Exists {
    type Error = ExistsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let exists = ctx.client.exists(&self.path).await?;
        Ok(ctx.render(&exists, ToString::to_string)?)
    }
}
