use clap::Args;
use common::error::NamespaceError;
use serde::Serialize;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Node path
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("get failed: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct GetOutput<'a> {
    path: &'a str,
    data: String,
}

#[async_trait::async_trait]
impl crate::op::Op for Get {
    type Error = GetError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let data = ctx.client.get(&self.path).await?;
        let output = GetOutput {
            path: &self.path,
            data: String::from_utf8_lossy(&data).into_owned(),
        };
        Ok(ctx.render(&output, |output| output.data.clone())?)
    }
}
