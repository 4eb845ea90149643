use clap::Args;
use common::error::NamespaceError;
use serde::Serialize;

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Node path
    pub path: String,

    /// Node data (ignored with --stdin)
    pub data: Option<String>,

    /// ACL entries as `scheme:id:perms,...`; defaults to --acls
    #[arg(long)]
    pub acl: Option<String>,
}

/// Create a node, creating any missing ancestors first
#[derive(Args, Debug, Clone)]
pub struct Creater {
    /// Node path
    pub path: String,

    /// Node data (ignored with --stdin)
    pub data: Option<String>,

    /// ACL entries as `scheme:id:perms,...`; defaults to --acls
    #[arg(long)]
    pub acl: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("create failed: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("failed to read node data: {0}")]
    Stdin(#[from] std::io::Error),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Created {
    path: String,
}

async fn create(
    ctx: &crate::op::OpContext,
    path: &str,
    data: Option<&str>,
    acl: Option<&str>,
    force: bool,
) -> Result<String, CreateError> {
    let payload = ctx.payload(data).await?;
    let path = ctx
        .client
        .create(path, &payload, acl.unwrap_or_default(), force)
        .await?;
    tracing::info!("created {}", path);
    Ok(ctx.render(&Created { path }, |created| created.path.clone())?)
}

#[async_trait::async_trait]
impl crate::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        create(
            ctx,
            &self.path,
            self.data.as_deref(),
            self.acl.as_deref(),
            ctx.force,
        )
        .await
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Creater {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        create(ctx, &self.path, self.data.as_deref(), self.acl.as_deref(), true).await
    }
}
