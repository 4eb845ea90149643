use clap::Args;
use common::error::NamespaceError;
use common::session::Stat;

#[derive(Args, Debug, Clone)]
pub struct Set {
    /// Node path
    pub path: String,

    /// New node data (ignored with --stdin)
    pub data: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SetError {
    #[error("set failed: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("failed to read node data: {0}")]
    Stdin(#[from] std::io::Error),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

/// `name = value` lines in the order the server reports them
pub fn stat_lines(stat: &Stat) -> String {
    [
        ("czxid", stat.czxid),
        ("mzxid", stat.mzxid),
        ("ctime", stat.ctime),
        ("mtime", stat.mtime),
        ("version", i64::from(stat.version)),
        ("cversion", i64::from(stat.cversion)),
        ("aversion", i64::from(stat.aversion)),
        ("ephemeralOwner", stat.ephemeral_owner),
        ("dataLength", i64::from(stat.data_length)),
        ("numChildren", i64::from(stat.num_children)),
        ("pzxid", stat.pzxid),
    ]
    .iter()
    .map(|(name, value)| format!("{} = {}", name, value))
    .collect::<Vec<_>>()
    .join("\n")
}

#[async_trait::async_trait]
impl crate::op::Op for Set {
    type Error = SetError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let payload = ctx.payload(self.data.as_deref()).await?;
        let stat = ctx.client.set_data(&self.path, &payload).await?;
        Ok(ctx.render(&stat, stat_lines)?)
    }
}
