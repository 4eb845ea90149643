use std::error::Error;
use std::time::Duration;

use common::acl::{self, AclParseError};
use common::prelude::*;
use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::args::{Args, Format};
use crate::state::{AppConfig, AppState, StateError};

/// Permissions granted to the auth identity when `--acls` is not given
const DEFAULT_DIGEST_PERMS: &str = "31";

/// Build the client configuration.
///
/// Priority: command-line flag > config file > built-in default.
pub fn resolve_client_config(
    args: &Args,
    file: &AppConfig,
) -> Result<ClientConfig, AclParseError> {
    let mut config = ClientConfig::default();

    if let Some(servers) = &args.servers {
        config.set_servers(servers.clone());
    } else if !file.servers.is_empty() {
        config.set_servers(file.servers.clone());
    }

    if let Some(ms) = file.session_timeout_ms {
        config.session_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = file.connect_timeout_ms {
        config.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = file.operation_timeout_ms {
        config.operation_timeout = Duration::from_millis(ms);
    }

    let auth = match (&args.auth_user, &args.auth_pwd) {
        (Some(user), Some(pwd)) => Some((user, pwd)),
        _ => file.auth_user.as_ref().zip(file.auth_pwd.as_ref()),
    };
    let acls = args.acls.as_ref().or(file.acls.as_ref());

    match (auth, acls) {
        (Some((user, pwd)), acls) => {
            config.set_auth(AuthConfig::digest(user, pwd));
            let perms = acls.map(String::as_str).unwrap_or(DEFAULT_DIGEST_PERMS);
            config.set_acl(acl::digest_acls(user, pwd, perms)?);
        }
        (None, Some(text)) => config.set_acl(acl::decode(text)?),
        (None, None) => {}
    }

    if let Some(flags) = args.flags {
        config.set_flags(flags);
    }
    if args.ephemeral {
        config.set_ephemeral();
    }
    if args.sequential {
        config.set_sequential();
    }

    Ok(config)
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("failed to load config: {0}")]
    State(#[from] StateError),
    #[error("invalid ACL setting: {0}")]
    Acl(#[from] AclParseError),
}

#[derive(Debug, Clone)]
pub struct OpContext {
    pub client: NamespaceClient<TcpConnector>,
    pub format: Format,
    /// Create missing ancestors where a command supports it
    pub force: bool,
    /// Take node data from stdin
    pub stdin: bool,
}

impl OpContext {
    pub fn new(args: &Args) -> Result<Self, ContextError> {
        let state = AppState::load(args.config_path.clone())?;
        tracing::debug!("config file: {}", state.config_path.display());

        let config = resolve_client_config(args, &state.config)?;
        let client = NamespaceClient::new(TcpConnector::new(&config), &config);
        tracing::debug!("servers: {}", client.connector().servers().join(","));

        Ok(Self {
            client,
            format: args.format.or(state.config.format).unwrap_or_default(),
            force: args.force,
            stdin: args.stdin,
        })
    }

    /// Node data from `arg`, or all of stdin with `--stdin`
    pub async fn payload(&self, arg: Option<&str>) -> std::io::Result<Vec<u8>> {
        if self.stdin {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            return Ok(buf);
        }
        Ok(arg.unwrap_or_default().as_bytes().to_vec())
    }

    /// JSON, or the plain form produced by `text`
    pub fn render<T, F>(&self, value: &T, text: F) -> Result<String, serde_json::Error>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        match self.format {
            Format::Txt => Ok(text(value)),
            Format::Json => serde_json::to_string(value),
        }
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(
                &self,
                ctx: &$crate::op::OpContext,
            ) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
