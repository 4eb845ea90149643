pub use clap::Parser;

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How command results are printed
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Txt,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "zkcli")]
#[command(about = "Inspect and modify a ZooKeeper namespace")]
pub struct Args {
    /// Comma-separated `host[:port]` list, tried in order
    #[arg(long, global = true, value_delimiter = ',')]
    pub servers: Option<Vec<String>>,

    /// Digest auth user, added to every session
    #[arg(long, global = true, requires = "auth_pwd")]
    pub auth_user: Option<String>,

    /// Digest auth password
    #[arg(long, global = true, requires = "auth_user")]
    pub auth_pwd: Option<String>,

    /// Create missing ancestors (create, setacl)
    #[arg(long, global = true)]
    pub force: bool,

    /// Default ACL for created nodes. With digest auth this is a
    /// comma-separated list of numeric permissions for the auth identity;
    /// otherwise a full `scheme:id:perms` list.
    #[arg(long, global = true)]
    pub acls: Option<String>,

    /// Create ephemeral nodes
    #[arg(long, global = true, conflicts_with = "sequential")]
    pub ephemeral: bool,

    /// Create sequential nodes
    #[arg(long, global = true)]
    pub sequential: bool,

    /// Raw creation flags; anything other than 1 or 2 means persistent
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub flags: Option<i32>,

    #[arg(long, global = true, value_enum)]
    pub format: Option<Format>,

    /// Do not end the output with a newline
    #[arg(long, global = true)]
    pub omit_newline: bool,

    /// Log at info level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log at debug level, including every remote call
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to the zkcli config directory (defaults to ~/.zkcli)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Read node data from stdin instead of the command line
    #[arg(long, global = true)]
    pub stdin: bool,

    #[command(subcommand)]
    pub command: crate::Command,
}
