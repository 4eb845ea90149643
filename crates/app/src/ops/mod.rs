pub mod create;
pub mod delete;
pub mod exists;
pub mod get;
pub mod getacl;
pub mod ls;
pub mod set;
pub mod setacl;
pub mod version;

pub use create::{Create, Creater};
pub use delete::{Delete, Rmr};
pub use exists::Exists;
pub use get::Get;
pub use getacl::GetAcl;
pub use ls::{Ls, Lsr};
pub use set::Set;
pub use setacl::SetAcl;
pub use version::Version;
