use bytes::{BufMut, BytesMut};

use super::jute;
use crate::acl::Acl;
use crate::error::NamespaceError;

pub const PROTOCOL_VERSION: i32 = 0;
pub const PASSWORD_LEN: usize = 16;

pub const WATCH_XID: i32 = -1;
pub const PING_XID: i32 = -2;
pub const AUTH_XID: i32 = -4;

/// "match any version"
pub const ANY_VERSION: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OpCode {
    Create = 1,
    Delete = 2,
    Exists = 3,
    GetData = 4,
    SetData = 5,
    GetAcl = 6,
    SetAcl = 7,
    GetChildren = 8,
    Auth = 100,
    CloseSession = -11,
}

/// Server error codes with a dedicated meaning on this client
pub mod code {
    pub const OK: i32 = 0;
    pub const CONNECTION_LOSS: i32 = -4;
    pub const OPERATION_TIMEOUT: i32 = -7;
    pub const BAD_ARGUMENTS: i32 = -8;
    pub const NO_NODE: i32 = -101;
    pub const NO_AUTH: i32 = -102;
    pub const BAD_VERSION: i32 = -103;
    pub const NO_CHILDREN_FOR_EPHEMERALS: i32 = -108;
    pub const NODE_EXISTS: i32 = -110;
    pub const NOT_EMPTY: i32 = -111;
    pub const SESSION_EXPIRED: i32 = -112;
    pub const INVALID_ACL: i32 = -114;
    pub const AUTH_FAILED: i32 = -115;
}

pub fn error_from_code(err: i32, path: &str) -> NamespaceError {
    let path = path.to_string();
    match err {
        code::CONNECTION_LOSS => NamespaceError::Connection("connection lost".to_string()),
        code::OPERATION_TIMEOUT => NamespaceError::Connection("operation timed out".to_string()),
        code::SESSION_EXPIRED => NamespaceError::Connection("session expired".to_string()),
        code::BAD_ARGUMENTS => NamespaceError::BadArguments(path),
        code::NO_NODE => NamespaceError::NoNode(path),
        code::NO_AUTH => NamespaceError::NoAuth(path),
        code::BAD_VERSION => NamespaceError::BadVersion(path),
        code::NO_CHILDREN_FOR_EPHEMERALS => NamespaceError::NoChildrenForEphemerals(path),
        code::NODE_EXISTS => NamespaceError::NodeExists(path),
        code::NOT_EMPTY => NamespaceError::NotEmpty(path),
        code::INVALID_ACL => NamespaceError::InvalidAcl(path),
        code::AUTH_FAILED => NamespaceError::AuthFailed,
        code => NamespaceError::Server { code, path },
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectRequest {
    pub timeout_ms: i32,
}

impl ConnectRequest {
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(PROTOCOL_VERSION);
        // last zxid seen
        buf.put_i64(0);
        buf.put_i32(self.timeout_ms);
        // session id
        buf.put_i64(0);
        jute::put_buffer(buf, &[0; PASSWORD_LEN]);
        // read-only
        jute::put_bool(buf, false);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectResponse {
    pub protocol_version: i32,
    pub timeout_ms: i32,
    pub session_id: i64,
}

impl ConnectResponse {
    pub fn decode(frame: &[u8]) -> Result<Self, NamespaceError> {
        let mut reader = jute::JuteReader::new(frame);
        let response = Self {
            protocol_version: reader.read_i32()?,
            timeout_ms: reader.read_i32()?,
            session_id: reader.read_i64()?,
        };
        // session password, only needed for reconnecting
        reader.read_buffer()?;
        // Older servers omit the trailing read-only flag
        if reader.remaining() > 0 {
            reader.read_bool()?;
        }
        Ok(response)
    }
}

/// Request bodies this client sends
#[derive(Debug, Clone, Copy)]
pub enum Request<'a> {
    Exists { path: &'a str },
    GetData { path: &'a str },
    GetChildren { path: &'a str },
    Create {
        path: &'a str,
        data: &'a [u8],
        acl: &'a [Acl],
        flags: i32,
    },
    SetData {
        path: &'a str,
        data: &'a [u8],
        version: i32,
    },
    GetAcl { path: &'a str },
    SetAcl {
        path: &'a str,
        acl: &'a [Acl],
        version: i32,
    },
    Delete { path: &'a str, version: i32 },
    Auth { scheme: &'a str, credential: &'a [u8] },
    CloseSession,
}

impl Request<'_> {
    pub fn opcode(&self) -> OpCode {
        match self {
            Self::Exists { .. } => OpCode::Exists,
            Self::GetData { .. } => OpCode::GetData,
            Self::GetChildren { .. } => OpCode::GetChildren,
            Self::Create { .. } => OpCode::Create,
            Self::SetData { .. } => OpCode::SetData,
            Self::GetAcl { .. } => OpCode::GetAcl,
            Self::SetAcl { .. } => OpCode::SetAcl,
            Self::Delete { .. } => OpCode::Delete,
            Self::Auth { .. } => OpCode::Auth,
            Self::CloseSession => OpCode::CloseSession,
        }
    }

    /// Path the request targets, used to label server errors
    pub fn path(&self) -> &str {
        match self {
            Self::Exists { path }
            | Self::GetData { path }
            | Self::GetChildren { path }
            | Self::Create { path, .. }
            | Self::SetData { path, .. }
            | Self::GetAcl { path }
            | Self::SetAcl { path, .. }
            | Self::Delete { path, .. } => *path,
            Self::Auth { .. } | Self::CloseSession => "",
        }
    }

    /// Encode header and body, without the frame length
    pub fn encode(&self, xid: i32, buf: &mut BytesMut) {
        buf.put_i32(xid);
        buf.put_i32(self.opcode() as i32);
        match *self {
            Self::Exists { path } | Self::GetData { path } | Self::GetChildren { path } => {
                jute::put_str(buf, path);
                // no watch
                jute::put_bool(buf, false);
            }
            Self::Create {
                path,
                data,
                acl,
                flags,
            } => {
                jute::put_str(buf, path);
                jute::put_buffer(buf, data);
                jute::put_acls(buf, acl);
                buf.put_i32(flags);
            }
            Self::SetData {
                path,
                data,
                version,
            } => {
                jute::put_str(buf, path);
                jute::put_buffer(buf, data);
                buf.put_i32(version);
            }
            Self::GetAcl { path } => jute::put_str(buf, path),
            Self::SetAcl { path, acl, version } => {
                jute::put_str(buf, path);
                jute::put_acls(buf, acl);
                buf.put_i32(version);
            }
            Self::Delete { path, version } => {
                jute::put_str(buf, path);
                buf.put_i32(version);
            }
            Self::Auth { scheme, credential } => {
                // auth type, always 0
                buf.put_i32(0);
                jute::put_str(buf, scheme);
                jute::put_buffer(buf, credential);
            }
            Self::CloseSession => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyHeader {
    pub xid: i32,
    pub zxid: i64,
    pub err: i32,
}

impl ReplyHeader {
    pub fn decode(reader: &mut jute::JuteReader<'_>) -> Result<Self, NamespaceError> {
        Ok(Self {
            xid: reader.read_i32()?,
            zxid: reader.read_i64()?,
            err: reader.read_i32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::Permissions;

    #[test]
    fn test_delete_request_layout() {
        let mut buf = BytesMut::new();
        Request::Delete {
            path: "/a",
            version: ANY_VERSION,
        }
        .encode(7, &mut buf);
        assert_eq!(
            &buf[..],
            &[
                0, 0, 0, 7, // xid
                0, 0, 0, 2, // opcode
                0, 0, 0, 2, b'/', b'a', //
                0xff, 0xff, 0xff, 0xff,
            ][..]
        );
    }

    #[test]
    fn test_create_request_round_trips_through_reader() {
        let acl = vec![Acl::new("world", "anyone", Permissions::ALL)];
        let mut buf = BytesMut::new();
        Request::Create {
            path: "/node",
            data: b"payload",
            acl: &acl,
            flags: 1,
        }
        .encode(3, &mut buf);

        let mut reader = jute::JuteReader::new(&buf);
        assert_eq!(reader.read_i32().unwrap(), 3);
        assert_eq!(reader.read_i32().unwrap(), OpCode::Create as i32);
        assert_eq!(reader.read_string().unwrap(), "/node");
        assert_eq!(reader.read_buffer().unwrap(), b"payload".to_vec());
        assert_eq!(reader.read_acls().unwrap(), acl);
        assert_eq!(reader.read_i32().unwrap(), 1);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_error_codes_map_to_taxonomy() {
        assert!(matches!(
            error_from_code(code::NO_NODE, "/a"),
            NamespaceError::NoNode(p) if p == "/a"
        ));
        assert!(matches!(
            error_from_code(code::NOT_EMPTY, "/a"),
            NamespaceError::NotEmpty(_)
        ));
        assert!(error_from_code(code::SESSION_EXPIRED, "/a").is_connection());
        assert!(matches!(
            error_from_code(-999, "/a"),
            NamespaceError::Server { code: -999, .. }
        ));
    }
}
