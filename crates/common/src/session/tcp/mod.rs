//! Session over the coordination service's binary TCP protocol.
//!
//! One session is one TCP connection. Requests are sent strictly one at a
//! time and each waits for its own reply, so there is never more than one
//! outstanding xid. Pings and watch events arriving in between are skipped.

mod jute;
mod proto;

use std::time::Duration;

use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use self::jute::JuteReader;
use self::proto::{
    code, error_from_code, ConnectRequest, ConnectResponse, ReplyHeader, Request, ANY_VERSION,
    AUTH_XID, PING_XID, WATCH_XID,
};
use super::{Connector, Session, Stat};
use crate::acl::Acl;
use crate::config::ClientConfig;
use crate::error::NamespaceError;
use crate::flags::NodeFlags;

pub const DEFAULT_PORT: u16 = 2181;

const MAX_FRAME_LEN: i32 = 16 * 1024 * 1024;

/// `host` or `host:port`, defaulting the port. A bare IPv6 address has no
/// port and gets bracketed.
fn server_address(server: &str) -> String {
    match server.rsplit_once(':') {
        Some((host, port))
            if port.parse::<u16>().is_ok() && (!host.contains(':') || host.ends_with(']')) =>
        {
            server.to_string()
        }
        Some(_) if !server.starts_with('[') => format!("[{}]:{}", server, DEFAULT_PORT),
        _ => format!("{}:{}", server, DEFAULT_PORT),
    }
}

async fn write_frame(stream: &mut TcpStream, payload: &[u8]) -> Result<(), NamespaceError> {
    let mut frame = BytesMut::with_capacity(payload.len() + 4);
    frame.put_i32(payload.len() as i32);
    frame.put_slice(payload);
    stream.write_all(&frame).await?;
    Ok(())
}

async fn read_frame(stream: &mut TcpStream) -> Result<Vec<u8>, NamespaceError> {
    let len = stream.read_i32().await?;
    if !(0..=MAX_FRAME_LEN).contains(&len) {
        return Err(NamespaceError::Protocol(format!(
            "invalid frame length {}",
            len
        )));
    }
    let mut frame = vec![0; len as usize];
    stream.read_exact(&mut frame).await?;
    Ok(frame)
}

#[derive(Debug, Clone)]
pub struct TcpConnector {
    servers: Vec<String>,
    auth: Option<(String, Vec<u8>)>,
    session_timeout: Duration,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

impl TcpConnector {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            servers: config.servers.clone(),
            auth: config
                .auth
                .as_ref()
                .map(|auth| (auth.scheme.clone(), auth.credential.as_bytes().to_vec())),
            session_timeout: config.session_timeout,
            connect_timeout: config.connect_timeout,
            operation_timeout: config.operation_timeout,
        }
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    async fn handshake(&self, address: &str) -> Result<TcpSession, NamespaceError> {
        let mut stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;

        let mut buf = BytesMut::new();
        ConnectRequest {
            timeout_ms: self.session_timeout.as_millis() as i32,
        }
        .encode(&mut buf);
        write_frame(&mut stream, &buf).await?;

        let response = ConnectResponse::decode(&read_frame(&mut stream).await?)?;
        if response.timeout_ms <= 0 {
            return Err(NamespaceError::Connection(
                "session expired during handshake".to_string(),
            ));
        }
        tracing::debug!(
            server = address,
            session_id = %format!("{:#x}", response.session_id),
            timeout_ms = response.timeout_ms,
            protocol_version = response.protocol_version,
            "session established"
        );

        let mut session = TcpSession {
            stream: Some(stream),
            server: address.to_string(),
            session_id: response.session_id,
            xid: 0,
            operation_timeout: self.operation_timeout,
        };
        if let Some((scheme, credential)) = &self.auth {
            tracing::debug!("adding auth for scheme {}", scheme);
            session.authenticate(scheme, credential).await?;
        }
        Ok(session)
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Session = TcpSession;

    async fn open(&self) -> Result<Self::Session, NamespaceError> {
        let mut last_error = String::from("no servers configured");
        for server in &self.servers {
            let address = server_address(server);
            match timeout(self.connect_timeout, self.handshake(&address)).await {
                Ok(Ok(session)) => return Ok(session),
                Ok(Err(NamespaceError::AuthFailed)) => return Err(NamespaceError::AuthFailed),
                Ok(Err(e)) => {
                    tracing::debug!("failed to connect to {}: {}", address, e);
                    last_error = format!("{}: {}", address, e);
                }
                Err(_) => {
                    tracing::debug!("timed out connecting to {}", address);
                    last_error = format!("{}: connect timed out", address);
                }
            }
        }
        Err(NamespaceError::Connection(format!(
            "could not connect to [{}]: {}",
            self.servers.join(","),
            last_error
        )))
    }
}

#[derive(Debug)]
pub struct TcpSession {
    stream: Option<TcpStream>,
    server: String,
    session_id: i64,
    xid: i32,
    operation_timeout: Duration,
}

impl TcpSession {
    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    async fn authenticate(
        &mut self,
        scheme: &str,
        credential: &[u8],
    ) -> Result<(), NamespaceError> {
        self.send(AUTH_XID, Request::Auth { scheme, credential })
            .await
            .map(|_| ())
    }

    async fn call(&mut self, request: Request<'_>) -> Result<Vec<u8>, NamespaceError> {
        self.xid = self.xid.wrapping_add(1).max(1);
        let xid = self.xid;
        self.send(xid, request).await
    }

    /// Send one request and wait for its reply. A broken or timed-out
    ///  exchange poisons the session.
    async fn send(&mut self, xid: i32, request: Request<'_>) -> Result<Vec<u8>, NamespaceError> {
        let limit = self.operation_timeout;
        let outcome = timeout(limit, self.exchange(xid, request)).await;
        match outcome {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => {
                if e.is_connection() {
                    self.stream = None;
                }
                Err(e)
            }
            Err(_) => {
                self.stream = None;
                Err(NamespaceError::Connection(format!(
                    "{:?} on '{}' timed out after {:?}",
                    request.opcode(),
                    request.path(),
                    limit
                )))
            }
        }
    }

    async fn exchange(
        &mut self,
        xid: i32,
        request: Request<'_>,
    ) -> Result<Vec<u8>, NamespaceError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| NamespaceError::Connection("session is closed".to_string()))?;

        let mut buf = BytesMut::new();
        request.encode(xid, &mut buf);
        write_frame(stream, &buf).await?;

        loop {
            let frame = read_frame(stream).await?;
            let mut reader = JuteReader::new(&frame);
            let header = ReplyHeader::decode(&mut reader)?;
            if header.xid == PING_XID || header.xid == WATCH_XID {
                continue;
            }
            if header.xid != xid {
                return Err(NamespaceError::Protocol(format!(
                    "reply xid {} does not match request xid {}",
                    header.xid, xid
                )));
            }
            tracing::trace!(xid, zxid = header.zxid, err = header.err, "reply");
            if header.err != code::OK {
                return Err(error_from_code(header.err, request.path()));
            }
            let body_start = frame.len() - reader.remaining();
            return Ok(frame[body_start..].to_vec());
        }
    }
}

#[async_trait]
impl Session for TcpSession {
    async fn exists(&mut self, path: &str) -> Result<Option<Stat>, NamespaceError> {
        match self.call(Request::Exists { path }).await {
            Ok(body) => Ok(Some(JuteReader::new(&body).read_stat()?)),
            Err(NamespaceError::NoNode(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get(&mut self, path: &str) -> Result<(Vec<u8>, Stat), NamespaceError> {
        let body = self.call(Request::GetData { path }).await?;
        let mut reader = JuteReader::new(&body);
        let data = reader.read_buffer()?;
        Ok((data, reader.read_stat()?))
    }

    async fn children(&mut self, path: &str) -> Result<Vec<String>, NamespaceError> {
        let body = self.call(Request::GetChildren { path }).await?;
        JuteReader::new(&body).read_strings()
    }

    async fn create(
        &mut self,
        path: &str,
        data: &[u8],
        flags: NodeFlags,
        acl: &[Acl],
    ) -> Result<String, NamespaceError> {
        let body = self
            .call(Request::Create {
                path,
                data,
                acl,
                flags: flags.bits(),
            })
            .await?;
        JuteReader::new(&body).read_string()
    }

    async fn set_data(
        &mut self,
        path: &str,
        data: &[u8],
        version: Option<i32>,
    ) -> Result<Stat, NamespaceError> {
        let body = self
            .call(Request::SetData {
                path,
                data,
                version: version.unwrap_or(ANY_VERSION),
            })
            .await?;
        JuteReader::new(&body).read_stat()
    }

    async fn get_acl(&mut self, path: &str) -> Result<(Vec<Acl>, Stat), NamespaceError> {
        let body = self.call(Request::GetAcl { path }).await?;
        let mut reader = JuteReader::new(&body);
        let acl = reader.read_acls()?;
        Ok((acl, reader.read_stat()?))
    }

    async fn set_acl(
        &mut self,
        path: &str,
        acl: &[Acl],
        version: Option<i32>,
    ) -> Result<Stat, NamespaceError> {
        let body = self
            .call(Request::SetAcl {
                path,
                acl,
                version: version.unwrap_or(ANY_VERSION),
            })
            .await?;
        JuteReader::new(&body).read_stat()
    }

    async fn delete(&mut self, path: &str, version: Option<i32>) -> Result<(), NamespaceError> {
        self.call(Request::Delete {
            path,
            version: version.unwrap_or(ANY_VERSION),
        })
        .await
        .map(|_| ())
    }

    async fn close(&mut self) -> Result<(), NamespaceError> {
        if self.stream.is_none() {
            return Ok(());
        }
        let result = self.call(Request::CloseSession).await.map(|_| ());
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        tracing::debug!(
            session_id = %format!("{:#x}", self.session_id),
            "session closed"
        );
        result
    }
}
