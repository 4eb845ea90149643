//! Big-endian record encoding used on the wire.
//!
//! Strings, buffers and vectors are length-prefixed with an `i32`; a
//! length of `-1` denotes a null value, which decodes as empty.

use bytes::{Buf, BufMut, BytesMut};

use crate::acl::{Acl, Permissions};
use crate::error::NamespaceError;
use crate::session::Stat;

pub fn put_bool(buf: &mut BytesMut, value: bool) {
    buf.put_u8(value as u8);
}

pub fn put_str(buf: &mut BytesMut, value: &str) {
    put_buffer(buf, value.as_bytes());
}

pub fn put_buffer(buf: &mut BytesMut, value: &[u8]) {
    buf.put_i32(value.len() as i32);
    buf.put_slice(value);
}

pub fn put_acls(buf: &mut BytesMut, acls: &[Acl]) {
    buf.put_i32(acls.len() as i32);
    for acl in acls {
        buf.put_i32(acl.perms.bits() as i32);
        put_str(buf, &acl.scheme);
        put_str(buf, &acl.id);
    }
}

#[cfg(test)]
pub fn put_strings(buf: &mut BytesMut, values: &[String]) {
    buf.put_i32(values.len() as i32);
    for value in values {
        put_str(buf, value);
    }
}

#[cfg(test)]
pub fn put_stat(buf: &mut BytesMut, stat: &Stat) {
    buf.put_i64(stat.czxid);
    buf.put_i64(stat.mzxid);
    buf.put_i64(stat.ctime);
    buf.put_i64(stat.mtime);
    buf.put_i32(stat.version);
    buf.put_i32(stat.cversion);
    buf.put_i32(stat.aversion);
    buf.put_i64(stat.ephemeral_owner);
    buf.put_i32(stat.data_length);
    buf.put_i32(stat.num_children);
    buf.put_i64(stat.pzxid);
}

/// Cursor over one received frame
pub struct JuteReader<'a> {
    buf: &'a [u8],
}

impl<'a> JuteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, len: usize, what: &str) -> Result<(), NamespaceError> {
        if self.buf.remaining() < len {
            return Err(NamespaceError::Protocol(format!(
                "truncated frame reading {}: need {} bytes, have {}",
                what,
                len,
                self.buf.remaining()
            )));
        }
        Ok(())
    }

    pub fn read_i32(&mut self) -> Result<i32, NamespaceError> {
        self.ensure(4, "int")?;
        Ok(self.buf.get_i32())
    }

    pub fn read_i64(&mut self) -> Result<i64, NamespaceError> {
        self.ensure(8, "long")?;
        Ok(self.buf.get_i64())
    }

    pub fn read_bool(&mut self) -> Result<bool, NamespaceError> {
        self.ensure(1, "bool")?;
        Ok(self.buf.get_u8() != 0)
    }

    pub fn read_buffer(&mut self) -> Result<Vec<u8>, NamespaceError> {
        let len = self.read_i32()?;
        if len < 0 {
            return Ok(Vec::new());
        }
        let len = len as usize;
        self.ensure(len, "buffer")?;
        let value = self.buf[..len].to_vec();
        self.buf.advance(len);
        Ok(value)
    }

    pub fn read_string(&mut self) -> Result<String, NamespaceError> {
        let bytes = self.read_buffer()?;
        String::from_utf8(bytes)
            .map_err(|e| NamespaceError::Protocol(format!("invalid utf-8 string: {}", e)))
    }

    fn read_len(&mut self) -> Result<usize, NamespaceError> {
        Ok(self.read_i32()?.max(0) as usize)
    }

    pub fn read_strings(&mut self) -> Result<Vec<String>, NamespaceError> {
        let len = self.read_len()?;
        (0..len).map(|_| self.read_string()).collect()
    }

    pub fn read_acls(&mut self) -> Result<Vec<Acl>, NamespaceError> {
        let len = self.read_len()?;
        (0..len)
            .map(|_| {
                let perms = Permissions::from_bits(self.read_i32()?);
                let scheme = self.read_string()?;
                let id = self.read_string()?;
                Ok(Acl::new(scheme, id, perms))
            })
            .collect()
    }

    pub fn read_stat(&mut self) -> Result<Stat, NamespaceError> {
        Ok(Stat {
            czxid: self.read_i64()?,
            mzxid: self.read_i64()?,
            ctime: self.read_i64()?,
            mtime: self.read_i64()?,
            version: self.read_i32()?,
            cversion: self.read_i32()?,
            aversion: self.read_i32()?,
            ephemeral_owner: self.read_i64()?,
            data_length: self.read_i32()?,
            num_children: self.read_i32()?,
            pzxid: self.read_i64()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_buffer_reads_empty() {
        let mut buf = BytesMut::new();
        buf.put_i32(-1);
        let mut reader = JuteReader::new(&buf);
        assert!(reader.read_buffer().unwrap().is_empty());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncated_frame_is_protocol_error() {
        let mut buf = BytesMut::new();
        buf.put_i32(10);
        buf.put_slice(b"abc");
        let mut reader = JuteReader::new(&buf);
        assert!(matches!(
            reader.read_string(),
            Err(NamespaceError::Protocol(_))
        ));
    }

    #[test]
    fn test_acl_vector_layout() {
        let mut buf = BytesMut::new();
        put_acls(
            &mut buf,
            &[Acl::new("world", "anyone", Permissions::READ)],
        );
        assert_eq!(
            &buf[..],
            &[
                0, 0, 0, 1, // count
                0, 0, 0, 1, // perms
                0, 0, 0, 5, b'w', b'o', b'r', b'l', b'd', //
                0, 0, 0, 6, b'a', b'n', b'y', b'o', b'n', b'e',
            ][..]
        );
        let mut reader = JuteReader::new(&buf);
        let acls = reader.read_acls().unwrap();
        assert_eq!(acls[0].perms, Permissions::READ);
        assert_eq!(acls[0].id, "anyone");
    }
}
