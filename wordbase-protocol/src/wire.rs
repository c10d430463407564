//! Primitive readers and writers for the fixed set of encodings the codec
//! uses: single bytes, big-endian 16-bit integers, and length-prefixed
//! UTF-8 strings with either an 8- or 16-bit length, plus the "optional
//! single character" encoding used for blank-tile letters.

use crate::error::ProtocolError;
use std::io::Read;

pub fn write_u8(buf: &mut Vec<u8>, value: u8) {
    buf.push(value);
}

pub fn write_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub fn write_i16(buf: &mut Vec<u8>, value: i16) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// `u8` length prefix followed by the raw UTF-8 bytes.
pub fn write_str8(buf: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    debug_assert!(bytes.len() <= u8::MAX as usize, "str8 payload too long");
    write_u8(buf, bytes.len() as u8);
    buf.extend_from_slice(bytes);
}

/// `u16` length prefix followed by the raw UTF-8 bytes.
pub fn write_str16(buf: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    debug_assert!(bytes.len() <= u16::MAX as usize, "str16 payload too long");
    write_u16(buf, bytes.len() as u16);
    buf.extend_from_slice(bytes);
}

/// A `u8` length where `0` means "absent"; otherwise that many UTF-8 bytes.
/// In practice the payload is always a single ASCII letter or nothing.
pub fn write_opt_str(buf: &mut Vec<u8>, value: Option<char>) {
    match value {
        None => write_u8(buf, 0),
        Some(c) => {
            let mut tmp = [0u8; 4];
            let s = c.encode_utf8(&mut tmp);
            write_str8(buf, s);
        }
    }
}

pub fn read_u8(r: &mut impl Read) -> Result<u8, ProtocolError> {
    let mut byte = [0u8; 1];
    r.read_exact(&mut byte).map_err(map_eof)?;
    Ok(byte[0])
}

pub fn read_u16(r: &mut impl Read) -> Result<u16, ProtocolError> {
    let mut bytes = [0u8; 2];
    r.read_exact(&mut bytes).map_err(map_eof)?;
    Ok(u16::from_be_bytes(bytes))
}

pub fn read_i16(r: &mut impl Read) -> Result<i16, ProtocolError> {
    let mut bytes = [0u8; 2];
    r.read_exact(&mut bytes).map_err(map_eof)?;
    Ok(i16::from_be_bytes(bytes))
}

pub fn read_str8(r: &mut impl Read) -> Result<String, ProtocolError> {
    let len = read_u8(r)? as usize;
    read_utf8(r, len)
}

pub fn read_str16(r: &mut impl Read) -> Result<String, ProtocolError> {
    let len = read_u16(r)? as usize;
    read_utf8(r, len)
}

pub fn read_opt_str(r: &mut impl Read) -> Result<Option<char>, ProtocolError> {
    let len = read_u8(r)? as usize;
    if len == 0 {
        return Ok(None);
    }
    let s = read_utf8(r, len)?;
    s.chars().next().map(Some).ok_or(ProtocolError::InvalidUtf8)
}

fn read_utf8(r: &mut impl Read, len: usize) -> Result<String, ProtocolError> {
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes).map_err(map_eof)?;
    String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8)
}

/// `read_exact` on a closed stream reports `UnexpectedEof`; we want that to
/// surface as a clean disconnect rather than a generic io error when it
/// happens on the very first byte of a message.
fn map_eof(e: std::io::Error) -> ProtocolError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ProtocolError::Eof
    } else {
        ProtocolError::Io(e)
    }
}
