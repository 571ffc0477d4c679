//! Component A/B: the IFF `FORM`/chunk framing layer.
//!
//! IFF chunk headers are big-endian regardless of what's inside the payload (`HEDR`, `PALT`
//! and opcode streams are little-endian, per the byte-level framing note in the spec).

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::{Result, TgrError};

/// A child chunk discovered while walking a `FORM`'s payload.
///
/// Chunks are referenced by `(type, data_offset, length)` only — no implicit copying happens
/// until a consumer (the header/palette codec, or the frame driver) asks for the bytes at that
/// offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IffChunk {
    pub chunk_type: [u8; 4],
    pub data_offset: u64,
    pub length: u32,
}

impl IffChunk {
    /// Length including the padding byte inserted to keep chunks at even offsets.
    pub fn padded_length(&self) -> u64 {
        u64::from(self.length) + (self.length as u64 & 1)
    }

    pub fn type_str(&self) -> &str {
        std::str::from_utf8(&self.chunk_type).unwrap_or("????")
    }
}

fn read_type<R: Read>(reader: &mut R) -> Result<[u8; 4]> {
    let mut chunk_type = [0u8; 4];
    reader.read_exact(&mut chunk_type).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            TgrError::Truncated
        } else {
            TgrError::Io(err)
        }
    })?;
    if !chunk_type.iter().all(u8::is_ascii) {
        return Err(TgrError::InvalidChunkType);
    }
    Ok(chunk_type)
}

/// The parsed top-level `FORM` chunk: its form-type tag and the flat list of child chunks
/// found directly inside it. Nested `FORM`s are not expected in `TGAR` and are not recursed
/// into.
pub struct IffForm {
    pub form_type: [u8; 4],
    pub children: Vec<IffChunk>,
}

impl IffForm {
    /// Find the first child chunk with the given type tag.
    pub fn find(&self, chunk_type: &[u8; 4]) -> Option<&IffChunk> {
        self.children.iter().find(|c| &c.chunk_type == chunk_type)
    }
}

/// Parse the `FORM` header and walk its children.
///
/// `stream` must be positioned at the very start of the file (the `FORM` tag). On success the
/// stream is left positioned just past the last child's payload (and its pad byte, if any).
pub fn parse_form<R: Read>(stream: &mut R) -> Result<IffForm> {
    let chunk_type = read_type(stream)?;
    if &chunk_type != b"FORM" {
        return Err(TgrError::NotIff);
    }

    let form_length = stream.read_u32::<BigEndian>().map_err(io_to_truncated)?;
    let form_type = read_type(stream)?;

    // `form_length` counts the form-type tag (4 bytes) plus every child chunk record that
    // follows it.
    let mut remaining = u64::from(form_length)
        .checked_sub(4)
        .ok_or(TgrError::Truncated)?;

    let mut offset: u64 = 12; // FORM(4) + length(4) + form_type(4)
    let mut children = Vec::new();

    while remaining > 0 {
        let child_type = read_type(stream)?;
        let child_length = stream.read_u32::<BigEndian>().map_err(io_to_truncated)?;
        let data_offset = offset + 8;

        let mut payload = vec![0u8; child_length as usize];
        stream.read_exact(&mut payload).map_err(io_to_truncated)?;
        if child_length & 1 == 1 {
            let mut pad = [0u8; 1];
            stream.read_exact(&mut pad).map_err(io_to_truncated)?;
        }

        let padded = u64::from(child_length) + (child_length as u64 & 1);
        let consumed = 8 + padded;
        remaining = remaining.checked_sub(consumed).ok_or(TgrError::Truncated)?;
        offset += consumed;

        children.push(IffChunk { chunk_type: child_type, data_offset, length: child_length });
    }

    Ok(IffForm { form_type, children })
}

fn io_to_truncated(err: io::Error) -> TgrError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        TgrError::Truncated
    } else {
        TgrError::Io(err)
    }
}

/// Write a complete `FORM` chunk: `form_type` plus an ordered list of `(type, payload)` child
/// chunks. No validation of child content is performed here — callers (the header/palette/
/// frame codecs) are responsible for producing well-formed payloads.
pub fn write_form<W: Write>(writer: &mut W, form_type: &[u8; 4], children: &[(&[u8; 4], &[u8])]) -> Result<()> {
    let mut body_len: u64 = 4; // form_type
    for (_, payload) in children {
        body_len += 8 + payload.len() as u64 + (payload.len() as u64 & 1);
    }

    writer.write_all(b"FORM")?;
    writer.write_u32::<BigEndian>(body_len as u32)?;
    writer.write_all(form_type)?;

    for (chunk_type, payload) in children {
        writer.write_all(*chunk_type)?;
        writer.write_u32::<BigEndian>(payload.len() as u32)?;
        writer.write_all(payload)?;
        if payload.len() & 1 == 1 {
            writer.write_u8(0)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip_two_children() {
        let mut buf = Vec::new();
        write_form(&mut buf, b"TGAR", &[(b"HEDR", &[1, 2, 3, 4]), (b"FRAM", &[9, 9, 9])]).unwrap();

        let mut cursor = Cursor::new(buf);
        let form = parse_form(&mut cursor).unwrap();
        assert_eq!(&form.form_type, b"TGAR");
        assert_eq!(form.children.len(), 2);
        assert_eq!(&form.children[0].chunk_type, b"HEDR");
        assert_eq!(form.children[0].length, 4);
        assert_eq!(&form.children[1].chunk_type, b"FRAM");
        assert_eq!(form.children[1].length, 3);
    }

    #[test]
    fn iff_sanity_invariant() {
        let mut buf = Vec::new();
        write_form(&mut buf, b"TGAR", &[(b"HEDR", &[0u8; 5]), (b"PALT", &[0u8; 2])]).unwrap();
        let mut cursor = Cursor::new(buf.clone());
        let form = parse_form(&mut cursor).unwrap();

        let sum: u64 = form.children.iter().map(|c| 8 + u64::from(c.length) + (c.length as u64 & 1)).sum();
        let form_length = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
        assert_eq!(sum, u64::from(form_length) - 4);
    }

    #[test]
    fn rejects_non_form_magic() {
        let mut cursor = Cursor::new(b"XXXX\x00\x00\x00\x04ABCD".to_vec());
        assert!(matches!(parse_form(&mut cursor), Err(TgrError::NotIff)));
    }

    #[test]
    fn odd_length_child_is_padded() {
        let mut buf = Vec::new();
        write_form(&mut buf, b"TGAR", &[(b"HEDR", &[1, 2, 3])]).unwrap();
        // form body = 4 (type) + 8 (child header) + 3 (payload) + 1 (pad) = 16
        assert_eq!(u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]), 16);

        let mut cursor = Cursor::new(buf);
        let form = parse_form(&mut cursor).unwrap();
        assert_eq!(form.children[0].length, 3);
    }
}
