// src/utils/json.rs

//! Canonical JSON encoding of the discovery document.
//!
//! The published bytes must be identical for identical content: keys are
//! sorted, separators are compact, and everything outside printable ASCII
//! is escaped, so the file never depends on the reader's charset.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::error::Result;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Compact formatter that writes non-ASCII characters and DEL as `\uXXXX`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\x7f' {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write_unit(writer, *unit)?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

fn write_unit<W: ?Sized + Write>(writer: &mut W, unit: u16) -> io::Result<()> {
    let bytes = [
        b'\\',
        b'u',
        HEX[usize::from(unit >> 12)],
        HEX[usize::from((unit >> 8) & 0xf)],
        HEX[usize::from((unit >> 4) & 0xf)],
        HEX[usize::from(unit & 0xf)],
    ];
    writer.write_all(&bytes)
}

/// Encode `value` canonically, terminated by `\r\n`.
///
/// The value goes through `serde_json::Value` first, whose object map keeps
/// keys sorted.
pub fn encode_canonical<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let tree = serde_json::to_value(value)?;
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, AsciiFormatter);
    tree.serialize(&mut serializer)?;
    buf.extend_from_slice(b"\r\n");
    Ok(buf)
}
