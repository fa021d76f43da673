use byteorder::{ByteOrder, LittleEndian};

use crate::opcode::{Opcode, Token};

/// Forward-only cursor over a script snapshot.
///
/// Every read is lenient: when fewer bytes remain than a read needs, the read
/// yields the zero value and the position is clamped to the end of the buffer.
/// The position never moves past `size()`.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn size(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            self.pos = self.buf.len();
            return None;
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(s)
    }

    pub fn get_u8(&mut self) -> u8 {
        self.take(1).map(|b| b[0]).unwrap_or_default()
    }

    pub fn get_i16(&mut self) -> i16 {
        self.take(2).map(LittleEndian::read_i16).unwrap_or_default()
    }

    pub fn get_u16(&mut self) -> u16 {
        self.take(2).map(LittleEndian::read_u16).unwrap_or_default()
    }

    pub fn get_i32(&mut self) -> i32 {
        self.take(4).map(LittleEndian::read_i32).unwrap_or_default()
    }

    pub fn get_u32(&mut self) -> u32 {
        self.take(4).map(LittleEndian::read_u32).unwrap_or_default()
    }

    pub fn get_i64(&mut self) -> i64 {
        self.take(8).map(LittleEndian::read_i64).unwrap_or_default()
    }

    pub fn get_u64(&mut self) -> u64 {
        self.take(8).map(LittleEndian::read_u64).unwrap_or_default()
    }

    pub fn get_f32(&mut self) -> f32 {
        self.take(4).map(LittleEndian::read_f32).unwrap_or_default()
    }

    pub fn get_f64(&mut self) -> f64 {
        self.take(8).map(LittleEndian::read_f64).unwrap_or_default()
    }

    /// A raw 64-bit value that names an object, property or function.
    pub fn get_reference(&mut self) -> u64 {
        self.get_u64()
    }

    /// Single-byte characters up to a NUL or the end of the buffer. The NUL is
    /// consumed but not returned.
    pub fn get_ascii_string(&mut self) -> String {
        let mut out = String::new();
        while let Some(&b) = self.buf.get(self.pos) {
            self.pos += 1;
            if b == 0 {
                break;
            }
            out.push(b as char);
        }
        out
    }

    /// Little-endian UTF-16 units up to a zero unit or the end of the buffer.
    /// Units outside ASCII are written as `\uXXXX`.
    pub fn get_utf16_string(&mut self) -> String {
        let mut out = String::new();
        while let Some(unit) = self.take(2).map(LittleEndian::read_u16) {
            if unit == 0 {
                break;
            }
            if unit < 128 {
                out.push(unit as u8 as char);
            } else {
                out.push_str(&format!("\\u{unit:04X}"));
            }
        }
        out
    }

    /// The token at the cursor without consuming it. Past the end this is
    /// always `EndOfScript`.
    pub fn peek_token(&self) -> Token {
        match self.buf.get(self.pos) {
            Some(&b) => Token::from_byte(b),
            None => Token::Op(Opcode::EndOfScript),
        }
    }

    pub fn get_token(&mut self) -> Token {
        Token::from_byte(self.get_u8())
    }

    pub fn skip(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.buf.len());
    }
}
