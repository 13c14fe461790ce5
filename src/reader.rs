use crate::error::{DecodeError, Result};

/// Big-endian cursor over class-file bytes.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(DecodeError::TruncatedInput {
                offset: self.pos,
                needed: len,
            });
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn read_u1(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u2(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u4(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i4(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i8(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn read_f4(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f8(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }
}

/// Decodes the JVM's modified UTF-8 (two-byte NUL, surrogate pairs encoded
/// as two three-byte sequences). Returns `None` on a broken byte sequence.
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    if bytes.is_ascii() {
        return std::str::from_utf8(bytes).ok().map(str::to_string);
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = continuation(bytes, i + 1)?;
            units.push((u16::from(b & 0x1F) << 6) | b2);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = continuation(bytes, i + 1)?;
            let b3 = continuation(bytes, i + 2)?;
            units.push((u16::from(b & 0x0F) << 12) | (b2 << 6) | b3);
            i += 3;
        } else {
            return None;
        }
    }

    Some(String::from_utf16_lossy(&units))
}

fn continuation(bytes: &[u8], i: usize) -> Option<u16> {
    let b = *bytes.get(i)?;
    if b & 0xC0 != 0x80 {
        return None;
    }
    Some(u16::from(b & 0x3F))
}
