use super::padding::check_word_size;
use crate::util::align_up;
use crate::{Error, ErrorKind};

/// Nesting budget for [SaveData](crate::SaveData) reads. The record schemas
/// the games ship bottom out well under this; untrusted input that asks for
/// more is refused rather than fed to the call stack.
const MAX_DEPTH: usize = 24;

/// Position-advancing reader over an in-memory save buffer.
///
/// All multi-byte values are little endian on every supported platform. Reads
/// that would pass the end of the buffer fail with
/// [`StreamExhausted`](crate::ErrorKind::StreamExhausted) and never return a
/// short result.
///
/// ```
/// use ganton::Deserializer;
///
/// let mut de = Deserializer::from_slice(&[0x2A, 0x00, 0x00, 0x00, 0x01]);
/// assert_eq!(de.read_u32()?, 42);
/// assert_eq!(de.read_bool(1)?, true);
/// assert_eq!(de.position(), 5);
/// # Ok::<(), ganton::Error>(())
/// ```
#[derive(Debug)]
pub struct Deserializer<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Deserializer<'a> {
    /// Read from a byte slice
    pub fn from_slice(data: &'a [u8]) -> Deserializer<'a> {
        Deserializer {
            data,
            pos: 0,
            depth: 0,
        }
    }

    /// Byte offset of the next read
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in the buffer
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Consume and return the next `len` bytes
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        match self
            .pos
            .checked_add(len)
            .and_then(|end| self.data.get(self.pos..end))
        {
            Some(bytes) => {
                self.pos += len;
                Ok(bytes)
            }
            None => Err(self.exhausted(len)),
        }
    }

    /// Consume `len` bytes without looking at them
    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        self.read_bytes(len).map(|_| ())
    }

    /// Skip the gap up to the next multiple of `word`.
    ///
    /// The gap's content is alignment filler and is not interpreted.
    pub fn align(&mut self, word: usize) -> Result<(), Error> {
        check_word_size(word)?;
        let gap = align_up(self.pos, word) - self.pos;
        self.skip(gap)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.read_bytes(1).map(|b| b[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        self.read_u8().map(|b| b as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.read_bytes(2).map(|b| u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, Error> {
        self.read_u16().map(|v| v as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.read_bytes(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, Error> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.read_u64().map(|v| v as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_u32().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.read_u64().map(f64::from_bits)
    }

    /// Read a `width`-byte boolean: true iff any of the bytes is nonzero.
    ///
    /// The games store booleans at whatever width the surrounding record
    /// happens to use (1, 2, and 4 all occur), and some writers leave garbage
    /// in the upper bytes.
    pub fn read_bool(&mut self, width: usize) -> Result<bool, Error> {
        if width == 0 {
            return Err(Error::invalid("boolean width must be at least one byte"));
        }
        let bytes = self.read_bytes(width)?;
        Ok(bytes.iter().any(|b| *b != 0))
    }

    /// Read one single-byte character (Latin-1)
    pub fn read_char(&mut self) -> Result<char, Error> {
        self.read_u8().map(char::from)
    }

    /// Read one UTF-16LE code unit as a character.
    ///
    /// There is no surrogate pair support in the on-disk format; a lone
    /// surrogate unit decodes as U+FFFD.
    pub fn read_wchar(&mut self) -> Result<char, Error> {
        self.read_u16().map(decode_utf16_unit)
    }

    /// Read a fixed-length single-byte string.
    ///
    /// Exactly `len` bytes are consumed; the returned string stops at the
    /// first embedded NUL.
    pub fn read_string(&mut self, len: usize) -> Result<String, Error> {
        let bytes = self.read_bytes(len)?;
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(len);
        Ok(bytes[..end].iter().map(|b| char::from(*b)).collect())
    }

    /// Read a fixed-length UTF-16LE string.
    ///
    /// Exactly `2 * len` bytes are consumed; the returned string stops at the
    /// first NUL code unit.
    pub fn read_wstring(&mut self, len: usize) -> Result<String, Error> {
        let bytes = self.read_bytes(len * 2)?;
        let mut out = String::new();
        for chunk in bytes.chunks_exact(2) {
            let unit = u16::from_le_bytes([chunk[0], chunk[1]]);
            if unit == 0 {
                break;
            }
            out.push(decode_utf16_unit(unit));
        }
        Ok(out)
    }

    /// Read a NUL-terminated single-byte string of unbounded length
    pub fn read_string_var(&mut self) -> Result<String, Error> {
        let mut out = String::new();
        loop {
            match self.read_u8()? {
                0 => return Ok(out),
                b => out.push(char::from(b)),
            }
        }
    }

    /// Read a NUL-terminated UTF-16LE string of unbounded length
    pub fn read_wstring_var(&mut self) -> Result<String, Error> {
        let mut out = String::new();
        loop {
            match self.read_u16()? {
                0 => return Ok(out),
                unit => out.push(decode_utf16_unit(unit)),
            }
        }
    }

    pub(crate) fn enter(&mut self) -> Result<(), Error> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::new(ErrorKind::DepthLimit { offset: self.pos }));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        debug_assert!(self.depth > 0);
        self.depth -= 1;
    }

    #[cold]
    #[inline(never)]
    fn exhausted(&self, needed: usize) -> Error {
        Error::new(ErrorKind::StreamExhausted {
            offset: self.pos,
            needed,
        })
    }
}

fn decode_utf16_unit(unit: u16) -> char {
    char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)
}
