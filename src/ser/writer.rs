use super::padding::{check_word_size, PaddingMode};
use crate::util::align_up;
use crate::Error;

/// Position-advancing writer that builds an in-memory save buffer.
///
/// Counterpart to [Deserializer](crate::Deserializer); everything is little
/// endian. Plain integer and float writes cannot fail and so return nothing;
/// operations with arguments to validate return a `Result`.
///
/// ```
/// use ganton::Serializer;
///
/// let mut ser = Serializer::new();
/// ser.write_u32(42);
/// ser.write_string("ABC", 8, true)?;
/// assert_eq!(ser.position(), 12);
/// assert_eq!(&ser.as_bytes()[4..], b"ABC\0\0\0\0\0");
/// # Ok::<(), ganton::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Serializer {
    buf: Vec<u8>,
    padding: PaddingMode,
}

impl Serializer {
    /// Creates a writer that fills gaps with zeros
    pub fn new() -> Serializer {
        Serializer::default()
    }

    /// Creates a writer with the given filler policy
    pub fn with_padding(padding: PaddingMode) -> Serializer {
        Serializer {
            buf: Vec::new(),
            padding,
        }
    }

    /// The active filler policy
    pub fn padding_mode(&self) -> &PaddingMode {
        &self.padding
    }

    /// Bytes written so far
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// View the bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return the buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_u16(value as u16);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_u64(value as u64);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    /// Write a `width`-byte boolean in canonical form: the first byte is 0 or
    /// 1 and the remaining bytes are zero regardless of the filler policy.
    pub fn write_bool(&mut self, value: bool, width: usize) -> Result<(), Error> {
        if width == 0 {
            return Err(Error::invalid("boolean width must be at least one byte"));
        }
        self.write_u8(u8::from(value));
        self.buf.resize(self.buf.len() + width - 1, 0);
        Ok(())
    }

    /// Write one single-byte character.
    ///
    /// Characters above U+00FF do not fit a byte and are rejected.
    pub fn write_char(&mut self, value: char) -> Result<(), Error> {
        let code = u32::from(value);
        if code > 0xFF {
            return Err(Error::invalid(format!(
                "character {:?} does not fit a single byte",
                value
            )));
        }
        self.write_u8(code as u8);
        Ok(())
    }

    /// Write one character as a UTF-16LE code unit.
    ///
    /// There is no surrogate pair support; characters above U+FFFF are
    /// rejected. Surrogate code points themselves cannot reach here; a Rust
    /// `char` cannot hold one.
    pub fn write_wchar(&mut self, value: char) -> Result<(), Error> {
        let code = u32::from(value);
        if code > 0xFFFF {
            return Err(Error::invalid(format!(
                "character {:?} does not fit a single UTF-16 code unit",
                value
            )));
        }
        self.write_u16(code as u16);
        Ok(())
    }

    /// Write a single-byte string occupying exactly `len` bytes.
    ///
    /// The value is truncated to `len` characters (`len - 1` when
    /// `zero_terminate` is set, leaving room for the NUL) and the remainder is
    /// zero filled. A value that fills every slot with `zero_terminate` off
    /// carries no terminator at all.
    pub fn write_string(
        &mut self,
        value: &str,
        len: usize,
        zero_terminate: bool,
    ) -> Result<(), Error> {
        let budget = if zero_terminate {
            len.saturating_sub(1)
        } else {
            len
        };
        let mut written = 0;
        for c in value.chars().take(budget) {
            self.write_char(c)?;
            written += 1;
        }
        self.buf.resize(self.buf.len() + (len - written), 0);
        Ok(())
    }

    /// Write a UTF-16LE string occupying exactly `len` code units (`2 * len`
    /// bytes), with the same truncation and zero-fill rules as
    /// [write_string](Self::write_string).
    pub fn write_wstring(
        &mut self,
        value: &str,
        len: usize,
        zero_terminate: bool,
    ) -> Result<(), Error> {
        let budget = if zero_terminate {
            len.saturating_sub(1)
        } else {
            len
        };
        let mut written = 0;
        for c in value.chars().take(budget) {
            self.write_wchar(c)?;
            written += 1;
        }
        self.buf.resize(self.buf.len() + (len - written) * 2, 0);
        Ok(())
    }

    /// Write a single-byte string of its natural length plus one terminator
    pub fn write_string_var(&mut self, value: &str) -> Result<(), Error> {
        for c in value.chars() {
            self.write_char(c)?;
        }
        self.write_u8(0);
        Ok(())
    }

    /// Write a UTF-16LE string of its natural length plus one terminator
    pub fn write_wstring_var(&mut self, value: &str) -> Result<(), Error> {
        for c in value.chars() {
            self.write_wchar(c)?;
        }
        self.write_u16(0);
        Ok(())
    }

    /// Emit filler up to the next multiple of `word`, per the filler policy
    pub fn align(&mut self, word: usize) -> Result<(), Error> {
        check_word_size(word)?;
        let gap = align_up(self.position(), word) - self.position();
        self.pad(gap)
    }

    /// Emit `len` filler bytes per the filler policy
    pub fn pad(&mut self, len: usize) -> Result<(), Error> {
        // the policy is cloned so it can borrow the buffer mutably
        let padding = self.padding.clone();
        padding.fill(&mut self.buf, len)
    }
}
