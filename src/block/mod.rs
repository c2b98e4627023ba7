/*!
The length-prefixed block and section container protocol.

A save file is a run of *raw blocks*: a 4-byte little endian length, that many
payload bytes, then up to 3 alignment bytes back to a 4-byte boundary. A
section that carries a tag nests a *tagged block* in the raw payload: the
4-character tag, a 4-byte inner length, then the inner payload, with the outer
length exactly `inner + 8`.

The first `section_count` blocks (a [FileFormat] property) are domain
sections; everything after them is pad-to-target filler; the final 4 bytes of
the file are the checksum trailer: the byte-wise sum, mod 2^32, of every
byte before it.

Tag and length validation is unconditional. The games only assert these in
debug builds; here a mismatch is always a
[`FormatMismatch`](crate::ErrorKind::FormatMismatch) and the operation is
abandoned, because nothing after a misplaced length can be trusted.
*/

mod save;

pub use self::save::{SaveFile, SaveState, Section};

use crate::errors::FormatError;
use crate::{Deserializer, Error, FileFormat, PaddingMode, SaveData, Serializer};
use std::fmt;

/// A fixed 4-character ASCII marker identifying a tagged block
///
/// ```
/// use ganton::BlockTag;
///
/// const SCRIPTS: BlockTag = BlockTag::new(*b"SCR\0");
/// assert_eq!(SCRIPTS.to_string(), "SCR");
/// assert_eq!(BlockTag::parse("SCR").unwrap(), SCRIPTS);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockTag([u8; 4]);

impl BlockTag {
    /// Creates a tag from its exact wire bytes
    pub const fn new(bytes: [u8; 4]) -> BlockTag {
        BlockTag(bytes)
    }

    /// Creates a tag from a label of at most 4 ASCII characters, NUL padded
    pub fn parse(label: &str) -> Result<BlockTag, Error> {
        if label.len() > 4 || !label.is_ascii() {
            return Err(Error::invalid(format!(
                "block tag must be at most 4 ascii characters: {:?}",
                label
            )));
        }
        let mut bytes = [0u8; 4];
        bytes[..label.len()].copy_from_slice(label.as_bytes());
        Ok(BlockTag(bytes))
    }

    /// The exact 4 wire bytes
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.0 {
            if b == 0 {
                break;
            }
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BlockTag({})", self)
    }
}

/// Byte-wise arithmetic sum of the buffer, modulo 2^32.
///
/// This is the whole checksum: the games sum each byte into a 32 bit
/// accumulator and store the result little endian after the last padding
/// block.
///
/// ```
/// use ganton::checksum;
///
/// assert_eq!(checksum(&[]), 0);
/// assert_eq!(checksum(&[1, 2, 3]), 6);
/// assert_eq!(checksum(&[0xFF; 5]), 0x4FB);
/// ```
pub fn checksum(data: &[u8]) -> u32 {
    data.iter()
        .fold(0u32, |sum, b| sum.wrapping_add(u32::from(*b)))
}

/// Reads raw and tagged blocks out of a save buffer
#[derive(Debug)]
pub struct BlockReader<'a> {
    de: Deserializer<'a>,
    max_block_size: u32,
}

impl<'a> BlockReader<'a> {
    /// Read blocks from `data` under the given format's limits.
    ///
    /// `data` should not include the checksum trailer; strip it (or use
    /// [SaveFile::load](crate::SaveFile::load), which does).
    pub fn new(data: &'a [u8], format: &FileFormat) -> BlockReader<'a> {
        BlockReader {
            de: Deserializer::from_slice(data),
            max_block_size: format.max_block_size(),
        }
    }

    /// Byte offset of the next block
    pub fn position(&self) -> usize {
        self.de.position()
    }

    /// Bytes left in the buffer
    pub fn remaining(&self) -> usize {
        self.de.remaining()
    }

    /// Consume one block and return its (inner) payload.
    ///
    /// With an expected tag, the tag must match and the inner length must be
    /// the outer length minus the 8-byte tag header. Afterwards the stream is
    /// realigned to a 4-byte boundary.
    pub fn read_block(&mut self, expected_tag: Option<BlockTag>) -> Result<&'a [u8], Error> {
        let block_start = self.de.position();
        let outer = self.de.read_u32()?;
        if outer > self.max_block_size {
            return Err(FormatError::BlockTooLarge {
                offset: block_start,
                len: outer,
                max: self.max_block_size,
            }
            .into());
        }

        let payload = match expected_tag {
            Some(expected) => {
                let tag_offset = self.de.position();
                let mut actual = [0u8; 4];
                actual.copy_from_slice(self.de.read_bytes(4)?);
                let actual = BlockTag::new(actual);
                if actual != expected {
                    return Err(FormatError::TagMismatch {
                        offset: tag_offset,
                        expected,
                        actual,
                    }
                    .into());
                }

                let inner_offset = self.de.position();
                let inner = self.de.read_u32()?;
                if outer.checked_sub(8) != Some(inner) {
                    return Err(FormatError::LengthMismatch {
                        offset: inner_offset,
                        outer,
                        inner,
                    }
                    .into());
                }
                self.de.read_bytes(inner as usize)?
            }
            None => self.de.read_bytes(outer as usize)?,
        };

        self.de.align(4)?;
        Ok(payload)
    }

    /// Consume one block and decode its payload as a [SaveData] record
    pub fn read_section<T: SaveData>(
        &mut self,
        expected_tag: Option<BlockTag>,
        format: &FileFormat,
    ) -> Result<T, Error> {
        let payload = self.read_block(expected_tag)?;
        let mut de = Deserializer::from_slice(payload);
        de.read_value(format)
    }
}

/// Writes raw and tagged blocks into a save buffer
#[derive(Debug)]
pub struct BlockWriter {
    ser: Serializer,
    max_block_size: u32,
}

impl BlockWriter {
    /// Write blocks under the given format's limits, zero filling gaps
    pub fn new(format: &FileFormat) -> BlockWriter {
        BlockWriter::with_padding(format, PaddingMode::Zeros)
    }

    /// Write blocks with the given filler policy
    pub fn with_padding(format: &FileFormat, padding: PaddingMode) -> BlockWriter {
        BlockWriter {
            ser: Serializer::with_padding(padding),
            max_block_size: format.max_block_size(),
        }
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.ser.position()
    }

    /// View the bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        self.ser.as_bytes()
    }

    /// Write one block around the given payload, then realign to 4 bytes
    pub fn write_block(&mut self, tag: Option<BlockTag>, payload: &[u8]) -> Result<(), Error> {
        let header = if tag.is_some() { 8 } else { 0 };
        let outer = payload
            .len()
            .checked_add(header)
            .and_then(|len| u32::try_from(len).ok())
            .ok_or_else(|| Error::invalid("block payload does not fit a 32 bit length"))?;
        if outer > self.max_block_size {
            return Err(FormatError::BlockTooLarge {
                offset: self.ser.position(),
                len: outer,
                max: self.max_block_size,
            }
            .into());
        }

        self.ser.write_u32(outer);
        if let Some(tag) = tag {
            self.ser.write_bytes(tag.as_bytes());
            self.ser.write_u32(payload.len() as u32);
        }
        self.ser.write_bytes(payload);
        self.ser.align(4)
    }

    /// Serialize a record and write it as one block
    pub fn write_section<T: SaveData>(
        &mut self,
        tag: Option<BlockTag>,
        record: &T,
        format: &FileFormat,
    ) -> Result<(), Error> {
        let mut payload = Serializer::with_padding(self.ser.padding_mode().clone());
        payload.write_value(record, format)?;
        self.write_block(tag, payload.as_bytes())
    }

    /// Emit padding-only blocks until exactly `target` bytes are written.
    ///
    /// Shortfall is always covered by whole blocks (a 4-byte length prefix
    /// plus filler payload), never by truncation. Every block ends on a
    /// 4-byte boundary, so a `target` that is not a multiple of 4, like one
    /// below the current position, is rejected rather than written as an
    /// image the reader cannot walk.
    pub fn pad_to(&mut self, target: usize) -> Result<(), Error> {
        if target % 4 != 0 {
            return Err(Error::invalid(format!(
                "target size {} is not a multiple of the 4 byte block alignment",
                target
            )));
        }
        if target < self.ser.position() {
            return Err(Error::invalid(format!(
                "target size {} is below the {} bytes already written",
                target,
                self.ser.position()
            )));
        }

        while self.ser.position() < target {
            // the position only ever advances in multiples of 4, so the
            // shortfall always covers a length prefix
            let remaining = target - self.ser.position();
            debug_assert!(remaining >= 4 && remaining % 4 == 0);

            let payload = (remaining - 4).min(self.max_block_size as usize) & !3;
            self.ser.write_u32(payload as u32);
            self.ser.pad(payload)?;
        }
        Ok(())
    }

    /// Append the checksum trailer and return the finished buffer
    pub fn finish(mut self) -> Vec<u8> {
        let sum = checksum(self.ser.as_bytes());
        self.ser.write_u32(sum);
        self.ser.into_bytes()
    }
}
