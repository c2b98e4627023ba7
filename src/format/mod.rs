/*!
File format identities for the supported platform and distribution variants.

Every layer of the codec is parameterized by a [FileFormat]: section counts,
per-section tags, and size limits are format properties, never global
constants. Two platforms that share the outer container shape can still
disagree on whether a given section carries a tag, how large the leading
simple-vars record is, and how many sections exist at all.
*/

mod resolver;

pub mod presets;

pub use self::resolver::{FormatResolver, Marker};

use crate::block::BlockTag;
use std::fmt;
use std::ops::BitOr;

/// Target hardware platform of a save file variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleType {
    PcWin32,
    PcMacOs,
    Ps2,
    Ps3,
    Psp,
    Xbox,
    Xbox360,
    Android,
    Ios,
}

/// Bitset of region and distribution qualifiers for a platform
///
/// ```
/// use ganton::ConsoleFlags;
///
/// let flags = ConsoleFlags::EUROPE | ConsoleFlags::AUSTRALIA;
/// assert!(flags.contains(ConsoleFlags::EUROPE));
/// assert!(!flags.contains(ConsoleFlags::JAPAN));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ConsoleFlags(u8);

impl ConsoleFlags {
    pub const NONE: ConsoleFlags = ConsoleFlags(0);
    pub const NORTH_AMERICA: ConsoleFlags = ConsoleFlags(1);
    pub const EUROPE: ConsoleFlags = ConsoleFlags(1 << 1);
    pub const JAPAN: ConsoleFlags = ConsoleFlags(1 << 2);
    pub const AUSTRALIA: ConsoleFlags = ConsoleFlags(1 << 3);
    pub const STEAM: ConsoleFlags = ConsoleFlags(1 << 4);

    /// Returns true if every flag in `other` is set in `self`
    pub const fn contains(self, other: ConsoleFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no flags are set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ConsoleFlags {
    type Output = ConsoleFlags;

    fn bitor(self, rhs: ConsoleFlags) -> ConsoleFlags {
        ConsoleFlags(self.0 | rhs.0)
    }
}

/// A named platform/distribution variant of the save file layout.
///
/// A format is immutable once built and compared structurally. Construct one
/// through [FileFormat::builder]:
///
/// ```
/// use ganton::{BlockTag, ConsoleFlags, ConsoleType, FileFormat};
///
/// let format = FileFormat::builder("PC", "PC retail (CD)")
///     .console(ConsoleType::PcWin32, ConsoleFlags::NONE)
///     .section(None)
///     .section(Some(BlockTag::new(*b"SCR\0")))
///     .max_block_size(0xD6D8)
///     .simple_vars_size(0xE4)
///     .build();
///
/// assert_eq!(format.section_count(), 2);
/// assert!(format.targets(ConsoleType::PcWin32));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FileFormat {
    name: String,
    description: String,
    supported: Vec<(ConsoleType, ConsoleFlags)>,
    section_tags: Vec<Option<BlockTag>>,
    max_block_size: u32,
    simple_vars_size: u32,
}

impl FileFormat {
    /// Start building a format with the given identity
    pub fn builder(name: &str, description: &str) -> FileFormatBuilder {
        FileFormatBuilder {
            name: name.to_string(),
            description: description.to_string(),
            supported: Vec::new(),
            section_tags: Vec::new(),
            max_block_size: u32::MAX,
            simple_vars_size: 0,
        }
    }

    /// Short identifying name, eg: `PS2/EU`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable description of the variant
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The ordered (platform, flags) tuples this format applies to
    pub fn supported(&self) -> &[(ConsoleType, ConsoleFlags)] {
        &self.supported
    }

    /// Returns true if this format targets the given platform
    pub fn targets(&self, console: ConsoleType) -> bool {
        self.supported.iter().any(|(c, _)| *c == console)
    }

    /// Region/distribution flags for the given platform, if targeted
    pub fn flags_for(&self, console: ConsoleType) -> Option<ConsoleFlags> {
        self.supported
            .iter()
            .find(|(c, _)| *c == console)
            .map(|(_, f)| *f)
    }

    /// Number of domain sections in a save file of this format
    pub fn section_count(&self) -> usize {
        self.section_tags.len()
    }

    /// The tag the given section carries, or `None` for an untagged section.
    ///
    /// Out of range indices are untagged; the block layer never asks for one.
    pub fn section_tag(&self, index: usize) -> Option<BlockTag> {
        self.section_tags.get(index).copied().flatten()
    }

    /// Largest permitted outer block length, in bytes
    pub fn max_block_size(&self) -> u32 {
        self.max_block_size
    }

    /// Fixed serialized size of the leading simple-vars record, in bytes
    pub fn simple_vars_size(&self) -> u32 {
        self.simple_vars_size
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.description)
    }
}

/// Builds a [FileFormat]
#[derive(Debug)]
pub struct FileFormatBuilder {
    name: String,
    description: String,
    supported: Vec<(ConsoleType, ConsoleFlags)>,
    section_tags: Vec<Option<BlockTag>>,
    max_block_size: u32,
    simple_vars_size: u32,
}

impl FileFormatBuilder {
    /// Add a supported (platform, flags) tuple
    pub fn console(mut self, console: ConsoleType, flags: ConsoleFlags) -> Self {
        self.supported.push((console, flags));
        self
    }

    /// Append one section, tagged or untagged
    pub fn section(mut self, tag: Option<BlockTag>) -> Self {
        self.section_tags.push(tag);
        self
    }

    /// Append `count` untagged sections
    pub fn untagged_sections(mut self, count: usize) -> Self {
        self.section_tags.extend(std::iter::repeat(None).take(count));
        self
    }

    /// Set the maximum permitted outer block length
    pub fn max_block_size(mut self, size: u32) -> Self {
        self.max_block_size = size;
        self
    }

    /// Set the fixed serialized size of the simple-vars record
    pub fn simple_vars_size(mut self, size: u32) -> Self {
        self.simple_vars_size = size;
        self
    }

    /// Finish building the format
    pub fn build(self) -> FileFormat {
        FileFormat {
            name: self.name,
            description: self.description,
            supported: self.supported,
            section_tags: self.section_tags,
            max_block_size: self.max_block_size,
            simple_vars_size: self.simple_vars_size,
        }
    }
}
