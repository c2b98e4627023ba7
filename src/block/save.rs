use super::{checksum, BlockReader, BlockTag, BlockWriter};
use crate::errors::FormatError;
use crate::format::FormatResolver;
use crate::util::le_u32;
use crate::{Deserializer, Error, ErrorKind, FileFormat, PaddingMode, SaveData, Serializer};

/// Progress of a [SaveFile] through one load/store cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// No bytes consumed yet
    Unloaded,
    /// Parsing the given section index
    Loading { section: usize },
    /// Fully parsed (or freshly constructed); sections are editable
    Loaded,
    /// Emitting the given section index
    Saving { section: usize },
    /// Emitting pad-to-target blocks
    Padding,
    /// Emitting the checksum trailer
    Checksum,
    /// A full byte image has been produced
    Serialized,
}

/// One index-ordered unit of save data, holding its payload bytes.
///
/// The codec does not know the domain record layouts; a section body decodes
/// into whatever [SaveData] type the caller maps to its index.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    index: usize,
    tag: Option<BlockTag>,
    body: Vec<u8>,
}

impl Section {
    fn new(index: usize, tag: Option<BlockTag>, body: Vec<u8>) -> Section {
        Section { index, tag, body }
    }

    /// Position of this section in the format's fixed order
    pub fn index(&self) -> usize {
        self.index
    }

    /// The tag this section's block carries, if the format gives it one
    pub fn tag(&self) -> Option<BlockTag> {
        self.tag
    }

    /// The section's payload bytes
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replace the payload bytes wholesale
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Decode the payload into a record type
    pub fn decode<T: SaveData>(&self, format: &FileFormat) -> Result<T, Error> {
        let mut de = Deserializer::from_slice(&self.body);
        de.read_value(format)
    }

    /// Serialize a record and make it the payload
    pub fn encode<T: SaveData>(&mut self, record: &T, format: &FileFormat) -> Result<(), Error> {
        let mut ser = Serializer::new();
        ser.write_value(record, format)?;
        self.body = ser.into_bytes();
        Ok(())
    }
}

/// An in-memory save file: ordered sections plus the layout bookkeeping
/// needed to reproduce the exact byte image.
///
/// ```
/// use ganton::{format::presets, SaveFile};
///
/// let format = presets::pc_retail();
/// let mut save = SaveFile::new(format.clone(), 0x2000);
/// let simple_vars = vec![0u8; format.simple_vars_size() as usize];
/// save.section_mut(0).unwrap().set_body(simple_vars);
///
/// let image = save.store()?;
/// assert_eq!(image.len(), 0x2000 + 4);
///
/// let mut reloaded = SaveFile::load(&image, format)?;
/// assert_eq!(reloaded.store()?, image);
/// # Ok::<(), ganton::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SaveFile {
    format: FileFormat,
    sections: Vec<Section>,
    size_of_game: u32,
    padding: PaddingMode,
    state: SaveState,
    padding_blocks: usize,
}

impl SaveFile {
    /// Create an empty save for the given format.
    ///
    /// Every section starts with an empty body; the caller populates them
    /// before storing. `size_of_game` is the total byte size the simple-vars
    /// record declares, excluding the checksum trailer.
    pub fn new(format: FileFormat, size_of_game: u32) -> SaveFile {
        let sections = (0..format.section_count())
            .map(|index| Section::new(index, format.section_tag(index), Vec::new()))
            .collect();
        SaveFile {
            format,
            sections,
            size_of_game,
            padding: PaddingMode::Zeros,
            state: SaveState::Loaded,
            padding_blocks: 0,
        }
    }

    /// Parse a save image under a known format.
    ///
    /// The trailing checksum is validated first; then the format's sections
    /// are read in order with their tags enforced; remaining blocks up to the
    /// end of the image are counted as padding and not decoded.
    pub fn load(data: &[u8], format: FileFormat) -> Result<SaveFile, Error> {
        if data.len() < 4 {
            return Err(Error::new(ErrorKind::StreamExhausted {
                offset: 0,
                needed: 4,
            }));
        }
        let (body, trailer) = data.split_at(data.len() - 4);
        let stored = le_u32(trailer);
        let computed = checksum(body);
        if stored != computed {
            return Err(FormatError::ChecksumMismatch { stored, computed }.into());
        }

        let mut save = SaveFile {
            sections: Vec::with_capacity(format.section_count()),
            size_of_game: body.len() as u32,
            padding: PaddingMode::Zeros,
            state: SaveState::Unloaded,
            padding_blocks: 0,
            format,
        };

        let mut reader = BlockReader::new(body, &save.format);
        for index in 0..save.format.section_count() {
            save.state = SaveState::Loading { section: index };
            let tag = save.format.section_tag(index);
            let payload = reader.read_block(tag)?;
            if index == 0 {
                save.check_simple_vars(payload.len())?;
            }
            save.sections.push(Section::new(index, tag, payload.to_vec()));
        }

        while reader.remaining() > 0 {
            reader.read_block(None)?;
            save.padding_blocks += 1;
        }

        save.state = SaveState::Loaded;
        Ok(save)
    }

    /// Detect the format with a resolver, then [load](Self::load)
    pub fn load_detected(data: &[u8], resolver: &FormatResolver) -> Result<SaveFile, Error> {
        let format = resolver.resolve(data)?.clone();
        SaveFile::load(data, format)
    }

    /// Produce the byte image: sections in order, padding blocks up to
    /// `size_of_game`, then the checksum trailer.
    pub fn store(&mut self) -> Result<Vec<u8>, Error> {
        if let Some(first) = self.sections.first() {
            self.check_simple_vars(first.body.len())?;
        }

        let mut writer = BlockWriter::with_padding(&self.format, self.padding.clone());
        for section in &self.sections {
            self.state = SaveState::Saving {
                section: section.index,
            };
            writer.write_block(section.tag, &section.body)?;
        }

        self.state = SaveState::Padding;
        writer.pad_to(self.size_of_game as usize)?;

        self.state = SaveState::Checksum;
        let image = writer.finish();

        self.state = SaveState::Serialized;
        Ok(image)
    }

    /// The format this save was loaded or created with
    pub fn format(&self) -> &FileFormat {
        &self.format
    }

    /// Where the save is in its load/store cycle
    pub fn state(&self) -> SaveState {
        self.state
    }

    /// Total byte size of the image, excluding the checksum trailer
    pub fn size_of_game(&self) -> u32 {
        self.size_of_game
    }

    /// Override the target size (the simple-vars collaborator owns this value)
    pub fn set_size_of_game(&mut self, size: u32) {
        self.size_of_game = size;
    }

    /// Filler policy for alignment gaps and padding blocks
    pub fn set_padding(&mut self, padding: PaddingMode) {
        self.padding = padding;
    }

    /// Number of padding-only blocks observed by the last load
    pub fn padding_blocks(&self) -> usize {
        self.padding_blocks
    }

    /// Borrow a section by index
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Mutably borrow a section by index
    pub fn section_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    /// All sections in format order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    fn check_simple_vars(&self, actual: usize) -> Result<(), Error> {
        let expected = self.format.simple_vars_size();
        if expected != 0 && actual != expected as usize {
            return Err(FormatError::SectionSize {
                index: 0,
                expected,
                actual: actual as u32,
            }
            .into());
        }
        Ok(())
    }
}
