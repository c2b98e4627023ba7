/*!

A low level, byte-exact reader and writer for the block based binary save
formats used by a family of classic open world titles, across their PC
retail and digital builds, PS2 regional pressings, Xbox, and the mobile
ports.

The save layout was never documented and tolerates no drift: a single
misplaced padding byte produces a file the game refuses to load. Ganton
reproduces the layout exactly (length-prefixed blocks, 4-byte alignment,
pad-to-target filler blocks, and the arithmetic checksum trailer) and keeps
every platform difference (section counts, tag presence, size constants) as
data on a [FileFormat] rather than scattered conditionals.

## Features

- ✔ Byte exact: load-then-store reproduces the input image bit for bit
- ✔ Platform aware: PC, PS2 (NA/EU/JP/AU), Xbox, Android/iOS variants
- ✔ Validating: tags, lengths, and checksums are always enforced, never
  debug-only
- ✔ Extensible: domain records plug in through the [SaveData] trait; the
  engine has no per-record knowledge
- ✔ Self contained: no I/O, just a pure transformation between byte buffers
  and records

## Quick Start

```rust
use ganton::{format::presets, SaveFile};

// Identify the variant from raw bytes, then parse
let resolver = presets::resolver();
# let mut fixture = SaveFile::new(presets::pc_retail(), 0x1000);
# let sv = vec![0u8; presets::pc_retail().simple_vars_size() as usize];
# fixture.section_mut(0).unwrap().set_body(sv);
# let data = fixture.store()?;
let mut save = SaveFile::load_detected(&data, &resolver)?;
assert_eq!(save.format().name(), "PC");

// Stored output is byte identical to the input
assert_eq!(save.store()?, data);
# Ok::<(), ganton::Error>(())
```

Sections decode on demand into caller-defined record types:

```rust
use ganton::{Deserializer, Error, FileFormat, SaveData, Serializer};

struct GarageSlot {
    model: i32,
    locked: bool,
}

impl SaveData for GarageSlot {
    fn read(de: &mut Deserializer, _format: &FileFormat) -> Result<Self, Error> {
        let model = de.read_i32()?;
        let locked = de.read_bool(4)?;
        Ok(GarageSlot { model, locked })
    }

    fn write(&self, ser: &mut Serializer, _format: &FileFormat) -> Result<(), Error> {
        ser.write_i32(self.model);
        ser.write_bool(self.locked, 4)
    }
}
```

## One Level Lower

When whole-file handling is inappropriate, [BlockReader] and [BlockWriter]
expose the container protocol directly, and [Deserializer]/[Serializer] the
primitive layer below it.

*/

mod block;
mod errors;
pub mod format;
mod ser;
pub(crate) mod util;

pub use self::block::{
    checksum, BlockReader, BlockTag, BlockWriter, SaveFile, SaveState, Section,
};
pub use self::errors::{Error, ErrorKind, FormatError};
pub use self::format::{
    ConsoleFlags, ConsoleType, FileFormat, FileFormatBuilder, FormatResolver, Marker,
};
pub use self::ser::{Deserializer, PaddingMode, SaveData, Serializer};
