/*!
The shipped format catalog for the III-era titles.

Each variant below describes the same logical save but with platform specific
section tables and size constants. The numbers are the ones the games actually
burn into their loaders: the retail PC build reserves 0xE4 bytes for simple
vars where the digital re-release reserves 0xE8, the consoles cap any single
block at 0xD6D8 bytes, and so on. None of them are negotiable: a loader that
disagrees by a single byte rejects the file.

Detection leans on two facts about the layout. The script section is always
the second block and always tagged, so its `SCR\0` tag lands at a fixed,
format-dependent offset (8 bytes of length prefixes past the simple-vars
record). Within a platform, regional pressings share that offset and are told
apart by the region byte simple vars stores at offset 0x28.
*/

use super::{ConsoleFlags, ConsoleType, FileFormat, FormatResolver, Marker};
use crate::block::BlockTag;

/// Maximum outer block length on the console and mobile targets
pub const CONSOLE_MAX_BLOCK: u32 = 0xD6D8;

/// Maximum outer block length on the PC targets
pub const PC_MAX_BLOCK: u32 = 0x0004_0000;

/// Simple-vars record size on PC retail and Xbox
pub const SIMPLE_VARS_PC_RETAIL: u32 = 0xE4;

/// Simple-vars record size on the PC digital distribution
pub const SIMPLE_VARS_PC_DIGITAL: u32 = 0xE8;

/// Simple-vars record size on PS2
pub const SIMPLE_VARS_PS2: u32 = 0xB0;

/// Simple-vars record size on Android and iOS
pub const SIMPLE_VARS_MOBILE: u32 = 0xAC;

/// File offset of the region byte inside the simple-vars payload
const REGION_BYTE_OFFSET: usize = 0x2C;

const TAG_SCR: BlockTag = BlockTag::new(*b"SCR\0");
const TAG_RST: BlockTag = BlockTag::new(*b"RST\0");
const TAG_RDR: BlockTag = BlockTag::new(*b"RDR\0");
const TAG_ZNS: BlockTag = BlockTag::new(*b"ZNS\0");
const TAG_CGN: BlockTag = BlockTag::new(*b"CGN\0");
const TAG_AUD: BlockTag = BlockTag::new(*b"AUD\0");
const TAG_PTP: BlockTag = BlockTag::new(*b"PTP\0");

/// File offset at which the script section's `SCR\0` tag lands
const fn scr_offset(simple_vars_size: u32) -> usize {
    // outer length prefix + simple vars + the script block's own prefix
    simple_vars_size as usize + 8
}

fn base_sections(builder: super::FileFormatBuilder) -> super::FileFormatBuilder {
    builder
        .section(None) // simple vars
        .section(Some(TAG_SCR)) // scripts
        .section(None) // object pool
        .section(Some(TAG_RST)) // restarts
        .section(Some(TAG_RDR)) // radar
        .section(Some(TAG_ZNS)) // zones
        .section(Some(TAG_CGN)) // car generators
        .section(Some(TAG_AUD)) // audio triggers
}

/// PC retail (CD) distribution
pub fn pc_retail() -> FileFormat {
    base_sections(FileFormat::builder("PC", "PC retail (CD)"))
        .console(ConsoleType::PcWin32, ConsoleFlags::NONE)
        .max_block_size(PC_MAX_BLOCK)
        .simple_vars_size(SIMPLE_VARS_PC_RETAIL)
        .build()
}

/// PC digital distribution; four extra simple-vars bytes
pub fn pc_steam() -> FileFormat {
    base_sections(FileFormat::builder("PC/Steam", "PC digital (Steam)"))
        .console(ConsoleType::PcWin32, ConsoleFlags::STEAM)
        .console(ConsoleType::PcMacOs, ConsoleFlags::STEAM)
        .max_block_size(PC_MAX_BLOCK)
        .simple_vars_size(SIMPLE_VARS_PC_DIGITAL)
        .build()
}

fn ps2(name: &str, description: &str, flags: ConsoleFlags) -> FileFormat {
    // PS2 pressings leave the radar section untagged
    FileFormat::builder(name, description)
        .console(ConsoleType::Ps2, flags)
        .section(None)
        .section(Some(TAG_SCR))
        .section(None)
        .section(Some(TAG_RST))
        .section(None) // radar, untagged on this platform
        .section(Some(TAG_ZNS))
        .section(Some(TAG_CGN))
        .section(Some(TAG_AUD))
        .max_block_size(CONSOLE_MAX_BLOCK)
        .simple_vars_size(SIMPLE_VARS_PS2)
        .build()
}

/// PS2, North American pressing
pub fn ps2_na() -> FileFormat {
    ps2("PS2/NA", "PlayStation 2 (North America)", ConsoleFlags::NORTH_AMERICA)
}

/// PS2, European pressing
pub fn ps2_eu() -> FileFormat {
    ps2("PS2/EU", "PlayStation 2 (Europe)", ConsoleFlags::EUROPE)
}

/// PS2, Japanese pressing
pub fn ps2_jp() -> FileFormat {
    ps2("PS2/JP", "PlayStation 2 (Japan)", ConsoleFlags::JAPAN)
}

/// PS2, Australian pressing
pub fn ps2_au() -> FileFormat {
    ps2("PS2/AU", "PlayStation 2 (Australia)", ConsoleFlags::AUSTRALIA)
}

/// Xbox; PC retail layout plus a constant 1 in the save-signature slot
pub fn xbox() -> FileFormat {
    base_sections(FileFormat::builder("Xbox", "Xbox"))
        .console(ConsoleType::Xbox, ConsoleFlags::NONE)
        .max_block_size(PC_MAX_BLOCK)
        .simple_vars_size(SIMPLE_VARS_PC_RETAIL)
        .build()
}

/// Android and iOS ports; one extra targeting-preferences section
pub fn mobile() -> FileFormat {
    base_sections(FileFormat::builder("Mobile", "Android / iOS"))
        .console(ConsoleType::Android, ConsoleFlags::NONE)
        .console(ConsoleType::Ios, ConsoleFlags::NONE)
        .section(Some(TAG_PTP))
        .max_block_size(CONSOLE_MAX_BLOCK)
        .simple_vars_size(SIMPLE_VARS_MOBILE)
        .build()
}

/// Every format in the catalog, most widely seen first
pub fn all() -> Vec<FileFormat> {
    vec![
        pc_retail(),
        pc_steam(),
        ps2_na(),
        ps2_eu(),
        ps2_jp(),
        ps2_au(),
        xbox(),
        mobile(),
    ]
}

/// A resolver loaded with detection rules for the whole catalog.
///
/// ```
/// use ganton::format::presets;
///
/// let resolver = presets::resolver();
/// let mut data = vec![0u8; 0x200];
/// data[0xF0..0xF4].copy_from_slice(b"SCR\0");
/// assert_eq!(resolver.resolve(&data).unwrap().name(), "PC/Steam");
/// ```
pub fn resolver() -> FormatResolver {
    let mut resolver = FormatResolver::new();

    resolver.register(
        pc_retail(),
        vec![Marker::new(scr_offset(SIMPLE_VARS_PC_RETAIL), *b"SCR\0")],
    );
    resolver.register(
        pc_steam(),
        vec![Marker::new(scr_offset(SIMPLE_VARS_PC_DIGITAL), *b"SCR\0")],
    );

    let ps2_scr = scr_offset(SIMPLE_VARS_PS2);
    resolver.register(
        ps2_na(),
        vec![Marker::new(ps2_scr, *b"SCR\0"), Marker::new(REGION_BYTE_OFFSET, [0x00])],
    );
    resolver.register(
        ps2_eu(),
        vec![Marker::new(ps2_scr, *b"SCR\0"), Marker::new(REGION_BYTE_OFFSET, [0x01])],
    );
    resolver.register(
        ps2_jp(),
        vec![Marker::new(ps2_scr, *b"SCR\0"), Marker::new(REGION_BYTE_OFFSET, [0x02])],
    );
    resolver.register(
        ps2_au(),
        vec![Marker::new(ps2_scr, *b"SCR\0"), Marker::new(REGION_BYTE_OFFSET, [0x03])],
    );

    // Same simple-vars size as PC retail, so the SCR offset collides; the
    // signature slot tells them apart and the more specific rule wins.
    resolver.register(
        xbox(),
        vec![
            Marker::new(scr_offset(SIMPLE_VARS_PC_RETAIL), *b"SCR\0"),
            Marker::new(0x08, [0x01, 0x00, 0x00, 0x00]),
        ],
    );

    resolver.register(
        mobile(),
        vec![Marker::new(scr_offset(SIMPLE_VARS_MOBILE), *b"SCR\0")],
    );

    resolver
}
