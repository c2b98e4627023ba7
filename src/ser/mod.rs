/*!
Primitive codec and generic record dispatch.

[Deserializer] and [Serializer] move primitives; [SaveData] is the seam for
everything else. A domain record implements [SaveData], receives the active
[FileFormat], and can branch on it for platform specific layout (extra fields
on one console, different widths on another). There is no runtime type lookup:
a type without an implementation fails to compile, not to run.

```
use ganton::{Deserializer, Error, FileFormat, SaveData, Serializer};

struct ClockState {
    hours: u8,
    minutes: u8,
    millis_per_minute: u32,
}

impl SaveData for ClockState {
    fn read(de: &mut Deserializer, _format: &FileFormat) -> Result<Self, Error> {
        let hours = de.read_u8()?;
        let minutes = de.read_u8()?;
        de.align(4)?;
        Ok(ClockState { hours, minutes, millis_per_minute: de.read_u32()? })
    }

    fn write(&self, ser: &mut Serializer, _format: &FileFormat) -> Result<(), Error> {
        ser.write_u8(self.hours);
        ser.write_u8(self.minutes);
        ser.align(4)?;
        ser.write_u32(self.millis_per_minute);
        Ok(())
    }
}

let format = FileFormat::builder("PC", "PC retail").build();
let mut ser = Serializer::new();
ser.write_value(&ClockState { hours: 12, minutes: 30, millis_per_minute: 1000 }, &format)?;
assert_eq!(ser.position(), 8);

let bytes = ser.into_bytes();
let mut de = Deserializer::from_slice(&bytes);
let clock: ClockState = de.read_value(&format)?;
assert_eq!(clock.minutes, 30);
# Ok::<(), ganton::Error>(())
```
*/

mod padding;
mod reader;
mod writer;

pub use self::padding::PaddingMode;
pub use self::reader::Deserializer;
pub use self::writer::Serializer;

use crate::{Error, FileFormat};

/// A record that can be moved through the codec.
///
/// Nested records, fixed arrays, and length-governed strings compose through
/// the methods on [Deserializer] and [Serializer]; the `format` parameter
/// carries whatever platform variance the record layout needs.
pub trait SaveData: Sized {
    /// Read a value in the given format's layout
    fn read(de: &mut Deserializer<'_>, format: &FileFormat) -> Result<Self, Error>;

    /// Write the value in the given format's layout
    fn write(&self, ser: &mut Serializer, format: &FileFormat) -> Result<(), Error>;
}

macro_rules! primitive_save_data {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl SaveData for $ty {
                fn read(de: &mut Deserializer<'_>, _format: &FileFormat) -> Result<Self, Error> {
                    de.$read()
                }

                fn write(&self, ser: &mut Serializer, _format: &FileFormat) -> Result<(), Error> {
                    ser.$write(*self);
                    Ok(())
                }
            }
        )*
    };
}

primitive_save_data! {
    u8 => read_u8, write_u8;
    i8 => read_i8, write_i8;
    u16 => read_u16, write_u16;
    i16 => read_i16, write_i16;
    u32 => read_u32, write_u32;
    i32 => read_i32, write_i32;
    u64 => read_u64, write_u64;
    i64 => read_i64, write_i64;
    f32 => read_f32, write_f32;
    f64 => read_f64, write_f64;
}

/// Single-byte canonical form; wider booleans go through
/// [Deserializer::read_bool] / [Serializer::write_bool]
impl SaveData for bool {
    fn read(de: &mut Deserializer<'_>, _format: &FileFormat) -> Result<Self, Error> {
        de.read_bool(1)
    }

    fn write(&self, ser: &mut Serializer, _format: &FileFormat) -> Result<(), Error> {
        ser.write_bool(*self, 1)
    }
}

impl<'a> Deserializer<'a> {
    /// Read one [SaveData] value.
    ///
    /// Nesting is bounded; pathological input that recurses past the depth
    /// limit fails with [`DepthLimit`](crate::ErrorKind::DepthLimit).
    pub fn read_value<T: SaveData>(&mut self, format: &FileFormat) -> Result<T, Error> {
        self.enter()?;
        let result = T::read(self, format);
        self.exit();
        result
    }

    /// Read exactly `count` values.
    ///
    /// Always produces `count` elements or fails; never a short vector.
    pub fn read_array<T: SaveData>(
        &mut self,
        count: usize,
        format: &FileFormat,
    ) -> Result<Vec<T>, Error> {
        let mut out = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            out.push(self.read_value(format)?);
        }
        Ok(out)
    }

    /// Read `count` booleans of `width` bytes each
    pub fn read_bool_array(&mut self, count: usize, width: usize) -> Result<Vec<bool>, Error> {
        let mut out = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            out.push(self.read_bool(width)?);
        }
        Ok(out)
    }

    /// Read `count` fixed-length single-byte strings of `len` bytes each
    pub fn read_string_array(&mut self, count: usize, len: usize) -> Result<Vec<String>, Error> {
        let mut out = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            out.push(self.read_string(len)?);
        }
        Ok(out)
    }

    /// Read `count` fixed-length UTF-16LE strings of `len` code units each
    pub fn read_wstring_array(&mut self, count: usize, len: usize) -> Result<Vec<String>, Error> {
        let mut out = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            out.push(self.read_wstring(len)?);
        }
        Ok(out)
    }
}

impl Serializer {
    /// Write one [SaveData] value
    pub fn write_value<T: SaveData>(&mut self, value: &T, format: &FileFormat) -> Result<(), Error> {
        value.write(self, format)
    }

    /// Write a collection into exactly `count` slots.
    ///
    /// A shorter collection is completed with default-constructed elements:
    /// the layouts reserve a fixed number of slots (garages, pickups, script
    /// threads) and a writer with fewer live entries still owes the file all
    /// of them. A collection longer than `count` is rejected.
    pub fn write_array<T: SaveData + Default>(
        &mut self,
        items: &[T],
        count: usize,
        format: &FileFormat,
    ) -> Result<(), Error> {
        if items.len() > count {
            return Err(Error::invalid(format!(
                "collection of {} does not fit {} slots",
                items.len(),
                count
            )));
        }
        for item in items {
            self.write_value(item, format)?;
        }
        let filler = T::default();
        for _ in items.len()..count {
            self.write_value(&filler, format)?;
        }
        Ok(())
    }

    /// Write booleans into exactly `count` slots of `width` bytes each,
    /// default-filling the remainder with `false`
    pub fn write_bool_array(
        &mut self,
        items: &[bool],
        count: usize,
        width: usize,
    ) -> Result<(), Error> {
        if items.len() > count {
            return Err(Error::invalid(format!(
                "collection of {} does not fit {} slots",
                items.len(),
                count
            )));
        }
        for item in items {
            self.write_bool(*item, width)?;
        }
        for _ in items.len()..count {
            self.write_bool(false, width)?;
        }
        Ok(())
    }

    /// Write fixed-length strings into exactly `count` slots, default-filling
    /// the remainder with empty strings
    pub fn write_string_array(
        &mut self,
        items: &[String],
        count: usize,
        len: usize,
        zero_terminate: bool,
    ) -> Result<(), Error> {
        if items.len() > count {
            return Err(Error::invalid(format!(
                "collection of {} does not fit {} slots",
                items.len(),
                count
            )));
        }
        for item in items {
            self.write_string(item, len, zero_terminate)?;
        }
        for _ in items.len()..count {
            self.write_string("", len, zero_terminate)?;
        }
        Ok(())
    }
}
