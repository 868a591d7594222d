//! Binary wire codecs for the "ROCK" and "AXE!" formats.
//!
//! Everything is little-endian via `byteorder`. The parameter payload is
//! purely positional: an effect's settings declaration order **is** the
//! wire format, with no per-value tags. Loading tolerates a file with
//! *fewer* parameters than the current build (an older revision of the
//! effect) but rejects one with more.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use cadena_core::{Effect, ParamValue, SettingsBank};
use cadena_registry::EffectCatalog;

use crate::error::RackError;

/// Magic header of a single-rack stream ("ROCK").
pub const RACK_MAGIC: u32 = u32::from_le_bytes(*b"ROCK");

/// Current single-rack format version.
pub const RACK_VERSION: u32 = 1;

/// Magic header of a rack-collection stream ("AXE!").
pub const COLLECTION_MAGIC: u32 = u32::from_le_bytes(*b"AXE!");

/// Current collection format version.
///
/// - v1: racks only
/// - v2: adds the switch-rack index
/// - v3: adds the manager name
pub const COLLECTION_VERSION: u32 = 3;

/// Version byte of the positional settings payload.
pub const SETTINGS_STREAM_VERSION: u8 = 1;

/// Sanity cap on length-prefixed strings.
pub const MAX_NAME_BYTES: u32 = 1024;

/// Upper bound on effects in one rack.
pub const MAX_EFFECTS_PER_RACK: usize = 64;

/// Upper bound on racks in one collection.
pub const MAX_RACKS_IN_PRESET: usize = 32;

/// Write a length-prefixed UTF-8 string.
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), RackError> {
    let bytes = value.as_bytes();
    writer.write_u32::<LittleEndian>(bytes.len() as u32)?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Read a length-prefixed UTF-8 string, enforcing [`MAX_NAME_BYTES`].
pub fn read_string<R: Read>(reader: &mut R) -> Result<String, RackError> {
    let len = reader.read_u32::<LittleEndian>()?;
    if len > MAX_NAME_BYTES {
        return Err(RackError::StringTooLong {
            len,
            max: MAX_NAME_BYTES,
        });
    }
    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| RackError::InvalidName)
}

/// Write one settings aggregate: version byte, parameter count, then each
/// raw value in declaration order.
pub fn write_settings<W: Write>(
    writer: &mut W,
    settings: &dyn SettingsBank,
) -> Result<(), RackError> {
    let params = settings.params();
    writer.write_u8(SETTINGS_STREAM_VERSION)?;
    writer.write_u8(params.len() as u8)?;
    for param in params {
        match param.value() {
            ParamValue::Float(v) => writer.write_f32::<LittleEndian>(v)?,
            ParamValue::Int(v) => writer.write_i32::<LittleEndian>(v)?,
            ParamValue::Bool(v) => writer.write_u8(u8::from(v))?,
        }
    }
    Ok(())
}

/// Read a settings payload onto an aggregate.
///
/// The value *width* of each position comes from the current aggregate's
/// parameter kinds - the stream itself carries no type information.
pub fn read_settings<R: Read>(
    reader: &mut R,
    settings: &dyn SettingsBank,
) -> Result<(), RackError> {
    let version = reader.read_u8()?;
    if version != SETTINGS_STREAM_VERSION {
        return Err(RackError::BadSettingsVersion(version));
    }
    let params = settings.params();
    let file_count = reader.read_u8()?;
    if file_count as usize > params.len() {
        return Err(RackError::TooManyParams {
            file: file_count,
            current: params.len(),
        });
    }
    for param in params.iter().take(file_count as usize) {
        let value = match param.value() {
            ParamValue::Float(_) => ParamValue::Float(reader.read_f32::<LittleEndian>()?),
            ParamValue::Int(_) => ParamValue::Int(reader.read_i32::<LittleEndian>()?),
            ParamValue::Bool(_) => ParamValue::Bool(reader.read_u8()? != 0),
        };
        param.set_value(value);
    }
    Ok(())
}

/// Write one effect: type tag, enabled flag, settings payload.
pub fn write_effect<W: Write>(writer: &mut W, effect: &dyn Effect) -> Result<(), RackError> {
    writer.write_u32::<LittleEndian>(effect.kind().tag())?;
    writer.write_u8(u8::from(effect.is_enabled()))?;
    write_settings(writer, effect.settings().as_ref())
}

/// Read one effect, constructing it through the catalog.
pub fn read_effect<R: Read>(
    reader: &mut R,
    catalog: &EffectCatalog,
    sample_rate: f32,
) -> Result<Box<dyn Effect>, RackError> {
    let tag = reader.read_u32::<LittleEndian>()?;
    let mut effect = catalog
        .create_from_tag(tag, sample_rate)
        .ok_or(RackError::UnknownEffect(tag))?;
    let enabled = reader.read_u8()? != 0;
    effect.set_enabled(enabled);
    read_settings(reader, effect.settings().as_ref())?;
    Ok(effect)
}

/// Verify that a reader is exhausted - rack files must not carry trailing
/// bytes.
pub fn expect_eof<R: Read>(reader: &mut R) -> Result<(), RackError> {
    let mut probe = [0u8; 1];
    match reader.read(&mut probe)? {
        0 => Ok(()),
        _ => Err(RackError::TrailingBytes),
    }
}
