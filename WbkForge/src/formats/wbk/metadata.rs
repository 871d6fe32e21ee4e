//! Optional per-entry metadata side table

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{Codec, METADATA_RECORD_SIZE};
use crate::error::{Error, Result};

/// 32-byte metadata record
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    pub codec_tag: u8,
    pub flags: [u8; 3],
    pub unknown: u32,
    pub values: [f32; 6],
}

impl MetadataRecord {
    /// Parse one record
    ///
    /// # Errors
    /// Returns [`Error::UnexpectedEof`] if `bytes` is shorter than a record.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        Self::read_from(&mut cursor).map_err(Error::from_record_read)
    }

    fn read_from(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        let codec_tag = cursor.read_u8()?;
        let mut flags = [0u8; 3];
        for flag in &mut flags {
            *flag = cursor.read_u8()?;
        }
        let unknown = cursor.read_u32::<LittleEndian>()?;
        let mut values = [0f32; 6];
        for value in &mut values {
            *value = cursor.read_f32::<LittleEndian>()?;
        }
        Ok(Self {
            codec_tag,
            flags,
            unknown,
            values,
        })
    }

    #[must_use]
    pub fn codec(&self) -> Codec {
        Codec::from_tag(self.codec_tag)
    }

    /// Records with a zero codec tag pad the block out
    #[must_use]
    pub fn is_padding(&self) -> bool {
        self.codec_tag == 0
    }
}

/// Parse the metadata block between `start` and `end`, dropping padding records.
///
/// A block whose bounds are reversed or fall outside `data` is rejected.
pub(crate) fn read_block(data: &[u8], start: usize, end: usize) -> Result<Vec<MetadataRecord>> {
    if end < start || end > data.len() {
        return Err(Error::header(format!(
            "metadata block {start:#x}..{end:#x} does not fit in {} bytes",
            data.len()
        )));
    }

    let count = (end - start) / METADATA_RECORD_SIZE;
    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        let offset = start + i * METADATA_RECORD_SIZE;
        let record = MetadataRecord::read(&data[offset..offset + METADATA_RECORD_SIZE])?;
        if record.is_padding() {
            continue;
        }
        tracing::debug!(
            "metadata[{i}]: codec={} flags={:?} unknown={:#x} values={:?}",
            record.codec(),
            record.flags,
            record.unknown,
            record.values
        );
        records.push(record);
    }
    Ok(records)
}
