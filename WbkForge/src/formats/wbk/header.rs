//! Fixed 0x100-byte bank header

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{ENTRY_SIZE, HEADER_SIZE, NAME_LENGTH, TOTAL_BYTES_OFFSET};
use crate::error::{Error, Result};

const PADDING_LENGTH: usize = 152;

/// Header at the start of every bank
#[derive(Debug, Clone, PartialEq)]
pub struct BankHeader {
    /// Magic bytes. Never validated by the game tooling, kept for diagnostics.
    pub magic: [u8; 8],
    pub unknown: [u8; 8],
    pub flag: i32,
    pub size: i32,
    /// Offset of the bank-wide sample region as recorded by the authoring tool
    pub sample_data_offs: i32,
    /// Length of the whole bank image
    pub total_bytes: u32,
    /// NUL-padded bank name
    pub name: [u8; NAME_LENGTH],
    pub num_entries: i32,
    pub val5: i32,
    pub val6: i32,
    pub val7: i32,
    pub entries_offs: i32,
    /// Start of the metadata block (0 when absent)
    pub metadata_offs: i32,
    pub offs3: i32,
    pub offs4: i32,
    pub num: i32,
    /// End of the metadata block; the bank type tag starts here
    pub entry_desc_offs: i32,
    padding: [u8; PADDING_LENGTH],
}

impl BankHeader {
    /// A zeroed header with the given name and entry count
    #[must_use]
    pub fn new(name: &str, num_entries: usize) -> Self {
        let mut name_buf = [0u8; NAME_LENGTH];
        let bytes = name.as_bytes();
        let copy_len = bytes.len().min(NAME_LENGTH - 1);
        name_buf[..copy_len].copy_from_slice(&bytes[..copy_len]);

        Self {
            magic: [0; 8],
            unknown: [0; 8],
            flag: 0,
            size: 0,
            sample_data_offs: 0,
            total_bytes: 0,
            name: name_buf,
            num_entries: num_entries as i32,
            val5: 0,
            val6: 0,
            val7: 0,
            entries_offs: HEADER_SIZE as i32,
            metadata_offs: 0,
            offs3: 0,
            offs4: 0,
            num: 0,
            entry_desc_offs: 0,
            padding: [0; PADDING_LENGTH],
        }
    }

    /// Parse the header from the start of a bank image
    ///
    /// # Errors
    /// Returns [`Error::MalformedHeader`] if the image is shorter than the header.
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::header(format!(
                "image is {} bytes, header needs {HEADER_SIZE}",
                data.len()
            )));
        }
        Self::read_from(&mut Cursor::new(&data[..HEADER_SIZE])).map_err(Error::from_record_read)
    }

    fn read_from(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        let mut magic = [0u8; 8];
        cursor.read_exact(&mut magic)?;
        let mut unknown = [0u8; 8];
        cursor.read_exact(&mut unknown)?;

        let flag = cursor.read_i32::<LittleEndian>()?;
        let size = cursor.read_i32::<LittleEndian>()?;
        let sample_data_offs = cursor.read_i32::<LittleEndian>()?;
        let total_bytes = cursor.read_u32::<LittleEndian>()?;

        let mut name = [0u8; NAME_LENGTH];
        cursor.read_exact(&mut name)?;

        let num_entries = cursor.read_i32::<LittleEndian>()?;
        let val5 = cursor.read_i32::<LittleEndian>()?;
        let val6 = cursor.read_i32::<LittleEndian>()?;
        let val7 = cursor.read_i32::<LittleEndian>()?;
        let entries_offs = cursor.read_i32::<LittleEndian>()?;
        let metadata_offs = cursor.read_i32::<LittleEndian>()?;
        let offs3 = cursor.read_i32::<LittleEndian>()?;
        let offs4 = cursor.read_i32::<LittleEndian>()?;
        let num = cursor.read_i32::<LittleEndian>()?;
        let entry_desc_offs = cursor.read_i32::<LittleEndian>()?;

        let mut padding = [0u8; PADDING_LENGTH];
        cursor.read_exact(&mut padding)?;

        Ok(Self {
            magic,
            unknown,
            flag,
            size,
            sample_data_offs,
            total_bytes,
            name,
            num_entries,
            val5,
            val6,
            val7,
            entries_offs,
            metadata_offs,
            offs3,
            offs4,
            num,
            entry_desc_offs,
            padding,
        })
    }

    /// Serialize to the fixed 0x100-byte layout
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        self.write_to(&mut out)?;
        Ok(out)
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.magic)?;
        writer.write_all(&self.unknown)?;
        writer.write_i32::<LittleEndian>(self.flag)?;
        writer.write_i32::<LittleEndian>(self.size)?;
        writer.write_i32::<LittleEndian>(self.sample_data_offs)?;
        writer.write_u32::<LittleEndian>(self.total_bytes)?;
        writer.write_all(&self.name)?;
        writer.write_i32::<LittleEndian>(self.num_entries)?;
        writer.write_i32::<LittleEndian>(self.val5)?;
        writer.write_i32::<LittleEndian>(self.val6)?;
        writer.write_i32::<LittleEndian>(self.val7)?;
        writer.write_i32::<LittleEndian>(self.entries_offs)?;
        writer.write_i32::<LittleEndian>(self.metadata_offs)?;
        writer.write_i32::<LittleEndian>(self.offs3)?;
        writer.write_i32::<LittleEndian>(self.offs4)?;
        writer.write_i32::<LittleEndian>(self.num)?;
        writer.write_i32::<LittleEndian>(self.entry_desc_offs)?;
        writer.write_all(&self.padding)?;
        Ok(())
    }

    /// Bank name up to the first NUL
    #[must_use]
    pub fn name(&self) -> String {
        nul_terminated(&self.name)
    }

    /// Number of entries, rejecting negative counts
    pub fn entry_count(&self) -> Result<usize> {
        usize::try_from(self.num_entries)
            .map_err(|_| Error::header(format!("negative entry count {}", self.num_entries)))
    }

    /// Byte offset one past the entry table
    #[must_use]
    pub fn entry_table_end(count: usize) -> usize {
        HEADER_SIZE + count * ENTRY_SIZE
    }

    /// Overwrite the total-size field of an image in place
    pub fn patch_total_bytes(image: &mut [u8], total: usize) -> Result<()> {
        let total = u32::try_from(total)
            .map_err(|_| Error::layout(format!("bank image too large: {total} bytes")))?;
        let field = image
            .get_mut(TOTAL_BYTES_OFFSET..TOTAL_BYTES_OFFSET + 4)
            .ok_or_else(|| Error::header("image shorter than header"))?;
        field.copy_from_slice(&total.to_le_bytes());
        Ok(())
    }
}

/// Decode a NUL-padded byte field as lossy UTF-8
pub(crate) fn nul_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
