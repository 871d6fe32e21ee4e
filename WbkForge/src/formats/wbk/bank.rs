//! Parsed view over a complete bank image

use std::fs;
use std::path::Path;

use super::header::nul_terminated;
use super::metadata;
use super::{BANK_TYPE_SIZE, BankHeader, EntryDescriptor, MetadataRecord};
use crate::error::{Error, Result};

/// An immutable, parsed WBK bank
///
/// Owns the raw image it was parsed from. Mutations go through
/// [`Bank::replace`], which builds a new image and a new `Bank`.
#[derive(Debug, Clone)]
pub struct Bank {
    raw: Vec<u8>,
    header: BankHeader,
    entries: Vec<EntryDescriptor>,
    metadata: Vec<MetadataRecord>,
    bank_type: Option<String>,
}

impl Bank {
    /// Parse a bank image, taking ownership of the bytes
    ///
    /// # Errors
    /// Returns [`Error::MalformedHeader`] if the header is truncated, the
    /// entry count is negative, or the entry table does not fit in the image.
    pub fn parse(raw: Vec<u8>) -> Result<Self> {
        let header = BankHeader::read(&raw)?;
        let count = header.entry_count()?;
        let table_end = BankHeader::entry_table_end(count);
        if table_end > raw.len() {
            return Err(Error::header(format!(
                "entry table for {count} entries ends at {table_end:#x}, image is {:#x} bytes",
                raw.len()
            )));
        }

        tracing::debug!(
            "Bank '{}': {count} entries, {} bytes (header says {})",
            header.name(),
            raw.len(),
            header.total_bytes
        );

        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            let offset = EntryDescriptor::table_offset(i);
            let entry = EntryDescriptor::read(&raw[offset..table_end])?;
            tracing::debug!(
                "entry[{i}]: hash={:#010x} codec={} channels={} samples={} bytes={} offset={:#x} rate={}",
                entry.hash,
                entry.codec(),
                entry.channel_count(),
                entry.decoded_sample_count(),
                entry.num_bytes,
                entry.data_offset,
                entry.sample_rate
            );
            entries.push(entry);
        }

        let metadata = Self::read_metadata(&raw, &header);
        let bank_type = Self::read_bank_type(&raw, &header);
        if let Some(bank_type) = &bank_type {
            tracing::debug!("bank type: {bank_type}");
        }

        Ok(Self {
            raw,
            header,
            entries,
            metadata,
            bank_type,
        })
    }

    /// Parse a bank from a borrowed buffer
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(data.to_vec())
    }

    /// Read and parse a bank file
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read, or any parse error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Reading bank: {}", path.display());
        Self::parse(fs::read(path)?)
    }

    /// Write the raw image to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        tracing::info!("Writing bank: {} ({} bytes)", path.display(), self.raw.len());
        fs::write(path, &self.raw)?;
        Ok(())
    }

    // The metadata block is a side table, so a bad range only costs diagnostics.
    fn read_metadata(raw: &[u8], header: &BankHeader) -> Vec<MetadataRecord> {
        if header.metadata_offs == 0 {
            return Vec::new();
        }
        let range = usize::try_from(header.metadata_offs)
            .ok()
            .zip(usize::try_from(header.entry_desc_offs).ok());
        let Some((start, end)) = range else {
            tracing::warn!(
                "Ignoring metadata block with negative bounds ({}, {})",
                header.metadata_offs,
                header.entry_desc_offs
            );
            return Vec::new();
        };
        metadata::read_block(raw, start, end).unwrap_or_else(|e| {
            tracing::warn!("Ignoring metadata block: {e}");
            Vec::new()
        })
    }

    fn read_bank_type(raw: &[u8], header: &BankHeader) -> Option<String> {
        let start = usize::try_from(header.entry_desc_offs).ok()?;
        if start == 0 {
            return None;
        }
        raw.get(start..start + BANK_TYPE_SIZE).map(nul_terminated)
    }

    /// The complete raw image
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    /// Length of the raw image in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[must_use]
    pub fn header(&self) -> &BankHeader {
        &self.header
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.header.name()
    }

    /// Entry descriptors in table order
    #[must_use]
    pub fn entries(&self) -> &[EntryDescriptor] {
        &self.entries
    }

    /// Entry at a 0-based table position
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&EntryDescriptor> {
        self.entries.get(index)
    }

    /// Non-padding metadata records, in block order
    #[must_use]
    pub fn metadata(&self) -> &[MetadataRecord] {
        &self.metadata
    }

    /// Diagnostic bank type tag, when present
    #[must_use]
    pub fn bank_type(&self) -> Option<&str> {
        self.bank_type.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::wbk::{Codec, ENTRY_SIZE, HEADER_SIZE};

    fn image_with_entries(entries: &[EntryDescriptor], len: usize) -> Vec<u8> {
        let mut header = BankHeader::new("test", entries.len());
        header.total_bytes = len as u32;
        let mut image = header.to_bytes().unwrap();
        for entry in entries {
            image.extend_from_slice(&entry.to_bytes().unwrap());
        }
        image.resize(len, 0);
        image
    }

    #[test]
    fn test_parse_entries() {
        let mut first = EntryDescriptor::new(11, Codec::ImaAdpcm);
        first.data_offset = 0x1000;
        let mut second = EntryDescriptor::new(22, Codec::Pcm16);
        second.data_offset = 0x2000;

        let bank = Bank::parse(image_with_entries(&[first.clone(), second.clone()], 0x3000)).unwrap();
        assert_eq!(bank.entries(), &[first, second]);
        assert_eq!(bank.name(), "test");
        assert_eq!(bank.len(), 0x3000);
        assert!(bank.metadata().is_empty());
        assert_eq!(bank.bank_type(), None);
    }

    #[test]
    fn test_entry_table_must_fit() {
        let mut image = BankHeader::new("short", 4).to_bytes().unwrap();
        image.resize(HEADER_SIZE + 3 * ENTRY_SIZE, 0);
        let err = Bank::parse(image).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader { .. }));
    }

    #[test]
    fn test_metadata_and_bank_type() {
        let mut header = BankHeader::new("meta", 0);
        header.metadata_offs = 0x100;
        header.entry_desc_offs = 0x140;
        let mut image = header.to_bytes().unwrap();

        let mut record = vec![7u8, 0, 0, 0];
        record.extend_from_slice(&[0u8; 28]);
        image.extend_from_slice(&record);
        image.extend_from_slice(&[0u8; 32]);
        image.extend_from_slice(b"sfx\0\0\0\0\0\0\0\0\0\0\0\0\0");

        let bank = Bank::parse(image).unwrap();
        assert_eq!(bank.metadata().len(), 1);
        assert_eq!(bank.metadata()[0].codec(), Codec::ImaAdpcm);
        assert_eq!(bank.bank_type(), Some("sfx"));
    }

    #[test]
    fn test_bad_metadata_range_is_ignored() {
        let mut header = BankHeader::new("meta", 0);
        header.metadata_offs = 0x400;
        header.entry_desc_offs = 0x200;
        let bank = Bank::parse(header.to_bytes().unwrap()).unwrap();
        assert!(bank.metadata().is_empty());
        assert_eq!(bank.bank_type(), None);
    }

    #[test]
    fn test_open_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.wbk");
        let bank = Bank::parse(image_with_entries(&[], 0x200)).unwrap();
        bank.save(&path).unwrap();

        let reopened = Bank::open(&path).unwrap();
        assert_eq!(reopened.as_bytes(), bank.as_bytes());
    }
}
