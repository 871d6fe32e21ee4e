//! Container formats

pub mod wbk;

pub use wbk::{Bank, BankHeader, EntryDescriptor, MetadataRecord};
