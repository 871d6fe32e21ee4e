//! CLI commands for listing bank entries and showing the header

use std::path::Path;

use anyhow::Context;

use crate::formats::wbk::Bank;

/// Format byte size for human-readable output
fn format_size(bytes: usize) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}")
    }
}

fn open(source: &Path) -> anyhow::Result<Bank> {
    Bank::open(source).with_context(|| format!("failed to read {}", source.display()))
}

pub fn execute(source: &Path) -> anyhow::Result<()> {
    let bank = open(source)?;

    println!(
        "{:>4}  {:>10}  {:<14} {:>9} {:>3} {:>6} {:>4} {:>8}  {:>10}",
        "#", "hash", "codec", "samples", "ch", "rate", "bps", "ms", "offset"
    );
    for (i, entry) in bank.entries().iter().enumerate() {
        println!(
            "{:>4}  {:#010x}  {:<14} {:>9} {:>3} {:>6} {:>4} {:>8}  {:#010x}",
            i + 1,
            entry.hash,
            entry.codec().to_string(),
            entry.decoded_sample_count(),
            entry.channel_count(),
            entry.sample_rate,
            entry.bits_per_sample(),
            entry.duration_ms(),
            entry.data_offset
        );
    }

    if !bank.metadata().is_empty() {
        println!();
        println!("Metadata records: {}", bank.metadata().len());
        for (i, record) in bank.metadata().iter().enumerate() {
            println!(
                "{:>4}  {:<14} flags={:02x?} unknown={:#x} values={:?}",
                i + 1,
                record.codec().to_string(),
                record.flags,
                record.unknown,
                record.values
            );
        }
    }

    if let Some(bank_type) = bank.bank_type() {
        println!();
        println!("Bank type: {bank_type}");
    }

    Ok(())
}

pub fn info(source: &Path) -> anyhow::Result<()> {
    let bank = open(source)?;
    let header = bank.header();

    println!("Name:            {}", header.name());
    println!("Magic:           {:02x?}", header.magic);
    println!("Entries:         {}", bank.entries().len());
    println!(
        "Size:            {} ({} in header)",
        format_size(bank.len()),
        format_size(header.total_bytes as usize)
    );
    println!("Metadata:        {:#x}..{:#x}", header.metadata_offs, header.entry_desc_offs);
    println!("Sample data:     {:#x}", header.sample_data_offs);
    println!("Metadata records {}", bank.metadata().len());
    if let Some(bank_type) = bank.bank_type() {
        println!("Bank type:       {bank_type}");
    }
    if header.total_bytes as usize != bank.len() {
        println!("Warning: header size does not match file size");
    }

    Ok(())
}
