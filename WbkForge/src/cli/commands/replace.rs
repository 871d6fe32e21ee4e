//! CLI command for replacing a track and repacking the bank

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::audio::read_wav;
use crate::cli::progress::{DISK, GEAR, LOOKING_GLASS, print_done, print_step};
use crate::codec::AdpcmStateMode;
use crate::formats::wbk::{Bank, BankPhase, BankProgress, Codec, RepackOptions};

pub fn execute(
    source: &Path,
    number: usize,
    wav: &Path,
    output: Option<&Path>,
    codec: Codec,
    state_mode: AdpcmStateMode,
    alignment: usize,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let destination = output.unwrap_or(source);
    let options = RepackOptions::new()
        .with_alignment(alignment)
        .with_state_mode(state_mode);

    print_step(1, 3, LOOKING_GLASS, &format!("Reading {}...", source.display()));
    let bank = Bank::open(source).with_context(|| format!("failed to read {}", source.display()))?;
    let audio = read_wav(wav).with_context(|| format!("failed to read {}", wav.display()))?;

    print_step(
        2,
        3,
        GEAR,
        &format!(
            "Replacing track {number} ({} ch, {} Hz, {:.2}s)...",
            audio.channels,
            audio.sample_rate,
            audio.duration_secs()
        ),
    );
    let rebuilt = bank.replace_with_options(
        number,
        &audio,
        codec,
        &options,
        Some(&|p: &BankProgress| {
            if p.phase == BankPhase::RelocatingEntries {
                tracing::debug!("{} {}/{}", p.phase.as_str(), p.current, p.total);
            }
        }),
    )?;

    print_step(3, 3, DISK, &format!("Writing {}...", destination.display()));
    rebuilt
        .save(destination)
        .with_context(|| format!("failed to write {}", destination.display()))?;

    println!("Bank size: {} -> {} bytes", bank.len(), rebuilt.len());
    print_done(started.elapsed());
    Ok(())
}
