//! CLI command for decoding a bank to WAV files

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;

use crate::audio::write_wav;
use crate::cli::progress::{DISK, LOOKING_GLASS, NOTE, print_done, print_step, simple_bar};
use crate::codec::AdpcmStateMode;
use crate::formats::wbk::{Bank, BankProgress, ReadOptions};

/// Output path for 1-based track `number`
fn track_path(prefix: &str, number: usize) -> PathBuf {
    PathBuf::from(format!("{prefix}{number}.wav"))
}

pub fn execute(
    source: &Path,
    prefix: &str,
    state_mode: AdpcmStateMode,
    parallel: bool,
    progress: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let options = ReadOptions::new().with_state_mode(state_mode);

    print_step(1, 3, LOOKING_GLASS, &format!("Reading {}...", source.display()));
    let bank = Bank::open(source).with_context(|| format!("failed to read {}", source.display()))?;

    print_step(
        2,
        3,
        NOTE,
        &format!("Decoding {} entries ({} state)...", bank.entries().len(), state_mode.as_str()),
    );
    let contents = if parallel {
        bank.read_tracks_parallel(&options)
    } else if progress {
        let pb = simple_bar(bank.entries().len() as u64, "Decoding");
        let contents = bank.read_tracks(
            &options,
            Some(&|p: &BankProgress| {
                pb.set_position(p.current as u64);
                if let Some(entry) = &p.current_entry {
                    pb.set_message(entry.clone());
                }
            }),
        );
        pb.finish_and_clear();
        contents
    } else {
        bank.read_tracks(&options, None)
    };

    print_step(3, 3, DISK, &format!("Writing {} WAV files...", contents.tracks.len()));
    let first = track_path(prefix, 1);
    if let Some(parent) = first.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    for track in contents.tracks {
        let path = track_path(prefix, track.index + 1);
        write_wav(&path, &track.into_pcm())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    for (index, err) in &contents.errors {
        println!("Skipped entry {}: {err}", index + 1);
    }

    print_done(started.elapsed());
    Ok(())
}
