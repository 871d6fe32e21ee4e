//! Command execution implementations

use super::Commands;
use super::{extract, list, replace};
use crate::codec::AdpcmStateMode;

fn state_mode(per_channel: bool) -> AdpcmStateMode {
    if per_channel {
        AdpcmStateMode::PerChannel
    } else {
        AdpcmStateMode::Shared
    }
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Extract {
                bank,
                prefix,
                per_channel_state,
                parallel,
                quiet,
            } => extract::execute(
                bank,
                prefix,
                state_mode(*per_channel_state),
                *parallel,
                !*quiet,
            ),
            Commands::List { bank } => list::execute(bank),
            Commands::Info { bank } => list::info(bank),
            Commands::Replace {
                bank,
                index,
                wav,
                output,
                codec,
                per_channel_state,
                alignment,
            } => replace::execute(
                bank,
                *index,
                wav,
                output.as_deref(),
                *codec,
                state_mode(*per_channel_state),
                *alignment,
            ),
        }
    }
}
