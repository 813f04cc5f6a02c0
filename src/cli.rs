//! Command line interface.

use clap::{Parser, Subcommand};

/// Posts new RSS/Atom feed entries to a Telegram chat
#[derive(Parser, Debug)]
#[command(name = "rssbot", version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the bot: scheduled feed updates, reaction handling and health probes")]
    Run,

    #[command(about = "Remove every stored posted entry and the last post time, then exit")]
    Clear,

    #[command(about = "Run a single feed update now, then exit")]
    Update,
}

impl CliArgs {
    /// The command to execute; running the bot when none is given.
    pub fn resolved_command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}
