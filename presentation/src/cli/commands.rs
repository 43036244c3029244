//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for parley
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about = "Practice a language with an AI tutor that corrects you as you chat")]
#[command(long_about = r#"
Parley is a conversational language tutor. Every reply can carry inline
corrections, more natural alternatives and a word of encouragement, which
are shown next to the message that prompted them.

Configuration files are loaded from (in priority order):
1. PARLEY_* environment variables (PARLEY_PROVIDER__MODEL=gpt-4.1)
2. --config <path>     Explicit config file
3. ./parley.toml       Project-level config
4. ~/.config/parley/config.toml   Global config

Example:
  parley chat --character 1
  parley chat --language Japanese --native Spanish
  parley serve --port 8080
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and the effective config, then exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP API (POST /api/chat and friends)
    Serve {
        /// Address to bind (overrides [server] host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides [server] port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with a tutor in the terminal
    Chat {
        /// Persona to start with (see /characters)
        #[arg(short, long, value_name = "ID")]
        character: Option<String>,

        /// Language to practice when no persona is chosen
        #[arg(short, long, value_name = "LANG", conflicts_with = "character")]
        language: Option<String>,

        /// Your first language, used for explanations
        #[arg(short, long, value_name = "LANG")]
        native: Option<String>,

        /// Suppress the typing indicator
        #[arg(short, long)]
        quiet: bool,
    },
}

impl Cli {
    /// The subcommand to run, `chat` when none was given.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat {
            character: None,
            language: None,
            native: None,
            quiet: false,
        })
    }
}
