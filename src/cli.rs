// Command-line argument parsing (clap derive).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// HackMyVM command-line tool.
///
/// List machines, download them and manage your local configuration.
/// Configure your credentials first:
///   hack config fresh <username> <password> <api_key>
#[derive(Parser, Debug)]
#[command(name = "hack")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Path to the config file.
    #[arg(short, long, env = "HACKMYCLI_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Local configuration (credentials and custom keys).
    #[command(subcommand)]
    Config(ConfigCommands),

    /// List available machines.
    #[command(after_help = r#"Examples:
  hack list                        # Every machine, oldest first
  hack list --level hard -l 10     # First 10 hard machines
  hack list --pending --descendant # Your pending machines, newest first
  hack list --update               # Refresh the cached catalog
"#)]
    List(ListArgs),

    /// Insert a flag into a machine.
    Checkflag {
        flag: String,

        machine: String,

        /// Skip the machine existence check (not recommended).
        #[arg(long)]
        no_verify: bool,
    },

    /// Download a machine by name, or a literal URL with --no-verify.
    Download {
        machine: String,

        /// Skip the machine existence check and accept a literal URL.
        #[arg(long)]
        no_verify: bool,

        /// Directory to save the archive in.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Prepare a challenge or machine submission.
    #[command(subcommand)]
    Submit(SubmitCommands),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// all, easy, medium or hard.
    #[arg(long, default_value = "all")]
    pub level: String,

    /// Show your pending machines.
    #[arg(long)]
    pub pending: bool,

    /// Show your finished machines.
    #[arg(long)]
    pub finished: bool,

    /// Show at most this many rows (0 = all).
    #[arg(short, long, default_value_t = 0)]
    pub limit: usize,

    /// Newest first.
    #[arg(short, long)]
    pub descendant: bool,

    /// Re-fetch the catalog instead of using the cache.
    #[arg(short, long)]
    pub update: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set username, password and API key at once.
    Fresh {
        username: String,
        password: String,
        key: String,

        /// Wipe the config file before saving.
        #[arg(long)]
        clean: bool,
    },

    Username { username: String },

    /// Set the password (prompted when omitted).
    Password { password: Option<String> },

    /// Set the API key.
    Key { key: String },

    /// Store a custom key. The value is parsed as JSON when possible.
    Add { key: String, value: String },

    Remove { key: String },

    /// Print stored keys (password masked).
    Show,
}

#[derive(Subcommand, Debug)]
pub enum SubmitCommands {
    /// Stego, Programming, Crypto, Web, Reversing, OSINT, Forensic or Misc.
    Challenge {
        category: String,
        flag: String,
        description: String,
        solution: String,

        /// Where to download the challenge.
        #[arg(long)]
        url: Option<String>,
    },

    /// Level is one of Easy, Medium, Hard.
    Machine {
        name: String,
        url: String,
        user_flag: String,
        root_flag: String,
        level: String,
        notes: String,
        writeup: String,
    },
}
