//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// wavscribe - record, convert to 16-bit PCM WAV, and transcribe
#[derive(Parser, Debug)]
#[command(name = "wavscribe")]
#[command(version)]
#[command(about = "Record microphone audio and upload it as 16-bit PCM WAV for transcription")]
#[command(long_about = None)]
pub struct Cli {
    /// Transcription endpoint URL
    #[arg(short = 'e', long, value_name = "URL", global = true)]
    pub endpoint: Option<String>,

    /// Stop recording automatically after this many seconds
    #[arg(short = 'm', long, value_name = "SECS")]
    pub max_duration: Option<u64>,

    /// Also save the converted WAV to this file
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Do not upload; only write the WAV given by --output
    #[arg(long, requires = "output")]
    pub no_upload: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an audio file to 16-bit PCM WAV
    Convert {
        /// Any audio file the decoder understands
        input: PathBuf,
        /// Destination WAV file
        output: PathBuf,
    },
    /// Convert an audio file and upload it for transcription
    Send {
        /// Any audio file the decoder understands
        file: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["endpoint", "max_duration", "queue_capacity", "timeout"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
