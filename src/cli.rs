use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::scan::DEFAULT_CHUNK_SIZE;

#[derive(Parser, Debug)]
#[command(name = "romforge")]
#[command(version)]
#[command(about = "Binary-format toolkit for ROM images", long_about = None)]
#[command(after_help = "Examples:\n  \
  romforge unzip update.zip -d out -o        extract, replacing existing files\n  \
  romforge free-space firered.gba -n 0x200   find 512 free bytes\n  \
  romforge header crystal.gbc --title TEST   rename a cartridge")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a ZIP archive, verifying every entry
    Unzip {
        /// Archive to extract
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Extract files into DIR
        #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(short = 'o', long)]
        overwrite: bool,
    },

    /// Find the first run of free bytes in a binary image
    FreeSpace {
        /// Image to search
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of free bytes needed
        #[arg(short = 'n', long = "length", value_parser = parse_length)]
        length: usize,

        /// Offset to start searching from
        #[arg(short = 's', long = "start", default_value = "0", value_parser = parse_offset)]
        start: u64,

        /// Byte value that marks free space
        #[arg(long, default_value = "0xFF", value_parser = parse_byte)]
        sentinel: u8,

        /// Bytes read per chunk
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_length)]
        chunk_size: usize,
    },

    /// Show a ROM header, optionally changing its title
    Header {
        /// ROM image (.gb .sgb .gbc .cgb .gba .agb .bin)
        #[arg(value_name = "ROM")]
        rom: PathBuf,

        /// New title to write into the header
        #[arg(long)]
        title: Option<String>,
    },

    /// Check for an update, then download and install it
    Update {
        /// URL of the `version;url` manifest
        #[arg(long, env = "ROMFORGE_MANIFEST_URL")]
        manifest_url: String,

        /// Version to compare against
        #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
        current_version: String,

        /// Where to install (default: the directory of this executable)
        #[arg(long, value_name = "DIR")]
        install_dir: Option<PathBuf>,

        /// Only report whether an update is available
        #[arg(long)]
        check_only: bool,
    },
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_offset(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

fn parse_length(s: &str) -> Result<usize, String> {
    let value = parse_offset(s)?;
    if value == 0 {
        return Err("must be at least 1".to_string());
    }
    usize::try_from(value).map_err(|_| format!("'{}' is too large", s))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let value = parse_offset(s)?;
    u8::try_from(value).map_err(|_| format!("'{}' does not fit in a byte", s))
}
