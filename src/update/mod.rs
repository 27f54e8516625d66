//! Self-update: manifest check, cancellable download and installation.
//!
//! The manifest is a single `version;url` line. A typical run:
//!
//! 1. [`UpdateClient::check`] fetches and parses the manifest
//! 2. [`UpdateClient::spawn_download`] fetches the archive on a background
//!    task, streaming [`DownloadProgress`] until done or canceled
//! 3. [`install_update`] unpacks the archive next to the program, staging
//!    executables as `<stem>.new.exe`
//! 4. On the next start, [`promote_for_executable`] swaps the staged
//!    executable into place

mod client;
mod download;
mod install;
mod manifest;

pub use client::{DEFAULT_TIMEOUT, UpdateClient, UpdateConfig};
pub use download::{ChunkSource, DownloadOutcome, DownloadProgress, DownloadTask, download_from};
pub use install::{install_update, promote_for_executable, promote_staged_executable};
pub use manifest::{UpdateInfo, is_newer, parse_manifest};
