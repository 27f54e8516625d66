use flate2::read::DeflateDecoder;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::checksum::crc32;
use crate::error::{Error, Result};

use super::parser::{LocalEntry, ZipParser};
use super::structures::{CompressionMethod, ExtractedEntry};

/// Upper bound for up-front allocation from a declared size
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// What an extraction run did on disk
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Files and directories written
    pub written: Vec<PathBuf>,
    /// Existing files left untouched because overwriting was off
    pub skipped: Vec<PathBuf>,
}

/// ZIP file extractor
///
/// Every accepted entry is decompressed and checked against its declared
/// size and CRC-32 before it is written. The first failure stops the run;
/// files written for earlier entries stay on disk.
pub struct ZipExtractor<'a> {
    parser: ZipParser<'a>,
}

impl<'a> ZipExtractor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            parser: ZipParser::new(data),
        }
    }

    /// Extract `data` into `target_dir`, reporting only success or failure.
    ///
    /// Returns `true` only if every entry was extracted and verified. Failures
    /// are logged.
    pub fn extract(data: &[u8], target_dir: &Path, overwrite: bool) -> bool {
        match Self::try_extract(data, target_dir, overwrite) {
            Ok(summary) => {
                debug!(
                    written = summary.written.len(),
                    skipped = summary.skipped.len(),
                    "archive extracted"
                );
                true
            }
            Err(e) => {
                warn!("Archive extraction failed: {}", e);
                false
            }
        }
    }

    /// Extract `data` into `target_dir`, keeping the failure reason.
    pub fn try_extract(data: &[u8], target_dir: &Path, overwrite: bool) -> Result<ExtractSummary> {
        ZipExtractor::new(data).extract_to_dir(target_dir, overwrite)
    }

    /// Decompress and verify every entry into memory without touching disk.
    pub fn read_entries(&self) -> Result<Vec<ExtractedEntry>> {
        self.parser
            .list_files()?
            .iter()
            .map(|central| {
                let local = self.parser.read_local_entry(central)?;
                extract_to_memory(&local)
            })
            .collect()
    }

    /// Extract every entry into `target_dir`.
    ///
    /// Existing files are skipped unless `overwrite` is set.
    pub fn extract_to_dir(&self, target_dir: &Path, overwrite: bool) -> Result<ExtractSummary> {
        let mut summary = ExtractSummary::default();

        for central in self.parser.list_files()? {
            let local = self.parser.read_local_entry(&central)?;
            let entry = extract_to_memory(&local)?;
            let output_path = output_path(target_dir, &entry.relative_path)?;

            if entry.is_directory() {
                fs::create_dir_all(&output_path)
                    .map_err(|e| Error::directory_create(&output_path, e))?;
                summary.written.push(output_path);
                continue;
            }

            if output_path.exists() && !overwrite {
                debug!("Skipping: {} (file exists)", output_path.display());
                summary.skipped.push(output_path);
                continue;
            }

            // Create parent directories if needed
            if let Some(parent) = output_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| Error::directory_create(parent, e))?;
                }
            }

            fs::write(&output_path, &entry.data).map_err(|e| Error::file_write(&output_path, e))?;
            info!("  extracting: {}", entry.relative_path);
            summary.written.push(output_path);
        }

        Ok(summary)
    }
}

/// Decompress a located entry and verify its size and CRC-32.
fn extract_to_memory(local: &LocalEntry<'_>) -> Result<ExtractedEntry> {
    let data = if local.uncompressed_size == 0 {
        Vec::new()
    } else {
        match local.method {
            CompressionMethod::Stored => local.payload.to_vec(),
            CompressionMethod::Deflate => inflate(local)?,
            CompressionMethod::Unknown(method) => {
                return Err(Error::UnsupportedMethod {
                    name: local.name.clone(),
                    method,
                });
            }
        }
    };

    if data.len() as u64 != local.uncompressed_size {
        return Err(Error::UncompressedSizeMismatch {
            name: local.name.clone(),
            expected: local.uncompressed_size,
            actual: data.len() as u64,
        });
    }

    let actual = crc32(&data);
    if actual != local.crc32 {
        return Err(Error::CrcMismatch {
            name: local.name.clone(),
            expected: local.crc32,
            actual,
        });
    }

    Ok(ExtractedEntry {
        relative_path: local.name.clone(),
        data,
    })
}

/// Inflate a raw deflate payload (no zlib or gzip framing).
///
/// Reads at most one byte past the declared size, which is enough to detect
/// an oversized stream.
fn inflate(local: &LocalEntry<'_>) -> Result<Vec<u8>> {
    let limit = local.uncompressed_size + 1;
    let mut data = Vec::with_capacity(local.uncompressed_size.min(MAX_PREALLOC) as usize);
    DeflateDecoder::new(local.payload)
        .take(limit)
        .read_to_end(&mut data)
        .map_err(|source| Error::Inflate {
            name: local.name.clone(),
            source,
        })?;
    Ok(data)
}

/// Join an entry name onto the target directory.
///
/// Absolute names and names with `..` components are rejected.
fn output_path(target_dir: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::path_traversal(relative));
    }
    Ok(target_dir.join(relative))
}
