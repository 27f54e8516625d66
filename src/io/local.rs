use super::ReadAt;
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Local file reader with random access support
///
/// The file is opened read-only, so other readers may keep it open at the
/// same time. Callers must serialize scans against concurrent writers.
pub struct LocalFileReader {
    file: File,
    path: PathBuf,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::file_read(path, e))?;
        let size = file
            .metadata()
            .map_err(|e| Error::file_read(path, e))?
            .len();
        Ok(Self {
            file,
            path: path.to_path_buf(),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReadAt for LocalFileReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        #[cfg(unix)]
        let read = {
            use std::os::unix::fs::FileExt;
            self.file.read_at(buf, offset)
        };

        #[cfg(windows)]
        let read = {
            use std::os::windows::fs::FileExt;
            self.file.seek_read(buf, offset)
        };

        #[cfg(not(any(unix, windows)))]
        let read = {
            use std::io::Read;
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))
                .and_then(|_| file.read(buf))
        };

        read.map_err(|e| Error::file_read(&self.path, e))
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Writable handle on a host binary image
///
/// Writes land at absolute offsets; the file is never truncated or extended
/// past the written range.
pub struct HostFile {
    file: File,
    path: PathBuf,
}

impl HostFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| Error::file_write(path, e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Write `data` starting at `offset`
    pub fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.write_all(data))
            .and_then(|_| self.file.flush())
            .map_err(|e| Error::file_write(&self.path, e))
    }
}
