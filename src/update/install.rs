use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::zip::ZipExtractor;

const EXE_EXT: &str = ".exe";
const STAGED_EXE_EXT: &str = ".new.exe";
const BACKUP_EXT: &str = ".bak";

/// Unpack an update archive into `app_dir`.
///
/// The archive is extracted into a fresh temporary directory first, so a
/// rejected archive leaves `app_dir` untouched. Top-level files are then
/// moved over, replacing existing ones; executables are staged as
/// `<stem>.new.exe` because the running binary cannot be replaced in place.
/// Nested directories in the archive are not installed.
///
/// Returns the installed paths, sorted.
pub fn install_update(payload: &[u8], app_dir: &Path) -> Result<Vec<PathBuf>> {
    let staging = tempfile::Builder::new()
        .prefix("romforge-update-")
        .tempdir()
        .map_err(|e| Error::directory_create(std::env::temp_dir(), e))?;

    let summary = ZipExtractor::try_extract(payload, staging.path(), true)?;
    debug!(
        files = summary.written.len(),
        staging = %staging.path().display(),
        "update archive extracted"
    );

    fs::create_dir_all(app_dir).map_err(|e| Error::directory_create(app_dir, e))?;

    let entries = fs::read_dir(staging.path()).map_err(|e| Error::file_read(staging.path(), e))?;
    let mut installed = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| Error::file_read(staging.path(), e))?;
        let source = entry.path();
        let is_file = entry
            .file_type()
            .map_err(|e| Error::file_read(&source, e))?
            .is_file();
        if !is_file {
            continue;
        }

        let dest = app_dir.join(staged_name(&entry.file_name()));
        replace_file(&source, &dest)?;
        info!("Installed {}", dest.display());
        installed.push(dest);
    }

    installed.sort();
    Ok(installed)
}

/// Swap a staged `<stem>.new.exe` into place.
///
/// `exe_name` may be either the regular or the staged file name; everything
/// after the first `.` is ignored. The current `<stem>.exe` is kept as
/// `<stem>.exe.bak`, replacing an older backup. Returns `false` when nothing
/// is staged.
pub fn promote_staged_executable(app_dir: &Path, exe_name: &str) -> Result<bool> {
    let stem = exe_name.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        return Err(Error::invalid_argument(format!(
            "'{}' has no executable stem",
            exe_name
        )));
    }

    let current = app_dir.join(format!("{stem}{EXE_EXT}"));
    let staged = app_dir.join(format!("{stem}{STAGED_EXE_EXT}"));
    let backup = app_dir.join(format!("{stem}{EXE_EXT}{BACKUP_EXT}"));

    if !staged.is_file() {
        debug!(path = %staged.display(), "no staged executable");
        return Ok(false);
    }

    if current.exists() {
        if backup.exists() {
            fs::remove_file(&backup).map_err(|e| Error::file_write(&backup, e))?;
        }
        fs::rename(&current, &backup).map_err(|e| Error::file_write(&backup, e))?;
    }
    fs::rename(&staged, &current).map_err(|e| Error::file_write(&current, e))?;

    info!("Promoted {} to {}", staged.display(), current.display());
    Ok(true)
}

/// Promote the staged update of the executable at `exe`, if there is one.
///
/// Meant to run at startup with [`std::env::current_exe`].
pub fn promote_for_executable(exe: &Path) -> Result<bool> {
    let (Some(app_dir), Some(name)) = (exe.parent(), exe.file_name()) else {
        return Err(Error::invalid_argument(format!(
            "'{}' is not an executable path",
            exe.display()
        )));
    };
    promote_staged_executable(app_dir, &name.to_string_lossy())
}

/// `tool.exe` becomes `tool.new.exe`; other names are kept.
fn staged_name(name: &OsStr) -> OsString {
    let is_exe = name.to_string_lossy().to_ascii_lowercase().ends_with(EXE_EXT);
    if !is_exe || name.len() == EXE_EXT.len() {
        return name.to_os_string();
    }

    let mut staged = Path::new(name)
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    staged.push(STAGED_EXE_EXT);
    staged
}

/// Move `source` over `dest`, copying when a rename cannot cross filesystems.
fn replace_file(source: &Path, dest: &Path) -> Result<()> {
    if dest.is_file() {
        fs::remove_file(dest).map_err(|e| Error::file_write(dest, e))?;
    }
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    fs::copy(source, dest).map_err(|e| Error::file_write(dest, e))?;
    Ok(())
}
