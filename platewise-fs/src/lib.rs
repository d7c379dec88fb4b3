//! Capability-based filesystem helpers for the database file and log
//! directory.
//!
//! Paths are UTF-8 (`camino`) and every operation goes through a `cap-std`
//! directory handle opened at the path's anchor: the filesystem root for
//! absolute paths, the drive prefix on Windows, or `.` for relative paths.
#![forbid(unsafe_code)]

use std::io;
use std::path::{Component, MAIN_SEPARATOR};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Create `path` and any missing ancestors. Existing directories are left
/// untouched.
///
/// # Errors
/// Returns the underlying I/O error when a component cannot be created.
pub fn ensure_dir(path: &Utf8Path) -> io::Result<()> {
    let (anchor, relative) = anchored(path)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    anchor.create_dir_all(&relative)
}

/// Make sure the directory that will hold the database file at `path`
/// exists, and report whether the database file is already present.
///
/// In-memory paths such as `:memory:` have no parent and report `false`.
///
/// # Errors
/// Returns the underlying I/O error when the parent cannot be created or
/// inspected.
pub fn prepare_database_path(path: &Utf8Path) -> io::Result<bool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        ensure_dir(parent)?;
    }
    is_file(path)
}

/// Report whether `path` names an existing regular file.
///
/// # Errors
/// Returns the underlying I/O error for failures other than the file or its
/// directory being absent.
pub fn is_file(path: &Utf8Path) -> io::Result<bool> {
    let Some(name) = path.file_name() else {
        return Ok(false);
    };
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let (anchor, relative) = anchored(parent)?;
    let dir = if relative.as_str().is_empty() {
        anchor
    } else {
        match anchor.open_dir(&relative) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err),
        }
    };
    match dir.metadata(name) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Split `path` into an ambient directory handle for its anchor and the
/// remaining relative path.
fn anchored(path: &Utf8Path) -> io::Result<(Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();
    let anchor = match std_path.components().next() {
        Some(Component::Prefix(prefix)) => {
            let drive = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(format!("{drive}{MAIN_SEPARATOR}"))
        }
        Some(Component::RootDir) => Utf8PathBuf::from(MAIN_SEPARATOR.to_string()),
        _ => Utf8PathBuf::from("."),
    };
    let relative = if anchor.as_str() == "." {
        path.to_path_buf()
    } else {
        path.strip_prefix(&anchor)
            .map_err(|_| io::Error::other(format!("cannot strip {anchor} from {path}")))?
            .to_path_buf()
    };
    let dir = Dir::open_ambient_dir(&anchor, ambient_authority())?;
    Ok((dir, relative))
}
