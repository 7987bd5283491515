use std::fs::{self, Permissions};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Writes `header` and `rows` to `path`, replacing any existing file.
///
/// Rows go to a temporary file in the same directory which is renamed onto
/// `path` only after everything was flushed, so a failed write never leaves a
/// truncated CSV behind. An existing file keeps its permissions, and a symlink
/// at `path` keeps pointing at the rewritten file. Returns the number of data
/// rows written.
pub fn write_csv<I>(path: &Path, header: &[String], rows: I) -> Result<usize>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let target = resolve_target(path);
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = temp_file_for(&target, &dir)?;
    let mut count = 0;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        writer.write_record(header)?;
        for row in rows {
            if row.len() != header.len() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("row has {} fields, header has {}", row.len(), header.len()),
                )));
            }
            writer.write_record(&row)?;
            count += 1;
        }
        writer.flush()?;
    }

    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Wrote {} rows to {}", count, target.display());
    Ok(count)
}

/// Follows a symlink at `path` so the rename lands on the file it points to.
fn resolve_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

fn temp_file_for(target: &Path, dir: &Path) -> std::io::Result<NamedTempFile> {
    match fs::metadata(target) {
        Ok(meta) => {
            let tmp = NamedTempFile::new_in(dir)?;
            tmp.as_file().set_permissions(meta.permissions())?;
            Ok(tmp)
        }
        Err(_) => {
            let mut builder = tempfile::Builder::new();
            if let Some(perms) = new_file_permissions() {
                builder.permissions(perms);
            }
            builder.tempfile_in(dir)
        }
    }
}

/// Same mode a plain `File::create` would get; the umask still applies.
#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
