//! Crash log reading and writing
//!
//! The log is handled as UTF-8 text split on `\n` only, so joining the lines
//! back with `\n` reproduces an untouched log byte for byte.

pub mod line;

pub use line::FrameLine;

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::SymbolicateError;
use crate::preflight::output_folder;

/// Read a crash log into its lines
///
/// A log with N newlines yields N + 1 lines; the last one may be empty.
///
/// # Errors
/// `ReadFailed` if the file cannot be read or is not valid UTF-8
pub fn read_log(path: &Path) -> Result<Vec<String>, SymbolicateError> {
    let text = fs::read_to_string(path).map_err(SymbolicateError::ReadFailed)?;
    Ok(split_lines(&text))
}

/// Split text on `\n`, keeping any `\r` with its line
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Write `lines` to `path` atomically
///
/// The content goes to a temporary file next to the destination, which is then
/// renamed over it; a pre-existing file is never left partially written.
/// The replacement keeps the permissions of the file it replaces, and a new
/// file is created as `0644` on unix.
///
/// # Errors
/// `WriteFailed` if the temporary file cannot be created, written or renamed
pub fn write_log_atomic(path: &Path, lines: &[String]) -> Result<(), SymbolicateError> {
    let mut temp = NamedTempFile::new_in(output_folder(path)).map_err(SymbolicateError::WriteFailed)?;
    temp.write_all(lines.join("\n").as_bytes()).map_err(SymbolicateError::WriteFailed)?;
    temp.flush().map_err(SymbolicateError::WriteFailed)?;
    if let Some(permissions) = destination_permissions(path) {
        temp.as_file().set_permissions(permissions).map_err(SymbolicateError::WriteFailed)?;
    }
    temp.persist(path).map_err(|e| SymbolicateError::WriteFailed(e.error))?;
    Ok(())
}

/// Permissions the written log should end up with
fn destination_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_counts() {
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines("a\r\nb"), vec!["a\r", "b"]);
    }

    #[test]
    fn test_round_trip_is_byte_exact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("crash.log");
        let output = dir.path().join("out.log");
        let text = "Thread 0 Crashed:\r\n0   MyApp  0x10  0x0  + 16\n\n\ttrailing\t\n";
        fs::write(&input, text).unwrap();

        let lines = read_log(&input).unwrap();
        write_log_atomic(&output, &lines).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), text);
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.log");
        fs::write(&path, "old contents that are longer than the new ones").unwrap();

        write_log_atomic(&path, &["new".to_string()]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        // Only the destination remains; the temporary file was renamed
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.log");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_log_atomic(&path, &["new".to_string()]).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");

        write_log_atomic(&path, &["new".to_string()]).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_read_missing_file_fails() {
        let err = read_log(Path::new("/nonexistent/crash.log")).unwrap_err();
        assert!(matches!(err, SymbolicateError::ReadFailed(_)));
    }

    #[test]
    fn test_read_invalid_utf8_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.log");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_log(&path), Err(SymbolicateError::ReadFailed(_))));
    }

    #[test]
    fn test_write_into_missing_folder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.log");
        let err = write_log_atomic(&path, &["x".to_string()]).unwrap_err();
        assert!(err.to_string().starts_with("Error while writing to the output"));
    }
}
