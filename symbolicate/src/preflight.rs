//! Pre-flight checks for symbolicate
//!
//! Validates the input log and the output location before any work is done,
//! so a bad invocation fails fast with a clear message.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::SymbolicateError;

/// Run all pre-flight checks
///
/// # Errors
/// Returns the first failed check
pub fn run_preflight_checks(config: &Config) -> Result<(), SymbolicateError> {
    check_input_log(&config.log)?;
    check_output_folder(&config.output)?;
    Ok(())
}

/// Check that the input log exists and is not a directory
///
/// # Errors
/// `InputMissing` or `InputIsDirectory`
pub fn check_input_log(log: &Path) -> Result<(), SymbolicateError> {
    if !log.exists() {
        return Err(SymbolicateError::InputMissing(log.to_path_buf()));
    }
    if log.is_dir() {
        return Err(SymbolicateError::InputIsDirectory(log.to_path_buf()));
    }
    Ok(())
}

/// Check that the folder the output will be written into exists
///
/// # Errors
/// `OutputFolderMissing` or `OutputFolderNotDirectory`
pub fn check_output_folder(output: &Path) -> Result<(), SymbolicateError> {
    let folder = output_folder(output);
    if !folder.exists() {
        return Err(SymbolicateError::OutputFolderMissing(folder));
    }
    if !folder.is_dir() {
        return Err(SymbolicateError::OutputFolderNotDirectory(folder));
    }
    Ok(())
}

/// Parent directory of `output`; a bare file name lives in the current directory
#[must_use]
pub fn output_folder(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
