//! Structured error types for symbolicate
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Generic failure status for validation and I/O errors
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum SymbolicateError {
    #[error("Input file doesn't exist: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("Input file is a directory: {}", .0.display())]
    InputIsDirectory(PathBuf),

    #[error("Output folder doesn't exist: {}", .0.display())]
    OutputFolderMissing(PathBuf),

    #[error("Output folder isn't a directory: {}", .0.display())]
    OutputFolderNotDirectory(PathBuf),

    #[error("Error while reading input file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Error while writing to the output: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to launch {}: {source}", .program.display())]
    ResolverLaunchFailed { program: PathBuf, source: std::io::Error },

    #[error("{} exited with status {status}", .program.display())]
    ResolverFailed { program: PathBuf, status: i32 },

    #[error("{} was terminated without an exit status", .program.display())]
    ResolverKilled { program: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SymbolicateError {
    /// Process exit status to report for this error
    ///
    /// A failing resolver's own status is propagated verbatim; everything else
    /// maps to the generic failure status.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ResolverFailed { status, .. } => *status,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = SymbolicateError::InputMissing(PathBuf::from("/tmp/crash.log"));
        assert_eq!(err.to_string(), "Input file doesn't exist: /tmp/crash.log");

        let err = SymbolicateError::OutputFolderNotDirectory(PathBuf::from("/tmp/file"));
        assert_eq!(err.to_string(), "Output folder isn't a directory: /tmp/file");
    }

    #[test]
    fn test_resolver_status_is_propagated() {
        let err =
            SymbolicateError::ResolverFailed { program: PathBuf::from("/usr/bin/atos"), status: 3 };
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("/usr/bin/atos"));
    }

    #[test]
    fn test_other_errors_use_generic_status() {
        let err = SymbolicateError::InputIsDirectory(PathBuf::from("/tmp"));
        assert_eq!(err.exit_code(), EXIT_FAILURE);

        let err = SymbolicateError::ResolverKilled { program: PathBuf::from("atos") };
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }
}
