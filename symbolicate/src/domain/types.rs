//! Core domain types
//!
//! Newtypes and small enums shared by the bundle resolver, the line matcher
//! and the symbol resolver.

use std::fmt;
use std::path::{Path, PathBuf};

/// A `0x`-prefixed hexadecimal address token taken verbatim from a log line
///
/// The token is never reformatted: the external resolver receives exactly the
/// text that appeared in the crash log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexAddress(pub String);

impl HexAddress {
    /// Numeric value of the address, if it fits in 64 bits
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        let digits = self.0.strip_prefix("0x").unwrap_or(&self.0);
        u64::from_str_radix(digits, 16).ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a debug artifact was supplied by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Path pointed straight at a DWARF binary
    RawBinary,
    /// Path pointed at a `.dSYM` package that contained exactly one binary
    Package,
}

/// A debug-symbol binary the external resolver can be pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugArtifact {
    /// Path as it appeared after directory expansion
    pub input: PathBuf,
    /// Concrete binary file; identity of the artifact
    pub binary: PathBuf,
    pub kind: ArtifactKind,
}

impl DebugArtifact {
    #[must_use]
    pub fn raw(path: PathBuf) -> Self {
        Self { input: path.clone(), binary: path, kind: ArtifactKind::RawBinary }
    }

    #[must_use]
    pub fn package(package: PathBuf, binary: PathBuf) -> Self {
        Self { input: package, binary, kind: ArtifactKind::Package }
    }

    /// Final path component of the binary, compared against library names
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.binary.file_name().and_then(|n| n.to_str())
    }

    /// Whether this artifact provides symbols for `library`
    #[must_use]
    pub fn provides(&self, library: &str) -> bool {
        self.file_name() == Some(library)
    }
}

/// One call into the external resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicationRequest {
    pub arch: String,
    pub binary: PathBuf,
    pub load_address: HexAddress,
    pub call_address: HexAddress,
}

impl SymbolicationRequest {
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

/// Answer of the external resolver for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolicationResult {
    /// Non-empty, trimmed symbol text
    Symbol(String),
    /// Explicit failure or an empty/whitespace-only answer
    NoResult,
}

impl SymbolicationResult {
    /// Interpret raw resolver output
    ///
    /// Surrounding whitespace and newlines are trimmed; nothing left means no result.
    #[must_use]
    pub fn from_output(raw: &str) -> Self {
        let symbol = raw.trim();
        if symbol.is_empty() {
            Self::NoResult
        } else {
            Self::Symbol(symbol.to_string())
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(s) => Some(s),
            Self::NoResult => None,
        }
    }
}

/// Result of an operation that a user interrupt can abort
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
