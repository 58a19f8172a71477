//! dSYM discovery and normalization
//!
//! Turns the raw paths given on the command line into an ordered,
//! de-duplicated list of concrete DWARF binaries. Every rejected input is a
//! soft skip; the resolver never fails the run.

use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::DebugArtifact;

/// Extension of a debug-symbol package, compared case-insensitively
pub const DSYM_EXTENSION: &str = "dSYM";

/// Location of the DWARF binaries inside a `.dSYM` package
const DWARF_SUBDIR: [&str; 3] = ["Contents", "Resources", "DWARF"];

/// Whether `path` carries the `.dSYM` extension
#[must_use]
pub fn is_dsym(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DSYM_EXTENSION))
}

/// Directory holding the DWARF binaries of a `.dSYM` package
#[must_use]
pub fn dwarf_folder(package: &Path) -> PathBuf {
    DWARF_SUBDIR.iter().fold(package.to_path_buf(), |path, part| path.join(part))
}

/// Resolves user-supplied dSYM paths to debug artifacts
pub struct BundleResolver {
    verbose: bool,
}

impl BundleResolver {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run the full resolution: existence filter, directory expansion,
    /// package resolution and de-duplication, in that order
    #[must_use]
    pub fn resolve(&self, inputs: &[PathBuf]) -> Vec<DebugArtifact> {
        let existing = self.drop_missing(inputs);
        let expanded = self.expand_directories(existing);
        let artifacts = self.resolve_packages(expanded);
        self.dedup(artifacts)
    }

    fn drop_missing(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        inputs
            .iter()
            .filter(|path| {
                let exists = path.exists();
                if !exists && self.verbose {
                    info!(
                        "Skipping dSYM(s) as it doesn't exist at the given path: {}",
                        path.display()
                    );
                }
                exists
            })
            .cloned()
            .collect()
    }

    /// Replace plain folders by the `.dSYM` packages they directly contain
    fn expand_directories(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        let mut expanded = Vec::with_capacity(paths.len());

        for path in paths {
            if !path.is_dir() || is_dsym(&path) {
                expanded.push(path);
                continue;
            }

            let children = list_dsyms(&path);
            if self.verbose {
                info!("Found {} dSYM(s) in folder: {}", children.len(), path.display());
            }
            expanded.extend(children);
        }

        expanded
    }

    fn resolve_packages(&self, paths: Vec<PathBuf>) -> Vec<DebugArtifact> {
        paths
            .into_iter()
            .filter_map(|path| {
                if !is_dsym(&path) {
                    // Not a package: assume the user passed the DWARF binary itself
                    return Some(DebugArtifact::raw(path));
                }

                let folder = dwarf_folder(&path);
                match single_binary(&folder) {
                    Some(binary) => {
                        if self.verbose {
                            info!("Resolved {} to {}", path.display(), binary.display());
                        }
                        Some(DebugArtifact::package(path, binary))
                    }
                    None => {
                        warn!(
                            "Skipping dSYM as there was expected to be exactly one DWARF binary: {}",
                            folder.display()
                        );
                        None
                    }
                }
            })
            .collect()
    }

    fn dedup(&self, artifacts: Vec<DebugArtifact>) -> Vec<DebugArtifact> {
        let mut unique: Vec<DebugArtifact> = Vec::with_capacity(artifacts.len());

        for artifact in artifacts {
            if unique.iter().any(|seen| seen.binary == artifact.binary) {
                if self.verbose {
                    info!("Skipping duplicate dSYM: {}", artifact.input.display());
                }
                continue;
            }
            unique.push(artifact);
        }

        unique
    }
}

/// Immediate children of `dir` carrying the `.dSYM` extension, sorted by name
fn list_dsyms(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dsyms: Vec<PathBuf> =
        entries.flatten().map(|entry| entry.path()).filter(|path| is_dsym(path)).collect();
    dsyms.sort();
    dsyms
}

/// The only entry of `folder`, if it has exactly one
fn single_binary(folder: &Path) -> Option<PathBuf> {
    let mut entries = fs::read_dir(folder).ok()?.flatten();
    let first = entries.next()?;
    if entries.next().is_some() {
        return None;
    }
    Some(first.path())
}
