//! # Symbol Resolution Against dSYM Bundles
//!
//! Crash logs from Apple platforms record each stack frame as a library name,
//! the address of the instruction, and the address the library was loaded at:
//!
//! ```text
//! 3   MyFramework    0x0000000104a1c3f0 0x0000000104a00000 + 115696
//! ```
//!
//! Turning that into `-[MyObject doWork] (in MyFramework) (MyObject.m:42)`
//! needs the DWARF debug information that the compiler wrote into a separate
//! **dSYM bundle**. This module finds those bundles and asks an external
//! resolver (`atos`) to do the lookup; the DWARF data is never parsed here.
//!
//! ## dSYM Bundles
//!
//! A `.dSYM` is a directory package. The debug binary lives at a fixed place
//! inside it, named after the library it describes:
//!
//! ```text
//! MyFramework.framework.dSYM/
//! └── Contents/
//!     ├── Info.plist
//!     └── Resources/
//!         └── DWARF/
//!             └── MyFramework      <- passed to `atos -o`
//! ```
//!
//! A frame is matched to a bundle by comparing the library name in the log
//! with the file name of that DWARF binary.
//!
//! ## Address Translation
//!
//! Libraries are loaded at a randomized base address (ASLR). `atos` takes the
//! runtime load address with `-l` and computes the file offset itself:
//!
//! ```text
//! File Offset = Call Address - Load Address
//! ```
//!
//! ## Module Structure
//!
//! - **`bundles`**: turns user-supplied paths into concrete DWARF binaries
//!   - drops missing paths, expands plain folders one level deep
//!   - resolves `.dSYM` packages to their single DWARF binary
//!   - removes duplicates by resolved binary path
//!
//! - **`atos`**: runs the external resolver for one frame
//!   - one process per request, strictly sequential
//!   - polls the child so a Ctrl+C can interrupt it
//!
//! ## Example
//!
//! ```rust,ignore
//! let artifacts = BundleResolver::new(false).resolve(&[PathBuf::from("./dSYMs")]);
//! let resolver = AtosResolver::new("/usr/bin/atos", false);
//! let outcome = resolver.lookup(&request, &cancel).await?;
//! ```

pub mod atos;
pub mod bundles;

pub use atos::{AtosResolver, SymbolLookup, POLL_INTERVAL};
pub use bundles::{is_dsym, BundleResolver, DSYM_EXTENSION};
