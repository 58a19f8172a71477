//! # symbolicate - Crash Log Symbolication with dSYM Bundles
//!
//! Rewrites the unresolved stack frames of a crash log with symbol names,
//! using the debug information in `.dSYM` bundles and the `atos` tool.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │  CLI / Config│──▶│    Preflight     │──▶│   Bundles    │
//! │   (clap)     │   │ (input, output)  │   │ (.dSYM → DWARF)
//! └──────────────┘   └──────────────────┘   └──────┬───────┘
//!                                                  │ artifacts
//!                                                  ▼
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │ Atomic write │◀──│  Line rewriting  │◀──│ atos per line│
//! │  (tempfile)  │   │  (FrameLine)     │   │ (cancellable)│
//! └──────────────┘   └──────────────────┘   └──────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`pipeline`]: stage machine driving a run from validation to output
//! - [`symbolization`]: dSYM discovery and the external `atos` resolver
//! - [`crash_log`]: frame line matching, rewriting, and log I/O
//! - [`cancellation`]: Ctrl+C handling through a cancellation token
//! - [`preflight`]: fatal checks on the input log and output folder
//! - [`cli`] / [`config`]: argument parsing and the run configuration
//! - [`domain`]: shared types and the error enum
//!
//! ## Typical Usage
//!
//! ```bash
//! # Symbolicate in place with every dSYM found in a folder
//! symbolicate crash.log ~/Archives/MyApp/dSYMs
//!
//! # Write to a separate file, x86_64 slice, with diagnostics
//! symbolicate -v --arch x86_64 --output symbolicated.log crash.log MyApp.app.dSYM
//! ```
//!
//! ## Guarantees
//!
//! - Lines that are not frame lines are copied byte for byte
//! - Frame lines keep their column alignment; only the `+ offset` suffix is replaced
//! - Ctrl+C stops the run immediately and writes nothing

pub mod cancellation;
pub mod cli;
pub mod config;
pub mod crash_log;
pub mod domain;
pub mod pipeline;
pub mod preflight;
pub mod symbolization;
