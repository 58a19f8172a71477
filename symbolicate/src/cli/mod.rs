//! Command-line interface for symbolicate
//!
//! This module contains CLI argument parsing and input path normalization

pub mod args;

pub use args::{normalize_path, Args};
