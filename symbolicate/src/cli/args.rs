//! CLI argument definitions

use clap::Parser;
use std::path::{Component, PathBuf};

/// Resolver used when `--atos` is not given
pub const DEFAULT_ATOS: &str = "/usr/bin/atos";

#[derive(Parser, Debug)]
#[command(
    name = "symbolicate",
    version,
    about = "Symbolicate the stack frames of a crash log using dSYM files",
    after_help = "\
EXAMPLES:
    symbolicate crash.log MyApp.app.dSYM             Symbolicate in place
    symbolicate --output out.log crash.log ./dSYMs    Use every dSYM in a folder
    symbolicate --arch x86_64 crash.log MyLib         Point at a DWARF binary directly"
)]
pub struct Args {
    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// The architecture to symbolicate
    #[arg(long, default_value = "arm64")]
    pub arch: String,

    /// File to write the symbolicated log to (overwritten if it exists).
    /// Defaults to overwriting the input log
    #[arg(long, value_name = "FILE", value_parser = parse_path)]
    pub output: Option<PathBuf>,

    /// Resolver program invoked once per symbolicated frame
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ATOS, value_parser = parse_path)]
    pub atos: PathBuf,

    /// The crash log to symbolicate
    #[arg(value_name = "LOG", value_parser = parse_path)]
    pub log: PathBuf,

    /// dSYM files, DWARF binaries, or folders containing dSYM files (not searched recursively)
    #[arg(value_name = "DSYM", value_parser = parse_path)]
    pub dsym: Vec<PathBuf>,
}

#[allow(clippy::unnecessary_wraps)] // clap value parsers must return a Result
fn parse_path(raw: &str) -> Result<PathBuf, String> {
    Ok(normalize_path(raw))
}

/// Standardize a user-supplied path
///
/// Strips surrounding double quotes, expands a leading `~` to `$HOME`, and
/// removes `.` and `..` components lexically. The filesystem is not touched.
#[must_use]
pub fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim_matches('"');

    let expanded = match trimmed.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match std::env::var_os("HOME") {
            Some(home) => {
                let mut home = PathBuf::from(home);
                home.push(rest.trim_start_matches('/'));
                home
            }
            None => PathBuf::from(trimmed),
        },
        _ => PathBuf::from(trimmed),
    };

    let mut normalized = PathBuf::new();
    for component in expanded.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root; leading `..` in a relative path is kept
                match normalized.components().next_back() {
                    Some(Component::Normal(_)) => {
                        normalized.pop();
                    }
                    Some(Component::RootDir | Component::Prefix(_)) => {}
                    _ => normalized.push(".."),
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["symbolicate", "crash.log"]);
        assert!(!args.verbose);
        assert_eq!(args.arch, "arm64");
        assert_eq!(args.output, None);
        assert_eq!(args.atos, PathBuf::from(DEFAULT_ATOS));
        assert_eq!(args.log, PathBuf::from("crash.log"));
        assert!(args.dsym.is_empty());
    }

    #[test]
    fn test_repeated_dsym_arguments() {
        let args = Args::parse_from([
            "symbolicate",
            "-v",
            "--arch",
            "x86_64",
            "--output",
            "out.log",
            "crash.log",
            "A.dSYM",
            "dsyms/",
        ]);
        assert!(args.verbose);
        assert_eq!(args.arch, "x86_64");
        assert_eq!(args.output, Some(PathBuf::from("out.log")));
        assert_eq!(args.dsym, vec![PathBuf::from("A.dSYM"), PathBuf::from("dsyms")]);
    }

    #[test]
    fn test_log_is_required() {
        assert!(Args::try_parse_from(["symbolicate"]).is_err());
    }

    #[test]
    fn test_normalize_strips_quotes_and_dots() {
        assert_eq!(normalize_path("\"/tmp/a/./b/../c.log\""), PathBuf::from("/tmp/a/c.log"));
        assert_eq!(normalize_path("./crash.log"), PathBuf::from("crash.log"));
        assert_eq!(normalize_path("../x/../y"), PathBuf::from("../y"));
        assert_eq!(normalize_path("/.."), PathBuf::from("/"));
        assert_eq!(normalize_path("."), PathBuf::from("."));
    }

    #[test]
    fn test_normalize_expands_home() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        let expected = normalize_path(&PathBuf::from(home).join("Logs/crash.log").to_string_lossy());
        assert_eq!(normalize_path("~/Logs/crash.log"), expected);
        assert_eq!(normalize_path("~user/crash.log"), PathBuf::from("~user/crash.log"));
    }
}
