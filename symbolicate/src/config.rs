//! Run configuration
//!
//! Built once from the parsed arguments and passed explicitly to every
//! component that needs it.

use std::path::PathBuf;

use crate::cli::Args;

#[derive(Debug, Clone)]
pub struct Config {
    /// Emit diagnostic detail (no behavioral change)
    pub verbose: bool,
    /// Architecture passed to the resolver
    pub arch: String,
    /// Crash log to read
    pub log: PathBuf,
    /// Destination of the rewritten log
    pub output: PathBuf,
    /// External resolver program
    pub atos: PathBuf,
    /// Raw dSYM inputs, in the order given
    pub dsyms: Vec<PathBuf>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let output = args.output.unwrap_or_else(|| args.log.clone());
        Self {
            verbose: args.verbose,
            arch: args.arch,
            log: args.log,
            output,
            atos: args.atos,
            dsyms: args.dsym,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_output_defaults_to_input_log() {
        let config = Config::from(Args::parse_from(["symbolicate", "/tmp/crash.log"]));
        assert_eq!(config.output, PathBuf::from("/tmp/crash.log"));
        assert_eq!(config.log, config.output);
    }

    #[test]
    fn test_explicit_output() {
        let config = Config::from(Args::parse_from([
            "symbolicate",
            "--output",
            "/tmp/out.log",
            "/tmp/crash.log",
            "A.dSYM",
        ]));
        assert_eq!(config.output, PathBuf::from("/tmp/out.log"));
        assert_eq!(config.dsyms, vec![PathBuf::from("A.dSYM")]);
    }
}
