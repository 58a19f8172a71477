//! # symbolicate - Main Entry Point
//!
//! Parses arguments, wires the `atos` resolver and Ctrl+C handling into the
//! pipeline, and maps the result to a process exit status.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use symbolicate::cancellation::{install_interrupt_handler, CancellationToken};
use symbolicate::cli::Args;
use symbolicate::config::Config;
use symbolicate::domain::{errors::EXIT_FAILURE, Outcome, SymbolicateError};
use symbolicate::pipeline::Symbolicator;
use symbolicate::symbolization::AtosResolver;

// Exit codes
const EXIT_SUCCESS: i32 = 0;

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    std::process::exit(match run(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e}");
            code
        }
    });
}

/// A failing resolver's status is propagated; everything else is a generic failure
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SymbolicateError>().map_or(EXIT_FAILURE, SymbolicateError::exit_code)
}

#[tokio::main]
async fn run(args: Args) -> Result<()> {
    let config = Config::from(args);

    let cancel = CancellationToken::new();
    let interrupt = install_interrupt_handler(cancel.clone());

    let resolver = AtosResolver::new(config.atos.clone(), config.verbose);
    let mut symbolicator = Symbolicator::new(config, resolver, cancel);
    let outcome = symbolicator.run().await;
    interrupt.abort();

    match outcome? {
        Outcome::Completed(_) => {}
        // Interrupted: nothing was written, which is still a success
        Outcome::Cancelled => eprintln!(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_for_resolver_failure() {
        let err = anyhow::Error::new(SymbolicateError::ResolverFailed {
            program: PathBuf::from("/usr/bin/atos"),
            status: 42,
        });
        assert_eq!(exit_code_for(&err), 42);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::Error::new(SymbolicateError::InputMissing(PathBuf::from("x")));
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), EXIT_FAILURE);
    }
}
