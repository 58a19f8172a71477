//! Symbolication pipeline
//!
//! Drives a run through its stages:
//!
//! ```text
//! Validating -> ResolvingBundles -> ReadingLog -> ProcessingLines -> WritingOutput -> Terminated
//! ```
//!
//! Transitions are strictly forward. A fatal error or a cancellation in any
//! stage ends the run at `Terminated`; only a completed run writes output.

use log::{debug, info};
use std::path::PathBuf;

use crate::cancellation::CancellationToken;
use crate::config::Config;
use crate::crash_log::{read_log, write_log_atomic, FrameLine};
use crate::domain::{DebugArtifact, Outcome, SymbolicateError, SymbolicationRequest};
use crate::preflight::run_preflight_checks;
use crate::symbolization::{BundleResolver, SymbolLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    ResolvingBundles,
    ReadingLog,
    ProcessingLines,
    WritingOutput,
    Terminated,
}

/// Counters for one pass over the log
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineStats {
    /// Lines with the frame shape
    pub matched: usize,
    /// Frame lines whose library had a dSYM, i.e. resolver calls made
    pub looked_up: usize,
    /// Lines rewritten with a symbol
    pub symbolicated: usize,
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: usize,
    pub artifacts: usize,
    pub stats: LineStats,
    pub output: PathBuf,
}

/// Runs the whole pipeline for one configuration
pub struct Symbolicator<L> {
    config: Config,
    lookup: L,
    cancel: CancellationToken,
    stage: Stage,
}

impl<L: SymbolLookup> Symbolicator<L> {
    pub fn new(config: Config, lookup: L, cancel: CancellationToken) -> Self {
        Self { config, lookup, cancel, stage: Stage::Validating }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage in order
    ///
    /// Returns `Outcome::Cancelled` without writing anything if the token fires
    /// at any point.
    ///
    /// # Errors
    /// Validation, I/O and resolver failures; the run stops at the first one
    pub async fn run(&mut self) -> Result<Outcome<RunSummary>, SymbolicateError> {
        let result = self.run_stages().await;
        self.advance(Stage::Terminated);
        result
    }

    async fn run_stages(&mut self) -> Result<Outcome<RunSummary>, SymbolicateError> {
        if self.advance(Stage::Validating).is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        run_preflight_checks(&self.config)?;

        if self.advance(Stage::ResolvingBundles).is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        let artifacts = BundleResolver::new(self.config.verbose).resolve(&self.config.dsyms);
        self.report_inputs(&artifacts);

        if self.advance(Stage::ReadingLog).is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        let mut lines = read_log(&self.config.log)?;

        if self.advance(Stage::ProcessingLines).is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        let stats = match self.process_lines(&mut lines, &artifacts).await? {
            Outcome::Completed(stats) => stats,
            Outcome::Cancelled => return Ok(Outcome::Cancelled),
        };

        if self.advance(Stage::WritingOutput).is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        write_log_atomic(&self.config.output, &lines)?;

        let summary = RunSummary {
            lines: lines.len(),
            artifacts: artifacts.len(),
            stats,
            output: self.config.output.clone(),
        };
        if self.config.verbose {
            info!(
                "Symbolicated {} of {} frame lines ({} lookups) in {} lines",
                summary.stats.symbolicated,
                summary.stats.matched,
                summary.stats.looked_up,
                summary.lines
            );
        }
        Ok(Outcome::Completed(summary))
    }

    /// Symbolicate `lines` in place, in order, one resolver call at a time
    ///
    /// Lines that do not match, name a library without a dSYM, or get no
    /// symbol back are left untouched.
    ///
    /// # Errors
    /// The first fatal resolver failure
    pub async fn process_lines(
        &self,
        lines: &mut [String],
        artifacts: &[DebugArtifact],
    ) -> Result<Outcome<LineStats>, SymbolicateError> {
        let mut stats = LineStats::default();

        for line in lines.iter_mut() {
            if self.cancel.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }

            let Some(frame) = FrameLine::parse(line) else {
                continue;
            };
            stats.matched += 1;

            let Some(artifact) = artifacts.iter().find(|a| a.provides(frame.library)) else {
                debug!("No dSYM for {}", frame.library);
                continue;
            };

            let request = SymbolicationRequest {
                arch: self.config.arch.clone(),
                binary: artifact.binary.clone(),
                load_address: frame.load_address(),
                call_address: frame.call_address(),
            };
            if self.config.verbose {
                if let (Some(call), Some(load)) =
                    (request.call_address.value(), request.load_address.value())
                {
                    info!(
                        "Frame {}: {} + 0x{:x}",
                        frame.frame_index,
                        frame.library,
                        call.wrapping_sub(load)
                    );
                }
            }

            stats.looked_up += 1;
            let result = match self.lookup.lookup(&request, &self.cancel).await? {
                Outcome::Completed(result) => result,
                Outcome::Cancelled => return Ok(Outcome::Cancelled),
            };

            if let Some(symbol) = result.symbol() {
                let rewritten = frame.rewrite(symbol);
                *line = rewritten;
                stats.symbolicated += 1;
            }
        }

        Ok(Outcome::Completed(stats))
    }

    /// Move to `stage`; reports `Cancelled` if the run should stop instead
    fn advance(&mut self, stage: Stage) -> Outcome<()> {
        debug!("{:?} -> {:?}", self.stage, stage);
        self.stage = stage;
        if stage != Stage::Terminated && self.cancel.is_cancelled() {
            Outcome::Cancelled
        } else {
            Outcome::Completed(())
        }
    }

    fn report_inputs(&self, artifacts: &[DebugArtifact]) {
        if !self.config.verbose {
            return;
        }
        info!("Processing input file: {}", self.config.log.display());
        info!("Output: {}", self.config.output.display());
        info!("Architecture: {}", self.config.arch);
        let list: Vec<String> =
            artifacts.iter().map(|a| format!("    {}", a.binary.display())).collect();
        info!("dSYMs: [\n{}\n]", list.join(",\n"));
    }
}
