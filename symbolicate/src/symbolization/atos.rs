//! External symbol resolution through `atos`
//!
//! Each eligible frame line becomes one `atos` invocation:
//!
//! ```text
//! atos -arch <arch> -o <dwarf binary> -l <load address> <call address>
//! ```
//!
//! The child runs out of process while we poll its liveness every
//! [`POLL_INTERVAL`], so a Ctrl+C is noticed promptly and forwarded to it.

use log::{debug, info};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use crate::cancellation::CancellationToken;
use crate::domain::{Outcome, SymbolicateError, SymbolicationRequest, SymbolicationResult};

/// How often a running resolver process is checked for completion
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something that maps a frame address to a symbol name
///
/// Implementations must observe `cancel` while they wait and return
/// [`Outcome::Cancelled`] once it fires.
pub trait SymbolLookup {
    /// Resolve one request
    ///
    /// # Errors
    /// Fatal resolver failures; a plain miss is `SymbolicationResult::NoResult`
    fn lookup(
        &self,
        request: &SymbolicationRequest,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Outcome<SymbolicationResult>, SymbolicateError>>;
}

/// Runs the `atos` command line tool, one process per request
pub struct AtosResolver {
    program: PathBuf,
    verbose: bool,
}

impl AtosResolver {
    pub fn new(program: impl Into<PathBuf>, verbose: bool) -> Self {
        Self { program: program.into(), verbose }
    }

    fn command(&self, request: &SymbolicationRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-arch")
            .arg(&request.arch)
            .arg("-o")
            .arg(request.binary())
            .arg("-l")
            .arg(request.load_address.as_str())
            .arg(request.call_address.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }

    fn failure(&self, status: std::process::ExitStatus) -> SymbolicateError {
        match status.code() {
            Some(status) => SymbolicateError::ResolverFailed { program: self.program.clone(), status },
            None => SymbolicateError::ResolverKilled { program: self.program.clone() },
        }
    }
}

impl SymbolLookup for AtosResolver {
    async fn lookup(
        &self,
        request: &SymbolicationRequest,
        cancel: &CancellationToken,
    ) -> Result<Outcome<SymbolicationResult>, SymbolicateError> {
        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        if self.verbose {
            info!(
                "{} -arch {} -o {} -l {} {}",
                self.program.display(),
                request.arch,
                request.binary().display(),
                request.load_address,
                request.call_address
            );
        }

        let mut child = self.command(request).spawn().map_err(|source| {
            SymbolicateError::ResolverLaunchFailed { program: self.program.clone(), source }
        })?;

        // Drain stdout while polling so a long answer cannot stall the child on a full pipe
        let Some(mut stdout) = child.stdout.take() else {
            return Err(io::Error::other("resolver stdout was not captured").into());
        };
        let mut reader = tokio::spawn(async move {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await.map(|_| buf)
        });

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }

            tokio::select! {
                () = tokio::time::sleep(POLL_INTERVAL) => {}
                () = cancel.cancelled() => {
                    interrupt(&mut child);
                    reader.abort();
                    return Ok(Outcome::Cancelled);
                }
            }
        };

        if !status.success() {
            // A terminal Ctrl+C reaches the child too, possibly before our handler runs
            tokio::time::sleep(POLL_INTERVAL).await;
            if cancel.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            return Err(self.failure(status));
        }

        // A descendant may still hold stdout open after the resolver exits
        let joined = tokio::select! {
            joined = &mut reader => Some(joined),
            () = cancel.cancelled() => None,
        };
        let Some(joined) = joined else {
            reader.abort();
            return Ok(Outcome::Cancelled);
        };
        let output = joined.map_err(io::Error::other)??;
        let result = match String::from_utf8(output) {
            Ok(text) => SymbolicationResult::from_output(&text),
            Err(e) => {
                debug!("Discarding non UTF-8 resolver output: {e}");
                SymbolicationResult::NoResult
            }
        };

        if self.verbose && result == SymbolicationResult::NoResult {
            info!("No symbol for {} in {}", request.call_address, request.binary().display());
        }

        Ok(Outcome::Completed(result))
    }
}

/// Ask the child to stop the way a terminal Ctrl+C would
#[cfg(unix)]
#[allow(unsafe_code)] // kill() requires unsafe
fn interrupt(child: &mut Child) {
    if let Some(pid) = child.id().and_then(|id| libc::pid_t::try_from(id).ok()) {
        // SAFETY: kill() has no memory-safety preconditions; pid is our own unreaped child
        if unsafe { libc::kill(pid, libc::SIGINT) } == 0 {
            return;
        }
    }
    let _ = child.start_kill();
}

#[cfg(not(unix))]
fn interrupt(child: &mut Child) {
    let _ = child.start_kill();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::domain::HexAddress;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Instant;

    /// Write an executable shell script standing in for atos
    fn fake_atos(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("atos");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn request() -> SymbolicationRequest {
        SymbolicationRequest {
            arch: "arm64".to_string(),
            binary: PathBuf::from("/syms/MyLib.dSYM/Contents/Resources/DWARF/MyLib"),
            load_address: HexAddress("0x0000".to_string()),
            call_address: HexAddress("0x1000".to_string()),
        }
    }

    #[tokio::test]
    async fn test_symbol_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let atos = fake_atos(dir.path(), "printf '  -[MyLib foo] (in MyLib)\\n\\n'");
        let resolver = AtosResolver::new(atos, false);

        let outcome = resolver.lookup(&request(), &CancellationToken::new()).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Completed(SymbolicationResult::Symbol("-[MyLib foo] (in MyLib)".to_string()))
        );
    }

    #[tokio::test]
    async fn test_arguments_are_passed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let atos = fake_atos(dir.path(), "printf '%s|' \"$@\"");
        let resolver = AtosResolver::new(atos, true);

        let outcome = resolver.lookup(&request(), &CancellationToken::new()).await.unwrap();

        let Outcome::Completed(SymbolicationResult::Symbol(args)) = outcome else {
            panic!("expected echoed arguments, got {outcome:?}");
        };
        assert_eq!(
            args,
            "-arch|arm64|-o|/syms/MyLib.dSYM/Contents/Resources/DWARF/MyLib|-l|0x0000|0x1000|"
        );
    }

    #[tokio::test]
    async fn test_empty_output_is_no_result() {
        let dir = tempfile::tempdir().unwrap();
        let atos = fake_atos(dir.path(), "printf '   \\n'");
        let resolver = AtosResolver::new(atos, false);

        let outcome = resolver.lookup(&request(), &CancellationToken::new()).await.unwrap();

        assert_eq!(outcome, Outcome::Completed(SymbolicationResult::NoResult));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let atos = fake_atos(dir.path(), "echo partial\nexit 3");
        let resolver = AtosResolver::new(atos, false);

        let err = resolver.lookup(&request(), &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, SymbolicateError::ResolverFailed { status: 3, .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_launch() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = AtosResolver::new(dir.path().join("no-such-atos"), false);

        let err = resolver.lookup(&request(), &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, SymbolicateError::ResolverLaunchFailed { .. }));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_running_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let atos = fake_atos(dir.path(), "exec sleep 30");
        let resolver = AtosResolver::new(atos, false);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let outcome = resolver.lookup(&request(), &cancel).await.unwrap();

        assert!(outcome.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancel_while_stdout_is_held_open() {
        let dir = tempfile::tempdir().unwrap();
        // The resolver exits at once but a background child keeps the pipe open
        let atos = fake_atos(dir.path(), "sleep 30 2>/dev/null &\necho main");
        let resolver = AtosResolver::new(atos, false);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let outcome = resolver.lookup(&request(), &cancel).await.unwrap();

        assert!(outcome.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_already_cancelled_does_not_spawn() {
        let resolver = AtosResolver::new("/nonexistent/atos", false);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = resolver.lookup(&request(), &cancel).await.unwrap();

        assert!(outcome.is_cancelled());
    }
}
