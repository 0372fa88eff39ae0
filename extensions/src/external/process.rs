use lantern_core::error::SourceError;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs `path` to completion with `variables` added to its environment
/// and returns its stdout.
pub(crate) fn run_process(
    path: &Path,
    variables: &BTreeMap<String, String>,
) -> Result<Vec<u8>, SourceError> {
    let output = Command::new(path)
        .envs(variables)
        .stdin(Stdio::null())
        .output()?;

    if !output.stderr.is_empty() {
        debug!(
            "{} stderr: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }

    match output.status.code() {
        None => Err(SourceError::Crashed),
        Some(0) => Ok(output.stdout),
        Some(code) => Err(SourceError::ExitCode(code)),
    }
}
