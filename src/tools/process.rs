//! Blocking child-process helpers shared by the tool wrappers

use std::process::{Command, Output, Stdio};

use crate::error::{PipelineError, PipelineResult};

/// Lines of stderr kept when building a message from a failed run
const STDERR_TAIL_LINES: usize = 5;

/// Run `cmd` to completion and collect its output. Only a failure to launch
/// is an error here; the exit status is left to the caller.
pub fn run(tool: &str, cmd: &mut Command) -> PipelineResult<Output> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!("Running {:?}", cmd);

    cmd.output().map_err(|source| PipelineError::Spawn {
        tool: tool.to_string(),
        source,
    })
}

/// Run `cmd` and turn a nonzero exit into `ProcessFailed`. Stderr is logged,
/// never parsed.
pub fn run_checked(tool: &str, cmd: &mut Command) -> PipelineResult<Output> {
    let output = run(tool, cmd)?;
    if !output.status.success() {
        tracing::debug!(
            "{} stderr:\n{}",
            tool,
            stderr_tail(&output.stderr, STDERR_TAIL_LINES)
        );
        return Err(PipelineError::ProcessFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
        });
    }
    Ok(output)
}

/// Last `max_lines` non-empty lines of a stderr buffer
pub fn stderr_tail(stderr: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
