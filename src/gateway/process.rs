//! Subprocess helpers for the tool gateway.

use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

/// Raw result of one finished child process.
#[derive(Debug)]
pub(super) struct ProcessOutput {
    /// `-1` when the child was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Why a child could not be run to completion.
#[derive(Debug)]
pub(super) enum ProcessFailure {
    /// The program does not exist on PATH.
    NotFound,
    Spawn(std::io::Error),
    TimedOut(Duration),
}

/// Spawn `program args..`, wait up to `limit`, and capture its output.
pub(super) async fn run_process(
    program: &str,
    args: &[String],
    limit: Duration,
) -> Result<ProcessOutput, ProcessFailure> {
    let mut cmd = Command::new(program);
    // Timed-out children are killed when the wait future is dropped.
    cmd.kill_on_drop(true);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ProcessFailure::NotFound,
        _ => ProcessFailure::Spawn(e),
    })?;

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(result) => result.map_err(ProcessFailure::Spawn)?,
        Err(_) => return Err(ProcessFailure::TimedOut(limit)),
    };

    Ok(ProcessOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Run a shell command line through `sh -c`.
pub(super) async fn run_sh_process(
    command: &str,
    limit: Duration,
) -> Result<ProcessOutput, ProcessFailure> {
    run_process("sh", &["-c".into(), command.into()], limit).await
}

/// Human-oriented duration formatting used in error messages.
pub(super) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    if secs == 0 {
        return format!("{millis}ms");
    }
    if millis == 0 {
        if secs % 60 == 0 {
            return format!("{}m", secs / 60);
        }
        return format!("{secs}s");
    }
    format!("{secs}.{millis:03}s")
}

/// Shell-safe single-quote escaping.
pub(super) fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        "''".into()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_empty() {
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn quote_with_single_quote() {
        assert_eq!(shell_quote("a'b"), "'a'\\''b'");
    }

    #[test]
    fn format_duration_prefers_human_units() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(7)), "7s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_millis(1250)), "1.250s");
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let result = run_process(
            "tally-definitely-missing-binary",
            &[],
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(ProcessFailure::NotFound)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_output_is_captured_and_trimmed() {
        let out = run_sh_process("printf ' hi \\n'; echo oops >&2; exit 3", Duration::from_secs(5))
            .await
            .expect("sh should run");
        assert_eq!(out.exit_code, 3);
        assert_eq!(out.stdout, "hi");
        assert_eq!(out.stderr, "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_children_time_out() {
        let result = run_sh_process("sleep 5", Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ProcessFailure::TimedOut(_))));
    }
}
