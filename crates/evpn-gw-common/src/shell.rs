//! Shell command execution utilities.
//!
//! The kernel-link and routing-daemon backends are driven through the
//! standard iproute2 and FRR command line tools. Every user-controlled
//! value interpolated into a command line must pass through [`shellquote`].
//!
//! # Example
//!
//! ```ignore
//! use evpn_gw_common::shell::{self, IP_CMD, shellquote};
//!
//! let cmd = format!("{} link set dev {} up", IP_CMD, shellquote("blue"));
//! shell::exec_checked(&cmd).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::error::{GwError, GwResult};

/// Path to the `ip` command for link and address configuration.
pub const IP_CMD: &str = "/sbin/ip";

/// Path to the `bridge` command for bridge VLAN configuration.
pub const BRIDGE_CMD: &str = "/sbin/bridge";

/// Path to the FRR `vtysh` shell.
pub const VTYSH_CMD: &str = "/usr/bin/vtysh";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// Wraps the string in double quotes and escapes `$`, `` ` ``, `"`, `\`
/// and newline.
///
/// ```
/// use evpn_gw_common::shell::shellquote;
///
/// assert_eq!(shellquote("blue"), "\"blue\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Interpreter every command line is handed to.
const SH_CMD: &str = "/bin/sh";

/// Exit status and trimmed output of one command.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Process exit code, or -1 when the process was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    fn from_output(output: Output) -> Self {
        let text = |bytes: &[u8]| String::from_utf8_lossy(bytes).trim().to_owned();
        Self {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: text(&output.stdout),
            stderr: text(&output.stderr),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Non-empty output streams joined by a newline, stdout first.
    pub fn combined_output(&self) -> String {
        [self.stdout.as_str(), self.stderr.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Hands back stdout, or [`GwError::ShellCommandFailed`] for a non-zero
    /// exit.
    pub fn into_stdout(self, cmd: &str) -> GwResult<String> {
        if !self.success() {
            return Err(GwError::ShellCommandFailed {
                command: cmd.to_owned(),
                exit_code: self.exit_code,
                output: self.combined_output(),
            });
        }
        Ok(self.stdout)
    }
}

/// Runs `cmd` under `/bin/sh -c` and collects its output.
///
/// Only a spawn failure is an `Err`; the exit status is left to the caller.
/// The child is killed if the returned future is dropped.
pub async fn exec(cmd: &str) -> GwResult<ExecResult> {
    debug!(cmd, "running");
    let output = Command::new(SH_CMD)
        .args(["-c", cmd])
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| GwError::ShellExec {
            command: cmd.to_owned(),
            source,
        })?;

    let result = ExecResult::from_output(output);
    match result.exit_code {
        0 => trace!(cmd, "ok"),
        code => warn!(cmd, code, stderr = %result.stderr, "non-zero exit"),
    }
    Ok(result)
}

/// Like [`exec`], but a non-zero exit is an error. Yields trimmed stdout.
pub async fn exec_checked(cmd: &str) -> GwResult<String> {
    exec(cmd).await?.into_stdout(cmd)
}
