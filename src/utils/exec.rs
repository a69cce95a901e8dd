//! Subprocess execution for the document converter.
//!
//! ```ignore
//! let output = Cmd::new("pandoc")
//!     .args(["-t", "html"])
//!     .arg(path)
//!     .filter(&PANDOC_FILTER)
//!     .output()?;
//! ```
//!
//! Stdout is always captured. Stderr of a successful run is logged under
//! the program name, minus the lines a [`StderrFilter`] drops; stderr of a
//! failed run is left to the caller (see [`failure_message`]).

use crate::log;
use std::{
    ffi::{OsStr, OsString},
    io,
    path::Path,
    process::{Command, Output, Stdio},
};

/// Command builder with captured output.
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    filter: &'static StderrFilter,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            filter: &StderrFilter::NONE,
        }
    }

    /// Add one argument; empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, Self::arg)
    }

    pub fn filter(mut self, filter: &'static StderrFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Short name for log lines: the file stem of the program.
    pub fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_stem()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Run to completion with stdin closed.
    ///
    /// Only a spawn failure is an `Err`; a non-zero exit is reported through
    /// `Output::status`.
    pub fn output(self) -> io::Result<Output> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let kept = self.filter.keep(&stderr);
            if !kept.is_empty() {
                log!(&self.program_name(); "{}", kept.join("\n"));
            }
        }
        Ok(output)
    }
}

/// Stderr lines to drop from successful runs, by prefix.
pub struct StderrFilter {
    skip_prefixes: &'static [&'static str],
}

impl StderrFilter {
    pub const NONE: Self = Self::new(&[]);

    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    fn keep<'a>(&self, stderr: &'a str) -> Vec<&'a str> {
        stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !self.skip_prefixes.iter().any(|p| line.starts_with(p)))
            .collect()
    }
}

/// Error text for a failed run: trimmed stderr, or the exit status when
/// the program printed nothing.
pub fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.trim() {
        "" => format!("exited with {}", output.status),
        text => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_drops_empty_args() {
        let cmd = Cmd::new("/usr/local/bin/pandoc")
            .arg("-t")
            .args(["html", "", "doc.md"]);

        let args: Vec<_> = cmd.args.iter().map(|a| a.to_string_lossy()).collect();
        assert_eq!(args, ["-t", "html", "doc.md"]);
        assert_eq!(cmd.program_name(), "pandoc");
    }

    #[test]
    fn test_filter_keeps_unknown_lines() {
        let filter = StderrFilter::new(&["[INFO]"]);
        let kept = filter.keep("[INFO] Loaded reader\n\n  [WARNING] Missing image\n");
        assert_eq!(kept, ["[WARNING] Missing image"]);
        assert!(StderrFilter::NONE.keep("  \n").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_captures_stdout() {
        let output = Cmd::new("echo").arg("hello").output().unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_message_prefers_stderr() {
        let output = Cmd::new("sh")
            .args(["-c", "echo boom >&2; exit 3"])
            .output()
            .unwrap();
        assert!(!output.status.success());
        assert_eq!(failure_message(&output), "boom");

        let silent = Cmd::new("sh").args(["-c", "exit 4"]).output().unwrap();
        assert!(failure_message(&silent).contains('4'));
    }

    #[test]
    fn test_missing_program_is_err() {
        assert!(Cmd::new("codex-no-such-program-xyz").output().is_err());
    }
}
