use std::{path::Path, process::Command};

use crate::{fs::FileSystem, OverlayError, Result};

/// Executes a fully built command line and reports its exit status.
pub trait ProcessRunner {
    fn run(&self, args: &[String]) -> Result<i32>;
}

/// Runs the first argument as a program, inheriting stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegRunner;

impl ProcessRunner for FfmpegRunner {
    fn run(&self, args: &[String]) -> Result<i32> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| OverlayError::msg("cannot run an empty command"))?;

        let status = Command::new(program).args(rest).status().map_err(|e| {
            OverlayError::msg(format!(
                "failed to spawn {program} (is it installed and on PATH?): {e}"
            ))
        })?;
        // Killed by a signal when there is no code.
        Ok(status.code().unwrap_or(1))
    }
}

/// Drives the renderer for a composition whose command is already built.
#[derive(Debug)]
pub struct Recorder<F, R> {
    fs: F,
    runner: R,
}

impl<F: FileSystem, R: ProcessRunner> Recorder<F, R> {
    pub fn new(fs: F, runner: R) -> Self {
        Self { fs, runner }
    }

    /// Makes sure the output directory exists, then runs `command`.
    pub fn record(&self, command: &[String], output: &Path) -> Result<i32> {
        if let Some(parent) = output.parent() {
            self.fs.create_dir_all(parent)?;
        }
        tracing::info!(output = %output.display(), "executing ffmpeg command");
        let code = self.runner.run(command)?;
        if code != 0 {
            tracing::warn!(code, "ffmpeg exited with failure");
        }
        Ok(code)
    }
}

/// Quoting convention used when printing a command for copy-paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellStyle {
    Posix,
    Windows,
}

impl ShellStyle {
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Joins `args` into a single line the given shell would split back into
/// the same arguments.
pub fn to_shell(args: &[String], style: ShellStyle) -> String {
    let quoted: Vec<String> = match style {
        ShellStyle::Posix => args.iter().map(|a| quote_posix(a)).collect(),
        ShellStyle::Windows => args.iter().map(|a| quote_windows(a)).collect(),
    };
    quoted.join(" ")
}

fn quote_posix(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let safe = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if safe {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r#"'"'"'"#))
}

fn quote_windows(arg: &str) -> String {
    let needs_quotes = arg.is_empty() || arg.contains([' ', '\t']);
    let mut out = String::with_capacity(arg.len() + 2);
    if needs_quotes {
        out.push('"');
    }

    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.push_str(&"\\".repeat(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.push_str(&"\\".repeat(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }

    if needs_quotes {
        out.push_str(&"\\".repeat(backslashes * 2));
        out.push('"');
    } else {
        out.push_str(&"\\".repeat(backslashes));
    }
    out
}
