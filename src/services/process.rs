use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use thiserror::Error;

/// A program and its arguments. Arguments are passed verbatim, no shell involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// None when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Why a single step failed. Never fatal for the run.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with code {}: {stderr}", display_code(.code))]
    ExitStatus {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to edit {path}: {source}")]
    Edit {
        path: String,
        #[source]
        source: io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string())
}

/// Boundary between the appliers and the operating system.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<CommandOutput>;
}

/// Runs commands for real, blocking until each exits.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<CommandOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Runs an invocation, logs its status, and maps failures to [`StepError`].
pub fn run_checked(runner: &mut dyn CommandRunner, invocation: &Invocation) -> Result<CommandOutput, StepError> {
    log::debug!("Running: {}", invocation);
    let output = runner.run(invocation).map_err(|source| {
        log::warn!("Could not start {}: {}", invocation.program, source);
        StepError::Spawn {
            program: invocation.program.clone(),
            source,
        }
    })?;

    if output.success {
        log::info!("{} exited with code {:?}", invocation.program, output.code);
        if !output.stdout.is_empty() {
            log::debug!("{} output: {}", invocation.program, output.stdout);
        }
        Ok(output)
    } else {
        log::warn!(
            "{} exited with code {:?}: {}",
            invocation,
            output.code,
            output.stderr
        );
        Err(StepError::ExitStatus {
            program: invocation.program.clone(),
            code: output.code,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Records every invocation; programs listed in `failures` report a non-zero
    /// exit and programs in `missing` fail to spawn.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingRunner {
        pub calls: Vec<Invocation>,
        pub failures: HashMap<String, i32>,
        pub missing: Vec<String>,
    }

    impl RecordingRunner {
        pub fn programs(&self) -> Vec<&str> {
            self.calls.iter().map(|c| c.program.as_str()).collect()
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&mut self, invocation: &Invocation) -> io::Result<CommandOutput> {
            self.calls.push(invocation.clone());
            if self.missing.contains(&invocation.program) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory"));
            }
            match self.failures.get(&invocation.program) {
                Some(code) => Ok(CommandOutput {
                    success: false,
                    code: Some(*code),
                    stdout: String::new(),
                    stderr: format!("{} failed", invocation.program),
                }),
                None => Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                }),
            }
        }
    }

    #[test]
    fn test_invocation_display_quotes_spaces() {
        let inv = Invocation::new("gsettings", ["set", "org.gnome.desktop.interface", "font-name", "Inter, 11"]);
        assert_eq!(inv.to_string(), "gsettings set org.gnome.desktop.interface font-name \"Inter, 11\"");
    }

    #[test]
    fn test_run_checked_success() {
        let mut runner = RecordingRunner::default();
        let inv = Invocation::new("xrdb", ["/home/u/.Xresources"]);
        let out = run_checked(&mut runner, &inv).unwrap();
        assert!(out.success);
        assert_eq!(runner.calls, vec![inv]);
    }

    #[test]
    fn test_run_checked_exit_status() {
        let mut runner = RecordingRunner::default();
        runner.failures.insert("kvantummanager".to_string(), 2);
        let err = run_checked(&mut runner, &Invocation::new("kvantummanager", ["--set", "X"])).unwrap_err();
        match err {
            StepError::ExitStatus { program, code, .. } => {
                assert_eq!(program, "kvantummanager");
                assert_eq!(code, Some(2));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_run_checked_spawn_failure() {
        let mut runner = RecordingRunner::default();
        runner.missing.push("lookandfeeltool".to_string());
        let err = run_checked(&mut runner, &Invocation::new("lookandfeeltool", ["-a", "x"])).unwrap_err();
        assert!(matches!(err, StepError::Spawn { .. }));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let mut runner = SystemRunner;
        let result = runner.run(&Invocation::new("desktheme-test-no-such-program", Vec::<String>::new()));
        assert!(result.is_err());
    }
}
