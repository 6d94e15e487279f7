// Shell-out adapter: `<program> <args..> status|reset|invalidate <path>`.
// `status` prints snapshot JSON on stdout; the commands print yes/no.

use std::process::Command;

use super::{CacheRuntime, RuntimeError};
use crate::models::RawSnapshot;

pub struct CommandRuntime {
    program: String,
    args: Vec<String>,
}

impl CommandRuntime {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn run(&self, extra: &[&str]) -> Result<Vec<u8>, RuntimeError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .output()
            .map_err(|source| RuntimeError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(RuntimeError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    fn run_flag(&self, extra: &[&str]) -> Result<bool, RuntimeError> {
        parse_flag(&String::from_utf8_lossy(&self.run(extra)?))
    }
}

/// Accepts yes/no, true/false and 1/0 (case-insensitive, surrounding whitespace ignored).
pub(super) fn parse_flag(out: &str) -> Result<bool, RuntimeError> {
    match out.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Ok(true),
        "no" | "false" | "0" => Ok(false),
        other => Err(RuntimeError::UnexpectedOutput(other.to_string())),
    }
}

impl CacheRuntime for CommandRuntime {
    fn snapshot(&self) -> Result<RawSnapshot, RuntimeError> {
        let stdout = self.run(&["status"])?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    fn reset_all(&self) -> Result<bool, RuntimeError> {
        self.run_flag(&["reset"])
    }

    fn invalidate(&self, path: &str) -> Result<bool, RuntimeError> {
        self.run_flag(&["invalidate", path])
    }
}
