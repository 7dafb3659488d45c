//! Bootstrap launcher - stop-then-start control of the engine process.
//!
//! Independent of the session core: the launcher shells out to external
//! stop/start scripts through a narrow, validated command interface. The
//! program name is checked against an allow-list pattern before any
//! process is spawned; everything else about the engine's lifecycle
//! belongs to the scripts.

use std::path::PathBuf;

use tokio::process::Command;

use crate::config::EngineConfig;
use crate::error::{EnginewireError, Result};

/// Maximum accepted program-name length.
pub const MAX_PROGRAM_NAME_LEN: usize = 19;

/// Validate a program name against the allow-list pattern.
///
/// Accepted: 1-19 characters, ASCII alphanumeric or underscore only.
/// Anything else is rejected here, before a process could be spawned with
/// it.
pub fn validate_program_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_PROGRAM_NAME_LEN {
        return Err(EnginewireError::Validation(format!(
            "program name must be 1-{} characters, got {}",
            MAX_PROGRAM_NAME_LEN,
            name.len()
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(EnginewireError::Validation(format!(
            "program name may only contain alphanumerics and underscore: {name:?}"
        )));
    }

    Ok(())
}

/// Runs the configured stop and start scripts for an engine program.
pub struct Launcher {
    start_script: PathBuf,
    stop_script: PathBuf,
}

impl Launcher {
    /// Create a launcher with explicit script paths.
    pub fn new(start_script: impl Into<PathBuf>, stop_script: impl Into<PathBuf>) -> Self {
        Self {
            start_script: start_script.into(),
            stop_script: stop_script.into(),
        }
    }

    /// Create a launcher from configuration.
    ///
    /// # Errors
    ///
    /// A validation error if the config does not carry both script paths.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        match (&config.start_script, &config.stop_script) {
            (Some(start), Some(stop)) => Ok(Self::new(start, stop)),
            _ => Err(EnginewireError::Validation(
                "config is missing start_script/stop_script".to_string(),
            )),
        }
    }

    /// Stop the engine, then start it for the given program.
    ///
    /// The two scripts run sequentially; if either fails to spawn or exits
    /// non-zero the whole restart fails with a single error and the second
    /// step is not reached.
    pub async fn restart(&self, program: &str) -> Result<()> {
        validate_program_name(program)?;

        self.run_script(&self.stop_script, program).await?;
        self.run_script(&self.start_script, program).await?;

        tracing::info!("engine restarted for program {}", program);
        Ok(())
    }

    async fn run_script(&self, script: &PathBuf, program: &str) -> Result<()> {
        let status = Command::new(script)
            .arg(program)
            .status()
            .await
            .map_err(|e| {
                EnginewireError::Bootstrap(format!("failed to run {}: {}", script.display(), e))
            })?;

        if !status.success() {
            return Err(EnginewireError::Bootstrap(format!(
                "{} exited with {}",
                script.display(),
                status
            )));
        }

        Ok(())
    }
}
