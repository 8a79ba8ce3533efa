//! The external script-execution boundary.
//!
//! Executing a script is an opaque capability supplied by a separate
//! program: it gets the script path as its argument and the resolved
//! package directories through an environment variable, and everything it
//! prints is captured and handed back.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use std::path::Path;
use tokio::process::Command;

use crate::resolve::ResolvedModule;

/// Environment variable carrying the resolved package directories, joined
/// in the platform's PATH-list syntax.
pub const PACKAGE_PATH_ENV: &str = "PYRA_PACKAGE_PATH";

/// Default engine program, expected on PATH.
pub const DEFAULT_ENGINE: &str = "pyra-eval";

/// Captured output of one script execution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    async fn execute(&self, script: &Path, modules: &[ResolvedModule]) -> Result<RunOutput>;
}

/// Engine that runs a separate interpreter process on the script file.
pub struct ProcessEngine {
    program: String,
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ScriptEngine for ProcessEngine {
    #[tracing::instrument(skip(self, modules))]
    async fn execute(&self, script: &Path, modules: &[ResolvedModule]) -> Result<RunOutput> {
        let mut command = Command::new(&self.program);
        command.arg(script);

        if !modules.is_empty() {
            let dirs = std::env::join_paths(modules.iter().map(|m| m.dir.clone()))
                .context("Failed to assemble package path")?;
            command.env(PACKAGE_PATH_ENV, dirs);
        }

        debug!("Spawning engine: {} {:?}", self.program, script);
        let output = command
            .output()
            .await
            .with_context(|| format!("Failed to run script engine '{}'", self.program))?;

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
