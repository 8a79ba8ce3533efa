//! Script runner: executes script files with the package resolver active.
//!
//! The runner's job is to always return. Failures raised by the script or
//! by resolving its imports are captured into the output's error channel;
//! the only error `run` itself returns is a missing script path.

mod engine;

pub use engine::{DEFAULT_ENGINE, PACKAGE_PATH_ENV, ProcessEngine, RunOutput, ScriptEngine};

use log::warn;
use std::path::Path;

use crate::error::Error;
use crate::resolve::Resolver;
use crate::runtime::Runtime;

pub struct ScriptRunner<'a, R: Runtime, E: ScriptEngine> {
    runtime: &'a R,
    engine: E,
    resolver: Box<dyn Resolver + 'a>,
}

impl<'a, R: Runtime, E: ScriptEngine> ScriptRunner<'a, R, E> {
    /// The resolver is injected per runner, and a runner is built per run,
    /// so resolution state never leaks between runs.
    pub fn new(runtime: &'a R, engine: E, resolver: Box<dyn Resolver + 'a>) -> Self {
        Self {
            runtime,
            engine,
            resolver,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn run(&mut self, script: &Path) -> Result<RunOutput, Error> {
        if !self.runtime.exists(script) {
            return Err(Error::ScriptNotFound(script.to_path_buf()));
        }

        let source = match self.runtime.read_to_string(script) {
            Ok(source) => source,
            Err(e) => {
                return Ok(RunOutput {
                    stdout: String::new(),
                    stderr: format!("could not read script: {e:#}\n"),
                });
            }
        };

        let references = package_references(&source, self.resolver.as_ref());
        let mut modules = Vec::new();
        let mut failures = Vec::new();
        for name in references {
            match self.resolver.resolve(&name) {
                Ok(module) => modules.push(module),
                Err(e) => {
                    warn!("{}", e);
                    failures.push(e.to_string());
                }
            }
        }

        if !failures.is_empty() {
            return Ok(RunOutput {
                stdout: String::new(),
                stderr: failures.join("\n") + "\n",
            });
        }

        match self.engine.execute(script, &modules).await {
            Ok(output) => Ok(output),
            Err(e) => Ok(RunOutput {
                stdout: String::new(),
                stderr: format!("script execution failed: {e:#}\n"),
            }),
        }
    }
}

/// External package names referenced by the script's import lines, in
/// order of first appearance.
fn package_references(source: &str, resolver: &dyn Resolver) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in source.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix("import ") else {
            continue;
        };
        let Some(name) = rest.split_whitespace().next() else {
            continue;
        };
        if !resolver.matches(name) {
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
