//! Command executor doubles

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use goobits_mirror::git::{CommandError, CommandExecutor, CommandOutcome};

/// Wraps another executor and records every command line it runs
pub struct RecordingExecutor<E> {
    inner: E,
    calls: Mutex<Vec<String>>,
}

impl<E> RecordingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns and clears the recorded command lines
    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

#[async_trait]
impl<E: CommandExecutor> CommandExecutor for RecordingExecutor<E> {
    async fn run(&self, args: &[&str], cwd: &Path) -> CommandOutcome {
        self.calls.lock().unwrap().push(args.join(" "));
        self.inner.run(args, cwd).await
    }
}

/// Answers without running anything: commands containing a failing needle
/// exit 128, everything else succeeds with no output
#[derive(Default)]
pub struct ScriptedExecutor {
    failing: Vec<String>,
    outputs: HashMap<String, String>,
}

impl ScriptedExecutor {
    pub fn failing_when_contains(mut self, needle: &str) -> Self {
        self.failing.push(needle.to_string());
        self
    }

    pub fn output_for(mut self, command: &str, stdout: &str) -> Self {
        self.outputs.insert(command.to_string(), stdout.to_string());
        self
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn run(&self, args: &[&str], _cwd: &Path) -> CommandOutcome {
        let command = args.join(" ");
        if self.failing.iter().any(|needle| command.contains(needle.as_str())) {
            return CommandOutcome::Failed(CommandError::Exit {
                command,
                code: Some(128),
                stderr: "fatal: scripted failure".to_string(),
            });
        }
        match self.outputs.get(&command) {
            Some(stdout) => CommandOutcome::Output(stdout.clone()),
            None => CommandOutcome::NoOutput,
        }
    }
}
