// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted in-memory command channel and manifest fixtures.

// Each test binary only uses some of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use settle::channel::{
    CommandChannel, CommandError, CommandResult, OperationStatus, Submission,
};
use settle::object::Manifest;
use settle::types::OperationId;
use std::collections::HashMap;
use std::sync::Once;
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("settle=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Build a manifest for `kind/name` in `namespace` (empty means unset).
pub fn manifest(kind: &str, name: &str, namespace: &str) -> Manifest {
    let mut metadata = serde_json::json!({ "name": name });
    if !namespace.is_empty() {
        metadata["namespace"] = serde_json::json!(namespace);
    }
    Manifest::from_value(serde_json::json!({
        "apiVersion": "v1",
        "kind": kind,
        "metadata": metadata,
    }))
    .unwrap()
}

/// How the fake control plane answers a command.
#[derive(Debug, Clone)]
pub enum Script {
    /// Submission rejected.
    Reject(String),
    /// Control plane unreachable on submission.
    Unreachable,
    /// Answered synchronously.
    Inline(CommandResult),
    /// Accepted, reported running `polls` times, then terminal.
    Complete {
        polls: usize,
        retry_after: Option<Duration>,
        result: CommandResult,
    },
    /// Accepted and never finishes.
    Hang,
}

impl Script {
    pub fn ok(logs: &str) -> Self {
        Script::Inline(CommandResult::succeeded(logs, 0))
    }

    pub fn exit(code: i32, logs: &str) -> Self {
        Script::Inline(CommandResult::succeeded(logs, code))
    }

    pub fn after_polls(polls: usize, result: CommandResult) -> Self {
        Script::Complete {
            polls,
            retry_after: None,
            result,
        }
    }
}

/// A command the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub command: String,
    pub context: Option<String>,
}

struct Operation {
    remaining: usize,
    retry_after: Option<Duration>,
    result: Option<CommandResult>,
}

/// In-memory `CommandChannel` answering commands by substring rules.
///
/// The first rule whose fragment occurs in the command wins; commands with
/// no matching rule succeed inline with exit code 0.
#[derive(Default)]
pub struct ScriptedChannel {
    rules: Vec<(String, Script)>,
    received: Mutex<Vec<Received>>,
    operations: Mutex<HashMap<String, Operation>>,
    status_calls: Mutex<usize>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, fragment: &str, script: Script) -> Self {
        self.rules.push((fragment.to_string(), script));
        self
    }

    /// Every submitted command, in submission order.
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.received().into_iter().map(|r| r.command).collect()
    }

    pub fn status_calls(&self) -> usize {
        *self.status_calls.lock()
    }

    fn script_for(&self, command: &str) -> Script {
        self.rules
            .iter()
            .find(|(fragment, _)| command.contains(fragment.as_str()))
            .map(|(_, script)| script.clone())
            .unwrap_or_else(|| Script::ok(""))
    }

    fn accept(&self, retry_after: Option<Duration>, operation: Operation) -> Submission {
        let mut operations = self.operations.lock();
        let id = format!("op-{}", operations.len() + 1);
        operations.insert(id.clone(), operation);
        Submission::Accepted {
            operation: OperationId::new(id),
            retry_after,
        }
    }
}

#[async_trait]
impl CommandChannel for ScriptedChannel {
    async fn submit(
        &self,
        command: &str,
        context: Option<&str>,
    ) -> Result<Submission, CommandError> {
        self.received.lock().push(Received {
            command: command.to_string(),
            context: context.map(str::to_string),
        });

        match self.script_for(command) {
            Script::Reject(reason) => Err(CommandError::Dispatch(reason)),
            Script::Unreachable => Err(CommandError::Connection("connection refused".to_string())),
            Script::Inline(result) => Ok(Submission::Finished(result)),
            Script::Complete {
                polls,
                retry_after,
                result,
            } => Ok(self.accept(
                retry_after,
                Operation {
                    remaining: polls,
                    retry_after,
                    result: Some(result),
                },
            )),
            Script::Hang => Ok(self.accept(
                None,
                Operation {
                    remaining: 0,
                    retry_after: None,
                    result: None,
                },
            )),
        }
    }

    async fn status(&self, operation: &OperationId) -> Result<OperationStatus, CommandError> {
        *self.status_calls.lock() += 1;

        let mut operations = self.operations.lock();
        let op = operations
            .get_mut(operation.as_str())
            .ok_or_else(|| CommandError::Dispatch(format!("unknown operation {operation}")))?;

        match &op.result {
            Some(result) if op.remaining == 0 => Ok(OperationStatus::Terminal(result.clone())),
            _ => {
                op.remaining = op.remaining.saturating_sub(1);
                Ok(OperationStatus::Running {
                    retry_after: op.retry_after,
                })
            }
        }
    }
}
