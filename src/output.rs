// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::DeployError;
use crate::stability::{StabilityReport, Strategy};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    duration_secs: self.duration(),
                    ..JsonEvent::new("success", message)
                };
                print_json(&event);
            }
        }
    }

    /// Print the outcome of a deploy.
    pub fn deployed(&self, report: StabilityReport) {
        let message = format!(
            "Deploy complete: {} object(s) stable, {} without checks",
            report.checked, report.skipped
        );
        match self.mode {
            OutputMode::Json => {
                let event = JsonEvent {
                    checked: Some(report.checked),
                    skipped: Some(report.skipped),
                    duration_secs: self.duration(),
                    ..JsonEvent::new("success", &message)
                };
                print_json(&event);
            }
            _ => self.success(&message),
        }
    }

    /// Print the strategy a kind is checked with.
    pub fn classification(&self, kind: &str, strategy: Strategy) {
        match self.mode {
            OutputMode::Json => {
                let strategy = strategy.to_string();
                let event = JsonEvent {
                    kind: Some(kind),
                    strategy: Some(&strategy),
                    ..JsonEvent::new("classify", "")
                };
                print_json(&event);
            }
            _ => println!("{kind}: {strategy}"),
        }
    }

    /// Print a failed deploy or clean with the step and object that failed.
    pub fn deploy_error(&self, err: &DeployError) {
        match self.mode {
            OutputMode::Json => {
                let message = err.to_string();
                let step = err.step().to_string();
                let object = err.failed_object().map(|o| o.to_string());
                let event = JsonEvent {
                    step: Some(&step),
                    object: object.as_deref(),
                    exit_code: err.exit_code(),
                    duration_secs: self.duration(),
                    ..JsonEvent::new("error", &message)
                };
                eprint_json(&event);
            }
            _ => self.error(&err.to_string()),
        }
        if err.additional_failures() > 0 {
            self.warning(&format!(
                "{} more object(s) also failed to become stable",
                err.additional_failures()
            ));
        }
    }

    /// Print a non-fatal warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => eprint_json(&JsonEvent::new("warning", message)),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    duration_secs: self.duration(),
                    ..JsonEvent::new("error", message)
                };
                eprint_json(&event);
            }
        }
    }
}

fn print_json(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

fn eprint_json(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        eprintln!("{json}");
    }
}

fn is_empty(s: &&str) -> bool {
    s.is_empty()
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checked: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

impl<'a> JsonEvent<'a> {
    fn new(event: &'a str, message: &'a str) -> Self {
        Self {
            event,
            message,
            kind: None,
            strategy: None,
            checked: None,
            skipped: None,
            step: None,
            object: None,
            exit_code: None,
            duration_secs: None,
        }
    }
}
