//! Error taxonomy for frame resolution, request validation and engine runs.
//!
//! Every fallible operation in the crate returns one of these types. Only
//! [`crate::service`] turns them into the transport representation
//! (`ErrorKind` + message + optional transcript).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A frame identifier that matched nothing in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownFrame {
    #[error("reference frame cannot be empty")]
    EmptyIdentifier,

    #[error("unknown reference frame index: {0}")]
    NoSuchIndex(i64),

    #[error("unrecognised reference frame '{input}'. Use one of: {choices}")]
    NoSuchAlias { input: String, choices: String },
}

/// One field-scoped problem found while validating a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in a request, in field order.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid request: {}", join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why the engine binary cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineUnavailable {
    #[error("HTDP binary not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("HTDP binary at {} is not executable", .0.display())]
    NotExecutable(PathBuf),
}

/// Failures of a single engine invocation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Unavailable(#[from] EngineUnavailable),

    #[error("HTDP execution failed with {}", describe_code(.code))]
    ExecutionFailed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("HTDP did not finish within {}ms", .limit.as_millis())]
    Timeout { limit: Duration },

    #[error("HTDP output file was not created: {}", .0.display())]
    MissingOutputFile(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl EngineError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Unavailable(_) => ErrorKind::EngineUnavailable,
            EngineError::ExecutionFailed { .. } => ErrorKind::EngineFailed,
            EngineError::Timeout { .. } => ErrorKind::EngineTimeout,
            EngineError::MissingOutputFile(_) => ErrorKind::MissingOutput,
            EngineError::Io { .. } => ErrorKind::Internal,
        }
    }
}

/// Machine-readable error category exposed at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    EngineUnavailable,
    EngineFailed,
    EngineTimeout,
    MissingOutput,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::EngineUnavailable => "engine-unavailable",
            ErrorKind::EngineFailed => "engine-failed",
            ErrorKind::EngineTimeout => "engine-timeout",
            ErrorKind::MissingOutput => "missing-output",
            ErrorKind::Internal => "internal",
        };
        f.write_str(label)
    }
}
