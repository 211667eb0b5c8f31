use crate::ast::SourceExtent;
use std::fmt;

/// What went wrong during evaluation. Kinds, not constructor names: the
/// dialect has no catchable error objects, so the host sees these directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Range,
    Syntax,
    NotImplemented,
}

/// A runtime error. Aborts the current evaluation unconditionally (the
/// language has no `try`); carries the call-site extents active when it was
/// raised.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub message: String,
    pub stack_trace: Vec<SourceExtent>,
}

impl EvalError {
    pub fn type_error(message: impl Into<String>, stack_trace: Vec<SourceExtent>) -> Self {
        Self {
            kind: ErrorKind::Type,
            message: message.into(),
            stack_trace,
        }
    }

    pub fn range_error(message: impl Into<String>, stack_trace: Vec<SourceExtent>) -> Self {
        Self {
            kind: ErrorKind::Range,
            message: message.into(),
            stack_trace,
        }
    }

    pub fn not_implemented(message: impl Into<String>, stack_trace: Vec<SourceExtent>) -> Self {
        Self {
            kind: ErrorKind::NotImplemented,
            message: format!("Not implemented: {}", message.into()),
            stack_trace,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for extent in &self.stack_trace {
            write!(f, "\n    at {extent}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

/// Host-facing error type for the whole engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
