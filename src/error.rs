//! error types shared by parameter extraction and expression compilation
//!
//! every error carries a complete human-readable diagnostic (block, parameter
//! and line when known); `kind()` exposes the failure category for callers
//! that need to branch on it.

use thiserror::Error;

use crate::syntax::ParseError;

/// broad failure category of a [`ConfigError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// a mandatory parameter is absent
    MandatoryMissing,
    /// wrong type, bad suffix, malformed number/duration/size
    InvalidFormat,
    /// value parsed but violates a rule (positivity, wildcard, path, mail...)
    ConstraintViolated,
    /// unknown criterion, undefined fileclass or status manager
    UnknownIdentifier,
    /// wrong block shape or unexpected operator
    Structural,
    /// criterion type that cannot be compiled
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Missing mandatory parameter '{var}' in block '{block}', line {line}")]
    MissingParameter {
        block: String,
        var: String,
        line: u32,
    },

    #[error("{0}")]
    InvalidValue(String),

    #[error("{0}")]
    Constraint(String),

    #[error("Unknown or unsupported criteria '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownCriterion {
        name: String,
        suggestion: Option<String>,
    },

    #[error("FileClass '{name}' is undefined{}", suggestion_suffix(.suggestion))]
    UndefinedFileClass {
        name: String,
        suggestion: Option<String>,
    },

    #[error("FileClass '{0}' is defined more than once")]
    DuplicateFileClass(String),

    #[error("Unknown status manager '{0}'")]
    UnknownStatusManager(String),

    #[error("'{block}' block is empty, line {line}")]
    EmptyBlock { block: String, line: u32 },

    #[error("{0}")]
    Structural(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("Error reading configuration for module '{module}':\n{source}")]
    Module {
        module: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("{source}, line {line}")]
    AtLine {
        #[source]
        source: Box<ConfigError>,
        line: u32,
    },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint(message.into())
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// append the declaring line to this error's message
    pub fn at_line(self, line: u32) -> Self {
        Self::AtLine {
            source: Box::new(self),
            line,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter { .. } => ErrorKind::MandatoryMissing,
            Self::InvalidValue(_) => ErrorKind::InvalidFormat,
            Self::Constraint(_) => ErrorKind::ConstraintViolated,
            Self::UnknownCriterion { .. }
            | Self::UndefinedFileClass { .. }
            | Self::UnknownStatusManager(_) => ErrorKind::UnknownIdentifier,
            Self::DuplicateFileClass(_)
            | Self::EmptyBlock { .. }
            | Self::Structural(_)
            | Self::Syntax(_) => ErrorKind::Structural,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Module { source, .. } | Self::AtLine { source, .. } => source.kind(),
        }
    }
}

impl From<ParseError> for ConfigError {
    fn from(err: ParseError) -> Self {
        Self::Syntax(err.to_string())
    }
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
