//! compiler for filesystem policy rules
//!
//! typed parameters, criteria, boolean condition trees and fileclass set
//! expressions, read from a policy document and rendered back to text.
//! also exposes the CLI definition for auxiliary binaries (e.g., generate-man).

pub mod cli;
pub mod conditions;
pub mod config;
pub mod error;
pub mod matching;
pub mod modules;
pub mod params;
pub mod syntax;
pub mod units;

pub use error::{ConfigError, ErrorKind};
