// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("{0}")]
    Argument(String),

    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Malformed label '{0}'")]
    BadLabel(String),

    #[error("Malformed path '{0}'")]
    BadPath(String),

    #[error("Error parsing {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Unknown target {label} (referenced from {referenced_from})")]
    MissingTarget {
        label: String,
        referenced_from: String,
    },

    #[error("Dependency cycle between {}", labels.join(" -> "))]
    Cycle { labels: Vec<String> },

    #[error("{dep} may not be a dependency of {target}: {reason}")]
    DepKind {
        target: String,
        dep: String,
        reason: String,
    },

    #[error("Duplicate declaration of {0}")]
    DuplicateLabel(String),

    #[error("Target {0} produced an empty rule")]
    EmptyRule(String),

    #[error("{count} generated input error(s) found")]
    GeneratedInputs { count: usize },

    #[error("Public header check failed for {target}: {header} is not under the target's directory")]
    PublicHeader { target: String, header: String },

    #[error("System include check failed: include dir {dir} (config {config}) does not exist")]
    SystemInclude { config: String, dir: String },

    #[error("Unknown IDE: {0}")]
    UnknownIde(String),

    #[error("Unknown build system: {0}")]
    UnknownBuildSystem(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;
