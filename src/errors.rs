//! Typed error hierarchy for list-view configuration.
//!
//! Three categories, strictly separated:
//! - `ContractViolation` — programming errors by the caller (missing required
//!   arguments at the request boundary); never logged-and-defaulted
//! - `ConfigurationError` — fatal configuration errors that abort model
//!   construction (collation consistency failures)
//! - `ConfigDefect` — recoverable configuration problems; logged, returned as
//!   structured data, and the resolver proceeds with safe defaults

use std::path::PathBuf;
use thiserror::Error;

/// A required argument was missing at the request boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("object property is required but was not supplied")]
    MissingProperty,

    #[error("subject individual is required but was not supplied")]
    MissingSubject,

    #[error("render environment is required but was not supplied")]
    MissingEnvironment,
}

/// Fatal configuration errors. Continuing past one of these would silently
/// mis-group collated results, so model construction aborts instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Query does not select a subclass variable: {query}")]
    NoSubclassSelect { query: String },

    #[error("Query does not sort first by subclass variable: {query}")]
    NoSubclassOrder { query: String },
}

/// One recoverable structural problem in a config file.
///
/// Each variant's message is the operator-facing diagnostic; the same text is
/// emitted through `tracing` when the defect is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigDefect {
    #[error("Can't translate config path {0} to a real path")]
    NoRealPath(String),

    #[error("Can't find config file at {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Can't read config file at {path}: {cause}")]
    FileUnreadable { path: PathBuf, cause: String },

    #[error("Config file is not valid XML: {0}")]
    InvalidXml(String),

    #[error("Missing select query specification: no query-select element")]
    MissingSelectQuery,

    #[error("Missing select query specification: query-select element is blank")]
    BlankSelectQuery,

    #[error("Config file must contain a template element")]
    MissingTemplate,

    #[error("In a config file, the <template> element must not be empty.")]
    EmptyTemplate,

    #[error("Specified template does not exist: {0}")]
    TemplateNotFound(String),

    #[error("Unknown post-processor: {0}")]
    PostProcessorNotFound(String),

    #[error("Post-processor {0} does not implement the post-processing interface")]
    PostProcessorNotSuitable(String),

    #[error("Post-processor {0} does not have the required constructor")]
    PostProcessorWrongConstructor(String),

    #[error("Post-processor {name} failed during construction: {cause}")]
    PostProcessorFailed { name: String, cause: String },
}

impl ConfigDefect {
    /// Stable identifier for reports and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoRealPath(_) => "no_real_path",
            Self::FileNotFound(_) => "file_not_found",
            Self::FileUnreadable { .. } => "file_unreadable",
            Self::InvalidXml(_) => "invalid_xml",
            Self::MissingSelectQuery => "missing_select_query",
            Self::BlankSelectQuery => "blank_select_query",
            Self::MissingTemplate => "missing_template",
            Self::EmptyTemplate => "empty_template",
            Self::TemplateNotFound(_) => "template_not_found",
            Self::PostProcessorNotFound(_) => "postprocessor_not_found",
            Self::PostProcessorNotSuitable(_) => "postprocessor_not_suitable",
            Self::PostProcessorWrongConstructor(_) => "postprocessor_wrong_constructor",
            Self::PostProcessorFailed { .. } => "postprocessor_failed",
        }
    }
}

/// Errors surfaced by the request-boundary constructor, which can fail either
/// on a caller contract violation or on a fatal configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    #[error(transparent)]
    Config(#[from] ConfigurationError),
}
