//! Pluggable post-processing of fetched result rows.
//!
//! A config file may name a post-processor to run over the query results
//! before rendering. Names are resolved through a registry of factory
//! functions; the lookup is total — it always yields a processor, falling
//! back to [`DefaultPostProcessor`] with a recorded defect when resolution
//! fails for any reason.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::env::Environment;
use crate::errors::ConfigDefect;
use crate::types::ObjectProperty;

/// One fetched result row: variable name to value text.
pub type ResultRow = BTreeMap<String, String>;

/// The processing capability a configured post-processor must implement.
pub trait DataPostProcessor {
    /// The registered name this processor resolves under.
    fn name(&self) -> &str;

    /// Adjust the fetched rows in place before rendering.
    fn process(&self, rows: &mut Vec<ResultRow>);
}

/// Name the default processor reports from [`DataPostProcessor::name`].
pub const DEFAULT_POSTPROCESSOR_NAME: &str = "default";

/// The no-op fallback processor. Every resolved config carries a usable
/// processor; this is what it carries when none is configured or resolution
/// fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPostProcessor;

impl DataPostProcessor for DefaultPostProcessor {
    fn name(&self) -> &str {
        DEFAULT_POSTPROCESSOR_NAME
    }

    fn process(&self, _rows: &mut Vec<ResultRow>) {}
}

/// Why a registered factory could not produce a processor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstantiationError {
    #[error("does not implement the post-processing interface")]
    NotSuitable,

    #[error("does not have the required constructor")]
    WrongConstructor,

    #[error("constructor failed: {0}")]
    Failed(String),
}

impl InstantiationError {
    fn into_defect(self, name: &str) -> ConfigDefect {
        match self {
            Self::NotSuitable => ConfigDefect::PostProcessorNotSuitable(name.to_string()),
            Self::WrongConstructor => {
                ConfigDefect::PostProcessorWrongConstructor(name.to_string())
            }
            Self::Failed(cause) => ConfigDefect::PostProcessorFailed {
                name: name.to_string(),
                cause,
            },
        }
    }
}

/// What a factory gets to work with — the analog of the original
/// two-argument constructor: the owning property and the environment handle.
pub struct FactoryArgs<'a> {
    pub property: &'a ObjectProperty,
    pub env: &'a dyn Environment,
}

type Factory =
    Box<dyn Fn(&FactoryArgs) -> Result<Box<dyn DataPostProcessor>, InstantiationError> + Send + Sync>;

/// Registry mapping configured names to post-processor factories.
#[derive(Default)]
pub struct PostProcessorRegistry {
    factories: HashMap<String, Factory>,
}

impl PostProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a name. Re-registering replaces the entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&FactoryArgs) -> Result<Box<dyn DataPostProcessor>, InstantiationError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Total lookup: always returns a processor.
    ///
    /// An absent or blank name silently yields the default. Any resolution
    /// failure yields the default plus exactly one defect describing it.
    pub fn resolve(
        &self,
        name: Option<&str>,
        args: &FactoryArgs<'_>,
    ) -> (Box<dyn DataPostProcessor>, Option<ConfigDefect>) {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return (Box::new(DefaultPostProcessor), None);
        };

        match self.factories.get(name) {
            None => (
                Box::new(DefaultPostProcessor),
                Some(ConfigDefect::PostProcessorNotFound(name.to_string())),
            ),
            Some(factory) => match factory(args) {
                Ok(processor) => (processor, None),
                Err(err) => (
                    Box::new(DefaultPostProcessor),
                    Some(err.into_defect(name)),
                ),
            },
        }
    }
}

impl std::fmt::Debug for PostProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("PostProcessorRegistry")
            .field("names", &names)
            .finish()
    }
}
