pub mod collation;
pub mod config;
pub mod env;
pub mod errors;
pub mod model;
pub mod postprocess;
pub mod types;

pub use config::{PropertyListConfig, Resolution};
pub use env::{DirEnvironment, Environment};
pub use errors::{ConfigDefect, ConfigurationError, ContractViolation, ModelError};
pub use model::{CollationPolicy, PropertyListModel};
pub use postprocess::{DataPostProcessor, DefaultPostProcessor, PostProcessorRegistry};
pub use types::{Individual, ObjectProperty};
