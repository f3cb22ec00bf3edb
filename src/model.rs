//! The per-request rendering model for one property's list of values.
//!
//! Built once per render of a property, immutable afterwards. The collating
//! and non-collating variants share the same resolver; collation only changes
//! which select-query fragments are kept and whether the collation
//! consistency check runs.

use crate::collation;
use crate::config::{self, PropertyListConfig, Resolution, ResolveOptions};
use crate::env::Environment;
use crate::errors::{ConfigDefect, ConfigurationError, ContractViolation, ModelError};
use crate::postprocess::{DataPostProcessor, PostProcessorRegistry};
use crate::types::{Individual, ObjectProperty};

/// Whether a collating model verifies the select query's subclass handling.
///
/// Opting out is an explicit choice (for example when there are no populated
/// properties to render), never a side effect of other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollationPolicy {
    Checked,
    Unchecked,
}

/// A property's list view, ready for template rendering.
#[derive(Debug)]
pub struct PropertyListModel {
    property_uri: String,
    subject_uri: String,
    collated: bool,
    editing: bool,
    config: PropertyListConfig,
    defects: Vec<ConfigDefect>,
    used_default: bool,
}

impl PropertyListModel {
    /// Build a non-collating model.
    pub fn new(
        property: &ObjectProperty,
        subject: &Individual,
        env: &dyn Environment,
        editing: bool,
        registry: &PostProcessorRegistry,
    ) -> Result<Self, ConfigurationError> {
        let opts = ResolveOptions {
            collated: false,
            editing,
            query_check: None,
        };
        Self::build(property, subject, env, registry, &opts)
    }

    /// Build a collating model. With `CollationPolicy::Checked`, a select
    /// query that does not select and sort first by the subclass variable is
    /// a fatal configuration error.
    pub fn collating(
        property: &ObjectProperty,
        subject: &Individual,
        env: &dyn Environment,
        editing: bool,
        registry: &PostProcessorRegistry,
        policy: CollationPolicy,
    ) -> Result<Self, ConfigurationError> {
        let query_check = match policy {
            CollationPolicy::Checked => {
                Some(&collation::check_query as config::QueryCheck<'_>)
            }
            CollationPolicy::Unchecked => None,
        };
        let opts = ResolveOptions {
            collated: true,
            editing,
            query_check,
        };
        Self::build(property, subject, env, registry, &opts)
    }

    /// Request-boundary constructor: the pieces arrive as `Option`s from the
    /// request attribute map, and a missing one is a programming error by the
    /// caller — rejected immediately, never logged-and-defaulted.
    pub fn from_request_parts(
        property: Option<&ObjectProperty>,
        subject: Option<&Individual>,
        env: Option<&dyn Environment>,
        editing: bool,
        registry: &PostProcessorRegistry,
    ) -> Result<Self, ModelError> {
        let property = property.ok_or(ContractViolation::MissingProperty)?;
        let subject = subject.ok_or(ContractViolation::MissingSubject)?;
        let env = env.ok_or(ContractViolation::MissingEnvironment)?;
        Ok(Self::new(property, subject, env, editing, registry)?)
    }

    fn build(
        property: &ObjectProperty,
        subject: &Individual,
        env: &dyn Environment,
        registry: &PostProcessorRegistry,
        opts: &ResolveOptions<'_>,
    ) -> Result<Self, ConfigurationError> {
        let Resolution {
            config,
            defects,
            used_default,
        } = config::resolve(property, env, registry, opts)?;

        Ok(Self {
            property_uri: property.uri().to_string(),
            subject_uri: subject.uri().to_string(),
            collated: opts.collated,
            editing: opts.editing,
            config,
            defects,
            used_default,
        })
    }

    pub fn property_uri(&self) -> &str {
        &self.property_uri
    }

    pub fn subject_uri(&self) -> &str {
        &self.subject_uri
    }

    pub fn is_collated(&self) -> bool {
        self.collated
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// True when this property renders with the default list view.
    pub fn has_default_list_view(&self) -> bool {
        self.used_default
    }

    pub fn select_query(&self) -> &str {
        self.config.select_query()
    }

    pub fn construct_queries(&self) -> &std::collections::BTreeSet<String> {
        self.config.construct_queries()
    }

    pub fn template_name(&self) -> &str {
        self.config.template_name()
    }

    pub fn postprocessor(&self) -> &dyn DataPostProcessor {
        self.config.postprocessor()
    }

    /// The recoverable defects recorded while resolving this model's config.
    pub fn defects(&self) -> &[ConfigDefect] {
        &self.defects
    }

    pub fn config(&self) -> &PropertyListConfig {
        &self.config
    }
}
