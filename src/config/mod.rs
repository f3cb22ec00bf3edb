//! Resolution and validation of per-property list-view configuration.
//!
//! Given a property and an environment, locate the config file (explicit name
//! or the default), parse and validate it, and produce an immutable
//! [`PropertyListConfig`]. Recoverable problems are recorded as
//! [`ConfigDefect`]s and resolution falls back to the default file (and, as a
//! last resort, to a neutral disabled config); collation consistency failures
//! are fatal and abort resolution.

pub mod select;
pub mod xml;

use std::collections::BTreeSet;
use std::fmt;
use std::fs;

use tracing::{debug, error, warn};

use crate::env::{CONFIG_VIRTUAL_DIR, Environment};
use crate::errors::{ConfigDefect, ConfigurationError};
use crate::postprocess::{DataPostProcessor, FactoryArgs, PostProcessorRegistry};
use crate::types::ObjectProperty;
use self::select::SelectQuery;

/// File used when a property has no configured list view, and fallen back to
/// when its configured file is defective.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "listViewConfig-default.xml";

/// Template carried by the neutral config when even the default file fails.
pub const DEFAULT_TEMPLATE_NAME: &str = "propStatement-default.ftl";

/// A query-check hook applied to the assembled select query.
pub type QueryCheck<'a> = &'a dyn Fn(&str) -> Result<(), ConfigurationError>;

/// How one resolution run should behave.
///
/// The collating and non-collating rendering paths share this one resolver;
/// they differ only in these options (no type hierarchy involved).
#[derive(Default)]
pub struct ResolveOptions<'a> {
    /// Include `<collated>` fragments of the select query.
    pub collated: bool,
    /// Editing mode: drop `<critical-data-required>` fragments.
    pub editing: bool,
    /// Fatal check applied to the assembled select query, if any.
    /// `None` is the explicit opt-out used when no syntax checking is wanted.
    pub query_check: Option<QueryCheck<'a>>,
}

/// The fully validated configuration for rendering one property's list.
/// Never observable in a partially validated state.
pub struct PropertyListConfig {
    select_query: String,
    construct_queries: BTreeSet<String>,
    template_name: String,
    postprocessor: Box<dyn DataPostProcessor>,
}

impl PropertyListConfig {
    /// The assembled select query text.
    pub fn select_query(&self) -> &str {
        &self.select_query
    }

    pub fn construct_queries(&self) -> &BTreeSet<String> {
        &self.construct_queries
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Always usable; the default no-op processor when none was configured
    /// or resolution failed.
    pub fn postprocessor(&self) -> &dyn DataPostProcessor {
        self.postprocessor.as_ref()
    }
}

impl fmt::Debug for PropertyListConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyListConfig")
            .field("select_query", &self.select_query)
            .field("construct_queries", &self.construct_queries)
            .field("template_name", &self.template_name)
            .field("postprocessor", &self.postprocessor.name())
            .finish()
    }
}

/// The structured outcome of one resolution run.
#[derive(Debug)]
pub struct Resolution {
    pub config: PropertyListConfig,
    /// Every recoverable defect encountered, in the order found. The same
    /// messages go to the log; this is the channel tests assert on.
    pub defects: Vec<ConfigDefect>,
    /// True when the property had no configured file name, or when any
    /// fallback to the default view occurred.
    pub used_default: bool,
}

/// Resolve the list-view config for one property.
///
/// Only a failed `query_check` aborts with an error; everything else
/// degrades to the default file or to a neutral config, with defects
/// recorded.
pub fn resolve(
    property: &ObjectProperty,
    env: &dyn Environment,
    registry: &PostProcessorRegistry,
    opts: &ResolveOptions<'_>,
) -> Result<Resolution, ConfigurationError> {
    let mut defects = Vec::new();

    let named = env
        .list_view_config_name(property)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let mut used_default = named.is_none();
    let first = named.unwrap_or_else(|| DEFAULT_CONFIG_FILE_NAME.to_string());
    debug!(property = property.uri(), file = %first, "resolving list view config");

    let mut validated = attempt(&first, env, &mut defects);
    if validated.is_none() {
        used_default = true;
        if first != DEFAULT_CONFIG_FILE_NAME {
            validated = attempt(DEFAULT_CONFIG_FILE_NAME, env, &mut defects);
        }
    }

    let (select, construct_queries, template_name, postprocessor_name) = match validated {
        Some(v) => (v.select, v.construct_queries, v.template, v.postprocessor),
        // Neutral disabled config: nothing to query, nothing to post-process.
        None => (
            SelectQuery::default(),
            BTreeSet::new(),
            DEFAULT_TEMPLATE_NAME.to_string(),
            None,
        ),
    };

    let select_query = select.assemble(opts.collated, !opts.editing);
    if let Some(check) = opts.query_check {
        check(&select_query).inspect_err(|err| error!("{err}"))?;
    }

    let (postprocessor, pp_defect) =
        registry.resolve(postprocessor_name.as_deref(), &FactoryArgs { property, env });
    if let Some(defect) = pp_defect {
        record(&mut defects, defect);
    }

    Ok(Resolution {
        config: PropertyListConfig {
            select_query,
            construct_queries,
            template_name,
            postprocessor,
        },
        defects,
        used_default,
    })
}

/// One file's worth of parsed-and-validated content.
struct Validated {
    select: SelectQuery,
    construct_queries: BTreeSet<String>,
    template: String,
    postprocessor: Option<String>,
}

/// Load and validate one config file. Returns `None` (with defects recorded)
/// when anything disqualifies the file, so the caller can fall back.
fn attempt(
    file_name: &str,
    env: &dyn Environment,
    defects: &mut Vec<ConfigDefect>,
) -> Option<Validated> {
    let virtual_path = format!("{CONFIG_VIRTUAL_DIR}/{file_name}");
    let Some(path) = env.real_path(&virtual_path) else {
        record(defects, ConfigDefect::NoRealPath(virtual_path));
        return None;
    };

    if !path.is_file() {
        record(defects, ConfigDefect::FileNotFound(path));
        return None;
    }

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            record(
                defects,
                ConfigDefect::FileUnreadable {
                    path,
                    cause: err.to_string(),
                },
            );
            return None;
        }
    };

    let raw = match xml::parse(&text) {
        Ok(raw) => raw,
        Err(defect) => {
            record(defects, defect);
            return None;
        }
    };

    let mut usable = true;

    let select = match raw.select {
        None => {
            record(defects, ConfigDefect::MissingSelectQuery);
            usable = false;
            SelectQuery::default()
        }
        Some(select) if select.is_blank() => {
            record(defects, ConfigDefect::BlankSelectQuery);
            usable = false;
            select
        }
        Some(select) => select,
    };

    let template = match raw.template {
        None => {
            record(defects, ConfigDefect::MissingTemplate);
            usable = false;
            String::new()
        }
        Some(name) if name.is_empty() => {
            record(defects, ConfigDefect::EmptyTemplate);
            usable = false;
            name
        }
        Some(name) => {
            if !env.template_exists(&name) {
                record(defects, ConfigDefect::TemplateNotFound(name.clone()));
                usable = false;
            }
            name
        }
    };

    usable.then_some(Validated {
        select,
        construct_queries: raw.construct_queries,
        template,
        postprocessor: raw.postprocessor,
    })
}

fn record(defects: &mut Vec<ConfigDefect>, defect: ConfigDefect) {
    warn!("{defect}");
    defects.push(defect);
}
