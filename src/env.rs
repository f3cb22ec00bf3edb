//! Collaborator seams for configuration resolution.
//!
//! The resolver never touches process-global state: everything it needs from
//! the hosting application — the configured file name for a property, virtual
//! path translation, and the template engine's name lookup — comes in through
//! an explicitly threaded [`Environment`] value.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::types::ObjectProperty;

/// The virtual directory that list-view config files live under.
pub const CONFIG_VIRTUAL_DIR: &str = "/config";

/// What the resolver needs from the hosting application.
pub trait Environment {
    /// The configured list-view file name for a property, if any.
    /// Data-access seam; query execution itself is opaque to this crate.
    fn list_view_config_name(&self, property: &ObjectProperty) -> Option<String>;

    /// Translate a virtual path (for example `/config/listViewConfig-default.xml`)
    /// to a real filesystem path. `None` means the path is unmapped.
    fn real_path(&self, virtual_path: &str) -> Option<PathBuf>;

    /// Whether the template engine can resolve a template by this name.
    fn template_exists(&self, name: &str) -> bool;
}

/// Directory-backed environment used by the CLI and by tests.
///
/// Maps the `/config/` virtual directory onto one real directory, keeps an
/// explicit set of known template names, and records per-property config file
/// names the way the data-access layer would.
#[derive(Debug, Clone, Default)]
pub struct DirEnvironment {
    config_dir: PathBuf,
    templates: BTreeSet<String>,
    assume_templates: bool,
    config_names: HashMap<String, String>,
    unmapped: BTreeSet<String>,
}

impl DirEnvironment {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Self::default()
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Register a template name the template engine can resolve.
    pub fn add_template(&mut self, name: impl Into<String>) {
        self.templates.insert(name.into());
    }

    /// Treat every template name as resolvable. Used by the CLI when the
    /// caller has no template inventory to check against.
    pub fn assume_templates(&mut self, assume: bool) {
        self.assume_templates = assume;
    }

    /// Record the configured list-view file name for a property URI.
    pub fn set_list_view_config_name(
        &mut self,
        property_uri: impl Into<String>,
        file_name: impl Into<String>,
    ) {
        self.config_names.insert(property_uri.into(), file_name.into());
    }

    /// Declare a virtual path untranslatable, as a servlet container does for
    /// unmapped resources.
    pub fn unmap_path(&mut self, virtual_path: impl Into<String>) {
        self.unmapped.insert(virtual_path.into());
    }
}

impl Environment for DirEnvironment {
    fn list_view_config_name(&self, property: &ObjectProperty) -> Option<String> {
        self.config_names.get(property.uri()).cloned()
    }

    fn real_path(&self, virtual_path: &str) -> Option<PathBuf> {
        if self.unmapped.contains(virtual_path) {
            return None;
        }
        let rel = virtual_path
            .strip_prefix(CONFIG_VIRTUAL_DIR)?
            .trim_start_matches('/');
        Some(self.config_dir.join(rel))
    }

    fn template_exists(&self, name: &str) -> bool {
        self.assume_templates || self.templates.contains(name)
    }
}
