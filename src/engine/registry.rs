//! Plugin registry: a name -> constructor table.
//!
//! The registry is an explicit object constructed at program start and passed
//! into the build, never a global, so tests and embedders can build isolated
//! registries. Third-party plugins register late through the same surface as
//! the built-ins.

use std::collections::HashMap;

use super::plugin::Plugin;

type Constructor = Box<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("plugin '{0}' is already registered")]
    Duplicate(String),
}

/// Name -> constructor table for materializing plugin lists.
#[derive(Default)]
pub struct PluginRegistry {
    constructors: HashMap<String, Constructor>,
    /// Registration order, preserved for `list`.
    order: Vec<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin constructor under a unique name.
    ///
    /// Duplicate names are a configuration error caught here, at
    /// registry-build time, not at runtime.
    pub fn register<F>(&mut self, name: &str, constructor: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        if self.constructors.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.constructors
            .insert(name.to_string(), Box::new(constructor));
        self.order.push(name.to_string());
        Ok(())
    }

    /// Construct a plugin by name.
    pub fn construct(&self, name: &str) -> Option<Box<dyn Plugin>> {
        self.constructors.get(name).map(|constructor| constructor())
    }

    /// Registered names, in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Construct the named plugins, in the given order.
    ///
    /// Unknown names are soft errors: construction continues and one warning
    /// per unknown name is returned alongside the plugins.
    pub fn by_names(&self, names: &[String]) -> (Vec<Box<dyn Plugin>>, Vec<String>) {
        let mut plugins = Vec::with_capacity(names.len());
        let mut warnings = Vec::new();

        for name in names {
            match self.construct(name) {
                Some(plugin) => plugins.push(plugin),
                None => warnings.push(format!("unknown plugin '{name}', skipping")),
            }
        }

        (plugins, warnings)
    }
}
