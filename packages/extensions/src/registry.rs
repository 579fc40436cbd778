use crate::builtin;
use crate::config::{ExtensionConfig, EXTENSIONS_KEY};
use crate::descriptor::ExtensionDescriptor;
use crate::error::RegistryResult;
use folio_schema::{build, BaseSchema, Schema, SchemaFragment};
use futures::future::join_all;
use std::cmp::Reverse;
use tracing::{debug, info, instrument, warn};

/// Registration table of extensions, keyed by name
pub struct Registry {
    descriptors: Vec<ExtensionDescriptor>,
}

impl Registry {
    /// Registry holding every built-in extension
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for descriptor in builtin::extensions() {
            registry.register(descriptor);
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Add `descriptor`; an extension of the same name is replaced
    pub fn register(&mut self, descriptor: ExtensionDescriptor) {
        match self.descriptors.iter_mut().find(|d| d.name == descriptor.name) {
            Some(existing) => {
                debug!(extension = %descriptor.name, "Replacing registered extension");
                *existing = descriptor;
            }
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Registered extensions in registration order
    pub fn descriptors(&self) -> &[ExtensionDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The active subset in resolution order: group, then priority
    /// (highest first), then name
    pub fn ordered<S: AsRef<str>>(&self, active: &[S]) -> Vec<&ExtensionDescriptor> {
        for name in active {
            if self.get(name.as_ref()).is_none() {
                warn!(extension = name.as_ref(), "Ignoring unknown extension");
            }
        }
        let mut selected: Vec<&ExtensionDescriptor> = self
            .descriptors
            .iter()
            .filter(|d| active.iter().any(|name| name.as_ref() == d.name))
            .collect();
        selected.sort_by_key(|d| (d.group, Reverse(d.priority), d.name.clone()));
        selected
    }

    /// Load the active extensions with `config`. Loads run concurrently; the
    /// result keeps resolution order whatever order they finish in.
    #[instrument(skip(self, active, config), fields(active = active.len()))]
    pub async fn resolve<S: AsRef<str>>(
        &self,
        active: &[S],
        config: &ExtensionConfig,
    ) -> RegistryResult<Vec<SchemaFragment>> {
        self.report_ignored_keys(config);
        let selected = self.ordered(active);
        let loads = selected.iter().map(|descriptor| descriptor.load(config));
        let fragments = join_all(loads)
            .await
            .into_iter()
            .collect::<RegistryResult<Vec<_>>>()?;

        info!(
            fragments = fragments.len(),
            order = ?selected.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            "Extensions resolved"
        );
        Ok(fragments)
    }

    /// Resolve the extensions listed under `extensions` in `config`
    pub async fn resolve_config(&self, config: &ExtensionConfig) -> RegistryResult<Vec<SchemaFragment>> {
        let active = config.extensions().unwrap_or_default();
        self.resolve(&active, config).await
    }

    /// Resolve and build in one step, on top of the standard base schema
    pub async fn build_schema<S: AsRef<str>>(&self, active: &[S], config: &ExtensionConfig) -> RegistryResult<Schema> {
        let fragments = self.resolve(active, config).await?;
        Ok(build(&fragments, &BaseSchema::standard())?)
    }

    fn report_ignored_keys(&self, config: &ExtensionConfig) {
        for key in config.keys() {
            if key != EXTENSIONS_KEY && !self.descriptors.iter().any(|d| d.declares(key)) {
                warn!(key, "Ignoring unrecognized configuration key");
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("extensions", &format!("{} extensions", self.descriptors.len()))
            .finish()
    }
}
