//! The plugin registry proper.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, warn};

use contracts::{
    check_name, ConfigItem, Configurable, CoreError, DataSet, Initializable, Loggable, Readable,
    Shutdownable, TreeConfigurable, Writable,
};

use crate::read_slot::ReadRegistration;

/// Configuration slot: flat key/value or structured tree, never both.
enum ConfigSlot {
    Simple(Arc<dyn Configurable>),
    Tree(Arc<dyn TreeConfigurable>),
}

/// Which configuration style a plugin registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Simple,
    Tree,
}

/// Per-plugin capability slots, at most one callback of each kind.
#[derive(Default)]
struct PluginSlots {
    config: Option<ConfigSlot>,
    init: Option<Arc<dyn Initializable>>,
    read: Option<Arc<ReadRegistration>>,
    shutdown: Option<Arc<dyn Shutdownable>>,
}

impl PluginSlots {
    fn is_empty(&self) -> bool {
        self.config.is_none()
            && self.init.is_none()
            && self.read.is_none()
            && self.shutdown.is_none()
    }
}

#[derive(Default)]
struct Inner {
    plugins: HashMap<String, PluginSlots>,
    /// First-registration order, drives init/read/shutdown iteration.
    order: Vec<String>,
    write_subscribers: Vec<(String, Arc<dyn Writable>)>,
    log_subscribers: Vec<(String, Arc<dyn Loggable>)>,
    data_sets: HashMap<String, Arc<DataSet>>,
}

impl Inner {
    fn slots_mut(&mut self, name: &str) -> &mut PluginSlots {
        if !self.plugins.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.plugins.entry(name.to_string()).or_default()
    }

    fn drop_if_empty(&mut self, name: &str) {
        if self.plugins.get(name).is_some_and(PluginSlots::is_empty) {
            self.plugins.remove(name);
            self.order.retain(|n| n != name);
        }
    }
}

/// Registry of plugin callbacks, subscribers and schemas.
///
/// Same-kind re-registration under one name is a deliberate last-wins
/// overwrite; `unregister_*` on an absent entry is a successful no-op.
#[derive(Default)]
pub struct PluginRegistry {
    inner: RwLock<Inner>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Registration =====

    /// Register a flat key/value config callback.
    ///
    /// Fails if the plugin already registered structured config.
    pub fn register_config(
        &self,
        name: &str,
        hook: Arc<dyn Configurable>,
    ) -> Result<(), CoreError> {
        let mut inner = self.write();
        let slots = inner.slots_mut(name);
        if matches!(slots.config, Some(ConfigSlot::Tree(_))) {
            return Err(CoreError::registration_conflict(
                name,
                "structured config already registered, simple config refused",
            ));
        }
        slots.config = Some(ConfigSlot::Simple(hook));
        debug!(plugin = name, "config callback registered");
        Ok(())
    }

    /// Register a structured config callback.
    ///
    /// Fails if the plugin already registered simple config.
    pub fn register_tree_config(
        &self,
        name: &str,
        hook: Arc<dyn TreeConfigurable>,
    ) -> Result<(), CoreError> {
        let mut inner = self.write();
        let slots = inner.slots_mut(name);
        if matches!(slots.config, Some(ConfigSlot::Simple(_))) {
            return Err(CoreError::registration_conflict(
                name,
                "simple config already registered, structured config refused",
            ));
        }
        slots.config = Some(ConfigSlot::Tree(hook));
        debug!(plugin = name, "tree config callback registered");
        Ok(())
    }

    pub fn register_init(&self, name: &str, hook: Arc<dyn Initializable>) {
        self.write().slots_mut(name).init = Some(hook);
        debug!(plugin = name, "init callback registered");
    }

    /// Register a simple read callback, polled on every scheduler tick.
    pub fn register_read(&self, name: &str, hook: Arc<dyn Readable>) {
        let slot = Arc::new(ReadRegistration::simple(name, hook));
        self.write().slots_mut(name).read = Some(slot);
        debug!(plugin = name, "read callback registered");
    }

    /// Register a complex read callback with its own interval override.
    ///
    /// The callback's owned state is dropped exactly once: when this slot is
    /// overwritten, unregistered, or cleared at shutdown.
    pub fn register_complex_read(
        &self,
        name: &str,
        hook: Arc<dyn Readable>,
        interval: Option<Duration>,
    ) {
        let slot = Arc::new(ReadRegistration::complex(name, hook, interval));
        self.write().slots_mut(name).read = Some(slot);
        debug!(plugin = name, ?interval, "complex read callback registered");
    }

    pub fn register_shutdown(&self, name: &str, hook: Arc<dyn Shutdownable>) {
        self.write().slots_mut(name).shutdown = Some(hook);
        debug!(plugin = name, "shutdown callback registered");
    }

    /// Register a write subscriber. Every accepted value list is fanned out to
    /// every subscriber, regardless of which plugin produced it.
    pub fn register_write(&self, name: &str, hook: Arc<dyn Writable>) {
        let mut inner = self.write();
        if let Some(entry) = inner
            .write_subscribers
            .iter_mut()
            .find(|(n, _)| n == name)
        {
            entry.1 = hook;
        } else {
            inner.write_subscribers.push((name.to_string(), hook));
        }
        debug!(sink = name, "write subscriber registered");
    }

    /// Register a log subscriber receiving every dispatched notification.
    pub fn register_log(&self, name: &str, hook: Arc<dyn Loggable>) {
        let mut inner = self.write();
        if let Some(entry) = inner.log_subscribers.iter_mut().find(|(n, _)| n == name) {
            entry.1 = hook;
        } else {
            inner.log_subscribers.push((name.to_string(), hook));
        }
        debug!(sink = name, "log subscriber registered");
    }

    /// Register a data set. A duplicate name is rejected and the original
    /// schema is left intact.
    pub fn register_data_set(&self, data_set: DataSet) -> Result<(), CoreError> {
        check_name("type", &data_set.name)?;
        let mut inner = self.write();
        if inner.data_sets.contains_key(&data_set.name) {
            return Err(CoreError::registration_conflict(
                &data_set.name,
                "data set already registered",
            ));
        }
        debug!(type_name = %data_set.name, sources = data_set.len(), "data set registered");
        inner
            .data_sets
            .insert(data_set.name.clone(), Arc::new(data_set));
        Ok(())
    }

    // ===== Unregistration (absent entries are a no-op) =====

    pub fn unregister_config(&self, name: &str) {
        let mut inner = self.write();
        if let Some(slots) = inner.plugins.get_mut(name) {
            slots.config = None;
        }
        inner.drop_if_empty(name);
    }

    pub fn unregister_init(&self, name: &str) {
        let mut inner = self.write();
        if let Some(slots) = inner.plugins.get_mut(name) {
            slots.init = None;
        }
        inner.drop_if_empty(name);
    }

    pub fn unregister_read(&self, name: &str) {
        let mut inner = self.write();
        if let Some(slots) = inner.plugins.get_mut(name) {
            slots.read = None;
        }
        inner.drop_if_empty(name);
    }

    pub fn unregister_shutdown(&self, name: &str) {
        let mut inner = self.write();
        if let Some(slots) = inner.plugins.get_mut(name) {
            slots.shutdown = None;
        }
        inner.drop_if_empty(name);
    }

    pub fn unregister_write(&self, name: &str) {
        self.write().write_subscribers.retain(|(n, _)| n != name);
    }

    pub fn unregister_log(&self, name: &str) {
        self.write().log_subscribers.retain(|(n, _)| n != name);
    }

    pub fn unregister_data_set(&self, name: &str) {
        self.write().data_sets.remove(name);
    }

    // ===== Lookup & snapshots =====

    /// Which configuration style `plugin` registered, if any.
    pub fn config_kind(&self, plugin: &str) -> Option<ConfigKind> {
        let inner = self.read();
        match inner.plugins.get(plugin)?.config.as_ref()? {
            ConfigSlot::Simple(_) => Some(ConfigKind::Simple),
            ConfigSlot::Tree(_) => Some(ConfigKind::Tree),
        }
    }

    /// Look up a data set by type name. Absent names report not-found without
    /// side effects.
    pub fn get_data_set(&self, name: &str) -> Option<Arc<DataSet>> {
        self.read().data_sets.get(name).cloned()
    }

    /// Snapshot of write subscribers in registration order.
    pub fn write_subscribers(&self) -> Vec<(String, Arc<dyn Writable>)> {
        self.read().write_subscribers.clone()
    }

    /// Snapshot of log subscribers in registration order.
    pub fn log_subscribers(&self) -> Vec<(String, Arc<dyn Loggable>)> {
        self.read().log_subscribers.clone()
    }

    /// Snapshot of read registrations in first-registration order.
    pub fn read_registrations(&self) -> Vec<Arc<ReadRegistration>> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|name| inner.plugins.get(name).and_then(|s| s.read.clone()))
            .collect()
    }

    /// Snapshot of init callbacks in first-registration order.
    pub fn init_hooks(&self) -> Vec<(String, Arc<dyn Initializable>)> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|name| {
                inner
                    .plugins
                    .get(name)
                    .and_then(|s| s.init.clone())
                    .map(|h| (name.clone(), h))
            })
            .collect()
    }

    /// Snapshot of shutdown callbacks in first-registration order.
    pub fn shutdown_hooks(&self) -> Vec<(String, Arc<dyn Shutdownable>)> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|name| {
                inner
                    .plugins
                    .get(name)
                    .and_then(|s| s.shutdown.clone())
                    .map(|h| (name.clone(), h))
            })
            .collect()
    }

    /// Drop every read registration, running outstanding destructors.
    ///
    /// Returns how many registrations were cleared.
    pub fn clear_reads(&self) -> usize {
        let mut cleared = Vec::new();
        {
            let mut inner = self.write();
            for slots in inner.plugins.values_mut() {
                if let Some(slot) = slots.read.take() {
                    cleared.push(slot);
                }
            }
        }
        // Dropped here, outside the lock: a destructor that re-enters the
        // registry must not deadlock.
        cleared.len()
    }

    // ===== Config application =====

    /// Feed one flat option to a plugin's simple-config callback.
    ///
    /// Keys are matched case-insensitively against the declared allow-list.
    pub fn configure_simple(&self, plugin: &str, key: &str, value: &str) -> Result<(), CoreError> {
        let hook = {
            let inner = self.read();
            match inner.plugins.get(plugin).and_then(|s| s.config.as_ref()) {
                Some(ConfigSlot::Simple(hook)) => Arc::clone(hook),
                Some(ConfigSlot::Tree(_)) => {
                    return Err(CoreError::config_validation(
                        plugin,
                        "plugin expects structured config, not key/value options",
                    ))
                }
                None => {
                    return Err(CoreError::config_validation(
                        plugin,
                        "no config callback registered",
                    ))
                }
            }
        };
        if !hook.keys().iter().any(|k| k.eq_ignore_ascii_case(key)) {
            warn!(plugin, key, "option not in plugin allow-list, ignored");
            return Err(CoreError::UnknownConfigKey {
                plugin: plugin.to_string(),
                key: key.to_string(),
            });
        }
        hook.configure(key, value)
    }

    /// Feed a parsed config tree to a plugin's structured-config callback.
    pub fn configure_tree(&self, plugin: &str, item: &ConfigItem) -> Result<(), CoreError> {
        let hook = {
            let inner = self.read();
            match inner.plugins.get(plugin).and_then(|s| s.config.as_ref()) {
                Some(ConfigSlot::Tree(hook)) => Arc::clone(hook),
                Some(ConfigSlot::Simple(_)) => {
                    return Err(CoreError::config_validation(
                        plugin,
                        "plugin expects key/value options, not structured config",
                    ))
                }
                None => {
                    return Err(CoreError::config_validation(
                        plugin,
                        "no config callback registered",
                    ))
                }
            }
        };
        hook.configure(item)
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read();
        f.debug_struct("PluginRegistry")
            .field("plugins", &inner.order)
            .field("write_subscribers", &inner.write_subscribers.len())
            .field("log_subscribers", &inner.log_subscribers.len())
            .field("data_sets", &inner.data_sets.len())
            .finish()
    }
}
