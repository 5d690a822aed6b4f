//! Shared fakes for integration tests.
//!
//! [`FakeBinder`] stands in for the binding engine so the pipeline can be
//! observed without any real configuration groups, and
//! [`RecordingLifecycle`] counts start and stop calls.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bootseq::{
    ConfigAttribute, ConfigGroup, ConfigurationBinder, LifecycleError, LifecycleManager, Message,
    PropertyMap,
};

/// Binder that consumes a fixed key set and replays canned problems.
#[derive(Debug, Default)]
pub struct FakeBinder {
    consumes: BTreeSet<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    bound: Vec<PropertyMap>,
    used: BTreeSet<String>,
}

impl FakeBinder {
    /// A binder that reads exactly `keys` when they are present.
    pub fn consuming(keys: &[&str]) -> Self {
        Self {
            consumes: keys.iter().map(|k| (*k).to_owned()).collect(),
            ..Self::default()
        }
    }

    /// Emits `text` as a warning on every bind.
    pub fn with_warning(mut self, text: &str) -> Self {
        self.warnings.push(text.to_owned());
        self
    }

    /// Returns `text` as a binding error on every bind.
    pub fn with_error(mut self, text: &str) -> Self {
        self.errors.push(text.to_owned());
        self
    }

    /// Property maps received by each bind, in call order.
    pub fn bound(&self) -> &[PropertyMap] {
        &self.bound
    }
}

impl ConfigurationBinder for FakeBinder {
    fn register<T: ConfigGroup>(&mut self) {}

    fn bind(
        &mut self,
        properties: &PropertyMap,
        warnings: &mut dyn FnMut(Message),
    ) -> Vec<Message> {
        self.bound.push(properties.clone());
        for text in &self.warnings {
            warnings(Message::warning(text.clone()));
        }
        self.used = properties
            .keys()
            .filter(|key| self.consumes.contains(*key))
            .cloned()
            .collect();
        self.errors.iter().map(|text| Message::error(text.clone())).collect()
    }

    fn used_properties(&self) -> BTreeSet<String> {
        self.used.clone()
    }

    fn build<T: ConfigGroup>(&self) -> Option<T> {
        None
    }

    fn attributes(&self) -> Vec<ConfigAttribute> {
        Vec::new()
    }
}

/// Lifecycle manager whose clones share one start counter.
#[derive(Debug, Clone, Default)]
pub struct RecordingLifecycle {
    starts: Arc<AtomicUsize>,
}

impl RecordingLifecycle {
    /// Number of successful `start` calls across all clones.
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl LifecycleManager for RecordingLifecycle {
    fn start(&mut self) -> Result<(), LifecycleError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
