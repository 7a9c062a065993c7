//! Explicit feature registration.
//!
//! Features are registered in order; their kick-starts are handed to the
//! sequencer in that same order, which fixes the status tie-break.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{KickStartError, KickStartResult};
use crate::task::KickStartTask;

/// A named application feature and the kick-starts it contributes.
#[derive(Debug, Clone)]
pub struct Feature {
    name: String,
    kick_starts: Vec<KickStartTask>,
}

impl Feature {
    /// Start describing a feature with no kick-starts.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kick_starts: Vec::new(),
        }
    }

    /// Contribute a kick-start task.
    #[must_use]
    pub fn with_kick_start(mut self, task: KickStartTask) -> Self {
        self.kick_starts.push(task);
        self
    }

    /// Feature name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kick-starts contributed by this feature, in contribution order.
    #[must_use]
    pub fn kick_starts(&self) -> &[KickStartTask] {
        &self.kick_starts
    }
}

/// Ordered registration list of features.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    features: Vec<Feature>,
    names: HashSet<String>,
}

impl TaskRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature.
    ///
    /// # Errors
    ///
    /// Returns [`KickStartError::EmptyFeatureName`] for blank names and
    /// [`KickStartError::DuplicateFeature`] when the name is already taken.
    pub fn register(&mut self, mut feature: Feature) -> KickStartResult<()> {
        feature.name = feature.name.trim().to_string();
        if feature.name.is_empty() {
            return Err(KickStartError::EmptyFeatureName);
        }
        if !self.names.insert(feature.name.clone()) {
            return Err(KickStartError::DuplicateFeature { name: feature.name });
        }
        debug!(
            feature = %feature.name,
            kick_starts = feature.kick_starts.len(),
            "feature registered"
        );
        self.features.push(feature);
        Ok(())
    }

    /// Names of registered features, in registration order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(Feature::name)
    }

    /// All kick-starts: feature registration order, then contribution order.
    #[must_use]
    pub fn kick_starts(&self) -> Vec<KickStartTask> {
        self.features
            .iter()
            .flat_map(|feature| feature.kick_starts.iter().cloned())
            .collect()
    }
}
