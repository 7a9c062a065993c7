//! Kick-start task wrapper and the context handed to every invocation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use eatery_nod_events::EventBus;

use crate::disclosure::DisclosableError;
use crate::error::{KickStartError, KickStartResult};
use crate::services::ServiceRegistry;
use crate::status::StatusWatcher;

/// Deferred result returned by a kick-start invocation.
pub type KickStartFuture = Pin<Box<dyn Future<Output = Result<(), DisclosableError>> + Send>>;

type Invoke = dyn Fn(KickStartContext) -> KickStartFuture + Send + Sync;

/// Context passed to each kick-start invocation.
#[derive(Clone)]
pub struct KickStartContext {
    /// Dispatch target for application events.
    pub events: EventBus,
    /// Read-only view of the bootstrap status.
    pub status: StatusWatcher,
    /// Services shared between features.
    pub services: ServiceRegistry,
}

impl KickStartContext {
    /// Bundle the collaborators handed to kick-start tasks.
    #[must_use]
    pub const fn new(events: EventBus, status: StatusWatcher, services: ServiceRegistry) -> Self {
        Self {
            events,
            status,
            services,
        }
    }
}

/// A named, deferred, critical-path initialisation step.
#[derive(Clone)]
pub struct KickStartTask {
    label: String,
    invoke: Arc<Invoke>,
}

impl KickStartTask {
    /// Wrap `invoke` under a human-readable `label`.
    ///
    /// # Errors
    ///
    /// Returns [`KickStartError::EmptyLabel`] when the label is empty or whitespace.
    pub fn new<F, Fut>(label: impl Into<String>, invoke: F) -> KickStartResult<Self>
    where
        F: Fn(KickStartContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), DisclosableError>> + Send + 'static,
    {
        let label = label.into().trim().to_string();
        if label.is_empty() {
            return Err(KickStartError::EmptyLabel);
        }
        Ok(Self {
            label,
            invoke: Arc::new(move |context: KickStartContext| -> KickStartFuture {
                Box::pin(invoke(context))
            }),
        })
    }

    /// Human-readable description shown while the task is outstanding.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Start the task, returning its deferred result.
    #[must_use]
    pub fn invoke(&self, context: KickStartContext) -> KickStartFuture {
        (self.invoke)(context)
    }
}

impl fmt::Debug for KickStartTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KickStartTask")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_labels_are_rejected_at_registration() {
        let err = KickStartTask::new("   ", |_| async { Ok(()) }).expect_err("blank label");
        assert!(matches!(err, KickStartError::EmptyLabel));
        assert!(KickStartTask::new("", |_| async { Ok(()) }).is_err());
    }

    #[test]
    fn labels_are_trimmed() -> KickStartResult<()> {
        let task = KickStartTask::new("  Loading fonts ", |_| async { Ok(()) })?;
        assert_eq!(task.label(), "Loading fonts");
        assert!(format!("{task:?}").contains("Loading fonts"));
        Ok(())
    }

    #[tokio::test]
    async fn invoke_runs_the_wrapped_operation() -> KickStartResult<()> {
        let (_projection, watcher) = crate::status::StatusProjection::new();
        let context = KickStartContext::new(EventBus::new(), watcher, ServiceRegistry::new());
        let task = KickStartTask::new("Seeding services", |ctx: KickStartContext| async move {
            ctx.services.insert(7_u32);
            Ok(())
        })?;
        task.invoke(context.clone()).await.expect("task succeeds");
        assert_eq!(context.services.get::<u32>().as_deref(), Some(&7));
        Ok(())
    }
}
