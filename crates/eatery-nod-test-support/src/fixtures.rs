//! Kick-start fixtures: tasks whose settlement the test controls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use eatery_nod_events::EventBus;
use eatery_nod_kickstart::{
    DisclosableError, KickStartContext, KickStartResult, KickStartTask, ServiceRegistry,
    StatusProjection,
};
use tokio::sync::watch;

/// How a fixture task settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Resolve successfully.
    Succeed,
    /// Fail with an expected error carrying this client message.
    Expected(String),
    /// Fail with an unexpected error carrying this client message.
    Unexpected(String),
}

impl Settlement {
    /// Expected failure shorthand.
    #[must_use]
    pub fn expected(message: &str) -> Self {
        Self::Expected(message.to_string())
    }

    /// Unexpected failure shorthand.
    #[must_use]
    pub fn unexpected(message: &str) -> Self {
        Self::Unexpected(message.to_string())
    }

    fn into_result(self) -> Result<(), DisclosableError> {
        match self {
            Self::Succeed => Ok(()),
            Self::Expected(message) => Err(DisclosableError::expected(message)),
            Self::Unexpected(message) => Err(DisclosableError::unexpected(message)),
        }
    }
}

/// Control side of a [`gated_task`].
#[derive(Clone)]
pub struct Gate {
    release: Arc<watch::Sender<Option<Settlement>>>,
    invocations: Arc<AtomicUsize>,
}

impl Gate {
    /// Let the task settle with `settlement`.
    pub fn release(&self, settlement: Settlement) {
        self.release.send_replace(Some(settlement));
    }

    /// Shorthand for releasing with success.
    pub fn succeed(&self) {
        self.release(Settlement::Succeed);
    }

    /// Number of times the task was started.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

/// A task that stays pending until its [`Gate`] is released.
///
/// # Errors
///
/// Returns [`eatery_nod_kickstart::KickStartError::EmptyLabel`] when `label` is blank.
pub fn gated_task(label: &str) -> KickStartResult<(KickStartTask, Gate)> {
    let (release, _) = watch::channel(None::<Settlement>);
    let gate = Gate {
        release: Arc::new(release),
        invocations: Arc::new(AtomicUsize::new(0)),
    };
    let control = gate.clone();
    let task = KickStartTask::new(label, move |_| {
        control.invocations.fetch_add(1, Ordering::SeqCst);
        let mut receiver = control.release.subscribe();
        async move {
            let settlement = receiver
                .wait_for(Option::is_some)
                .await
                .map_err(DisclosableError::from_source)?
                .clone();
            settlement.map_or(Ok(()), Settlement::into_result)
        }
    })?;
    Ok((task, gate))
}

/// A task that settles as soon as it is polled.
///
/// # Errors
///
/// Returns [`eatery_nod_kickstart::KickStartError::EmptyLabel`] when `label` is blank.
pub fn settled_task(label: &str, settlement: Settlement) -> KickStartResult<KickStartTask> {
    KickStartTask::new(label, move |_| {
        let settlement = settlement.clone();
        async move { settlement.into_result() }
    })
}

/// Context with a fresh bus, service registry and status projection.
#[must_use]
pub fn test_context() -> (KickStartContext, StatusProjection) {
    let (projection, watcher) = StatusProjection::new();
    let context = KickStartContext::new(EventBus::new(), watcher, ServiceRegistry::new());
    (context, projection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gated_task_waits_for_release() -> KickStartResult<()> {
        let (context, _projection) = test_context();
        let (task, gate) = gated_task("A")?;
        let pending = tokio::spawn(task.invoke(context));
        assert_eq!(gate.invocations(), 1);
        assert!(!pending.is_finished());

        gate.release(Settlement::expected("denied"));
        let err = pending
            .await
            .expect("task joined")
            .expect_err("expected failure");
        assert_eq!(err.client_message(), "denied");
        assert!(!err.is_unexpected());
        Ok(())
    }

    #[tokio::test]
    async fn settled_task_resolves_immediately() -> KickStartResult<()> {
        let (context, _projection) = test_context();
        let task = settled_task("B", Settlement::unexpected("boom"))?;
        let err = task.invoke(context).await.expect_err("unexpected failure");
        assert!(err.is_unexpected());
        Ok(())
    }
}
