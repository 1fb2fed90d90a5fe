//! Subscription to user-interaction signals.

use std::sync::Arc;

use crate::domain::entities::ActivityKind;

/// Handler shared by every subscribed signal.
pub type ActivityHandler = Arc<dyn Fn(ActivityKind) + Send + Sync>;

/// Source of activity signals (the document, in a browser).
pub trait ActivitySource: Send + Sync {
    /// Attach `handler` to each of `kinds`.
    ///
    /// The returned [`Subscription`] detaches all of them when disposed.
    fn subscribe(&self, kinds: &[ActivityKind], handler: ActivityHandler) -> Subscription;
}

/// Disposer for an active subscription.
///
/// Runs its teardown at most once, either through [`Subscription::dispose`]
/// or on drop.
pub struct Subscription {
    disposer: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(disposer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            disposer: Some(Box::new(disposer)),
        }
    }

    /// Detach now.
    pub fn dispose(mut self) {
        self.run_disposer();
    }

    fn run_disposer(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_disposer();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.disposer.is_some())
            .finish()
    }
}
