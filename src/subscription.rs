//! Scoped ownership of host event subscriptions.

/// Detaches a listener exactly once: on [`Subscription::release`] or on drop,
/// whichever comes first.
#[must_use = "dropping a Subscription detaches it immediately"]
pub struct Subscription {
    name: &'static str,
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(name: &'static str, detach: impl FnOnce() + 'static) -> Self {
        Self {
            name,
            detach: Some(Box::new(detach)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    pub fn release(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            tracing::trace!(subscription = self.name, "detaching");
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Subscriptions acquired together for one mounted background. Released in
/// reverse acquisition order.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn release_all(&mut self) {
        while let Some(subscription) = self.subscriptions.pop() {
            subscription.release();
        }
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.release_all();
    }
}
