use tokio::sync::mpsc;

type Teardown = Box<dyn FnOnce() + Send + Sync + 'static>;

/// A live subscription to a stream of `T`.
///
/// The teardown registered by the adapter runs exactly once: on
/// [`Subscription::unsubscribe`] or when the value is dropped, whichever
/// happens first.
pub struct Subscription<T> {
    topic: String,
    receiver: mpsc::Receiver<T>,
    teardown: Option<Teardown>,
}

impl<T> Subscription<T> {
    pub fn new(
        topic: impl Into<String>,
        receiver: mpsc::Receiver<T>,
        teardown: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            topic: topic.into(),
            receiver,
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next item, or `None` once the producer side is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("active", &self.teardown.is_some())
            .finish()
    }
}
