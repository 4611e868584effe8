use crate::domain::ports::Notifier;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Notifier that logs instead of delivering.
///
/// Stands in for the SMTP relay in local runs; delivery failures at a real
/// relay would surface here as `Err` and be swallowed by the caller.
#[derive(Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        tracing::info!(to, subject, "email dispatched");
        Ok(())
    }
}

/// Captures sent mail for assertions in tests.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// (recipient, subject) pairs in send order.
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        self.sent
            .write()
            .await
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}
