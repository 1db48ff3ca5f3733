//! Notification sink that reports through the tracing pipeline.

use crate::services::ports::NotificationSink;

#[derive(Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn progress(&mut self, message: &str) {
        tracing::debug!("{message}");
    }

    fn succeeded(&mut self) {
        tracing::info!("workspace edit applied");
    }

    fn failed(&mut self, message: &str) {
        tracing::warn!("{message}");
    }

    fn restore_failed(&mut self, message: &str) {
        tracing::error!("{message}");
    }
}
