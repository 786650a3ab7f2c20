use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Addresses and switch for below-average alerts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub from_address: String,
    pub to_address: String,
}

/// Raised when a submitted rating is lower than the restaurant's average
/// before it was added.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BelowAverageAlert {
    pub restaurant: String,
    pub rating: f64,
    pub prior_average: f64,
    pub from_address: String,
    pub to_address: String,
}

impl BelowAverageAlert {
    pub fn new(
        config: &NotificationConfig,
        restaurant: impl Into<String>,
        rating: f64,
        prior_average: f64,
    ) -> Self {
        Self {
            restaurant: restaurant.into(),
            rating,
            prior_average,
            from_address: config.from_address.clone(),
            to_address: config.to_address.clone(),
        }
    }

    pub fn subject(&self) -> String {
        format!(
            "Restaurant {} received a rating {} below its current average.",
            self.restaurant, self.rating
        )
    }

    pub fn body(&self) -> &'static str {
        "Rating Below Average Received"
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification rejected: {0}")]
    Rejected(String),

    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Consumer of below-average alerts.
///
/// A failing notifier never undoes the rating that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &BelowAverageAlert) -> Result<(), NotifyError>;
}

/// Emits alerts as structured log events.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &BelowAverageAlert) -> Result<(), NotifyError> {
        if alert.to_address.is_empty() {
            return Err(NotifyError::Rejected("no recipient configured".into()));
        }
        tracing::info!(
            from = %alert.from_address,
            to = %alert.to_address,
            subject = %alert.subject(),
            body = alert.body(),
            "below-average alert"
        );
        Ok(())
    }
}

pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _alert: &BelowAverageAlert) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Keeps every alert it receives. Useful in tests and embedding.
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<BelowAverageAlert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<BelowAverageAlert> {
        self.alerts.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &BelowAverageAlert) -> Result<(), NotifyError> {
        self.alerts
            .lock()
            .expect("lock poisoned")
            .push(alert.clone());
        Ok(())
    }
}
