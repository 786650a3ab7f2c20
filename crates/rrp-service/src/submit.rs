use std::sync::Arc;

use rrp_ledger::{validate_submission, DetailsBook, RatingLedger};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ServiceResult;
use crate::notify::{BelowAverageAlert, NotificationConfig, Notifier};

/// What a submission did.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub restaurant: String,
    /// Stored rating, rounded to two decimals.
    pub rating: f64,
    pub prior_average: Option<f64>,
    pub below_average: bool,
    /// `true` when this submission wrote the restaurant's details.
    pub details_created: bool,
    /// `true` when a below-average alert was delivered.
    pub notified: bool,
}

/// Validate → append → ensure details → alert.
#[derive(Clone)]
pub struct SubmissionService {
    ledger: RatingLedger,
    details: DetailsBook,
    notifier: Arc<dyn Notifier>,
    notification: NotificationConfig,
}

impl SubmissionService {
    pub fn new(
        ledger: RatingLedger,
        details: DetailsBook,
        notifier: Arc<dyn Notifier>,
        notification: NotificationConfig,
    ) -> Self {
        Self {
            ledger,
            details,
            notifier,
            notification,
        }
    }

    /// Handle one raw submission payload.
    ///
    /// The ledger write is durable once it returns: a later failure while
    /// recording details surfaces as an error but leaves the rating in place,
    /// and a failed alert is only logged.
    pub async fn submit(&self, payload: &Value) -> ServiceResult<SubmissionOutcome> {
        let submission = validate_submission(payload)?;
        let receipt = self
            .ledger
            .append(&submission.name, submission.rating)
            .await?;
        let below_average = receipt.below_average();
        info!(
            restaurant = %submission.name,
            rating = receipt.entry.rating,
            prior_average = ?receipt.prior_average,
            below_average,
            "rating submitted"
        );

        let details_created = self.details.ensure_exists(&submission).await?;

        let mut notified = false;
        if let (true, Some(prior_average)) = (below_average, receipt.prior_average) {
            if self.notification.enabled {
                let alert = BelowAverageAlert::new(
                    &self.notification,
                    submission.name.as_str(),
                    receipt.entry.rating,
                    prior_average,
                );
                match self.notifier.notify(&alert).await {
                    Ok(()) => notified = true,
                    Err(e) => warn!(restaurant = %submission.name, error = %e, "below-average alert failed"),
                }
            }
        }

        Ok(SubmissionOutcome {
            restaurant: submission.name,
            rating: receipt.entry.rating,
            prior_average: receipt.prior_average,
            below_average,
            details_created,
            notified,
        })
    }
}
