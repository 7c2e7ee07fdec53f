use crate::store::{ExpiredPayment, PaymentStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Pending payments untouched for this long are considered abandoned.
pub const PENDING_PAYMENT_TIMEOUT_MINUTES: i64 = 30;

pub const EXPIRY_NOTE: &str =
    "cancelled automatically: payment not completed within time limit";

#[derive(Clone)]
pub struct ExpiryService {
    pub store: Arc<dyn PaymentStore>,
}

impl ExpiryService {
    /// Cancels every pending record older than the timeout. The store does
    /// this as one conditional bulk update, so overlapping or repeated runs
    /// only ever act on records still pending at that moment.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredPayment>> {
        let cutoff = now - chrono::Duration::minutes(PENDING_PAYMENT_TIMEOUT_MINUTES);
        let cancelled = self.store.expire_pending_before(cutoff, EXPIRY_NOTE, now).await?;

        if cancelled.is_empty() {
            tracing::debug!("no expired pending payments");
        } else {
            tracing::info!(count = cancelled.len(), "cancelled expired pending payments");
        }

        Ok(cancelled)
    }
}
