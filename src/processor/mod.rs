use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod mercado_pago;
pub mod mock;

/// Authoritative payment object as reported by the processor's query API,
/// normalized to the handful of fields reconciliation cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorPayment {
    pub id: String,
    pub status: String,
    pub status_detail: Option<String>,
    pub external_reference: Option<String>,
    pub collection_id: Option<String>,
    pub payment_type: Option<String>,
    pub date_approved: Option<DateTime<Utc>>,
    pub date_created: Option<DateTime<Utc>>,
}

#[async_trait::async_trait]
pub trait ProcessorClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetches the current state of one payment from the processor. Any
    /// transport or non-2xx failure is an error; the caller must not touch
    /// the store in that case.
    async fn fetch_payment(&self, payment_id: &str) -> Result<ProcessorPayment>;
}
