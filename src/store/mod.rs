use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub mod mem;
pub mod postgres;

/// Full overwrite of the processor-owned block of a payment record. Applying
/// the same update twice leaves the record unchanged after the second write.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub status: PaymentStatus,
    pub processor_payment_id: String,
    pub processor_collection_id: Option<String>,
    pub processor_status_detail: Option<String>,
    pub processor_payment_type: Option<String>,
    pub payment_date: DateTime<Utc>,
    /// `None` leaves the stored notes untouched.
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Audit summary of one record cancelled by the expiry sweeper.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiredPayment {
    pub id: Uuid,
    pub external_reference: String,
    pub payer_email: String,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStat {
    pub month: String,
    pub approved_count: i64,
    pub approved_amount_minor: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentStats {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub approved_amount_minor: i64,
    pub monthly: Vec<MonthlyStat>,
}

#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn insert_pending(&self, payment: &NewPayment) -> Result<()>;

    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<PaymentRecord>>;

    /// Applies the update to the record matched by external reference and
    /// returns the number of records matched. A terminal record is never
    /// reverted to `pending`; such an update matches nothing.
    async fn apply_update(&self, external_reference: &str, update: &PaymentUpdate) -> Result<u64>;

    /// Cancels every `pending` record created before `cutoff` in a single
    /// conditional bulk update and returns the audit summaries.
    async fn expire_pending_before(
        &self,
        cutoff: DateTime<Utc>,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExpiredPayment>>;

    async fn stats(&self) -> Result<PaymentStats>;
}
