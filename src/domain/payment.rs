use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Internal payment status. `pending` is the only non-terminal state;
/// everything else is final from this system's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    /// Maps a processor-reported status string to the internal status.
    /// Unrecognized input maps to `Pending`: an unknown processor state must
    /// not be treated as final, and the mapping never fails.
    pub fn from_processor(processor_status: &str) -> Self {
        match processor_status {
            "approved" => PaymentStatus::Approved,
            "pending" => PaymentStatus::Pending,
            "rejected" => PaymentStatus::Rejected,
            "cancelled" => PaymentStatus::Cancelled,
            "refunded" => PaymentStatus::Refunded,
            _ => PaymentStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub external_reference: String,
    pub payer_email: String,
    pub amount_minor: i64,
    pub status: PaymentStatus,
    pub processor_payment_id: Option<String>,
    pub processor_collection_id: Option<String>,
    pub processor_status_detail: Option<String>,
    pub processor_payment_type: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a pending record starts with. Everything processor-related stays
/// absent until the first webhook delivery.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub id: Uuid,
    pub external_reference: String,
    pub payer_email: String,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl NewPayment {
    pub fn new(external_reference: &str, payer_email: &str, amount_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_reference: external_reference.to_string(),
            payer_email: payer_email.to_string(),
            amount_minor,
            created_at: Utc::now(),
        }
    }
}
