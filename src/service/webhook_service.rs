use crate::domain::payment::PaymentStatus;
use crate::processor::ProcessorClient;
use crate::store::{PaymentStore, PaymentUpdate};
use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

pub const PAYMENT_EVENT_TYPE: &str = "payment";

/// Event envelope delivered by the processor's webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    // Delivered as a number or a string depending on the event source.
    pub id: serde_json::Value,
}

#[derive(Debug, Clone)]
pub enum WebhookOutcome {
    /// Event kinds other than `payment` are acknowledged without side effects.
    Ignored { event_type: String },
    Updated {
        payment_id: String,
        status: PaymentStatus,
        matched: bool,
    },
}

#[derive(Clone)]
pub struct WebhookService {
    pub processor: Arc<dyn ProcessorClient>,
    pub store: Arc<dyn PaymentStore>,
}

impl WebhookService {
    /// Processes one event notification: fetch the authoritative payment
    /// from the processor, map its status, apply one full-overwrite update
    /// to the record matched by external reference. Redelivery of the same
    /// event re-applies the same overwrite, so the operation is idempotent.
    pub async fn handle_event(&self, event: WebhookEvent) -> Result<WebhookOutcome> {
        if event.event_type != PAYMENT_EVENT_TYPE {
            tracing::debug!(event_type = %event.event_type, "ignoring non-payment event");
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            });
        }

        let payment_id = normalize_id(&event.data.id);
        let payment = self.processor.fetch_payment(&payment_id).await?;
        let status = PaymentStatus::from_processor(&payment.status);
        let now = Utc::now();

        // Approval timestamp wins when present, then the processor's
        // creation timestamp, then the wall clock.
        let payment_date = payment
            .date_approved
            .or(payment.date_created)
            .unwrap_or(now);

        let notes = match status {
            PaymentStatus::Cancelled | PaymentStatus::Rejected => Some(format!(
                "Payment {}: {}",
                status.as_str(),
                payment
                    .status_detail
                    .as_deref()
                    .unwrap_or("no status detail")
            )),
            _ => None,
        };

        let update = PaymentUpdate {
            status,
            processor_payment_id: payment.id.clone(),
            processor_collection_id: payment.collection_id.clone(),
            processor_status_detail: payment.status_detail.clone(),
            processor_payment_type: payment.payment_type.clone(),
            payment_date,
            notes,
            updated_at: now,
        };

        let Some(external_reference) = payment.external_reference.as_deref() else {
            tracing::warn!(
                payment_id = %payment.id,
                "processor payment carries no external reference, nothing to update"
            );
            return Ok(WebhookOutcome::Updated {
                payment_id: payment.id,
                status,
                matched: false,
            });
        };

        let matched = self.store.apply_update(external_reference, &update).await?;
        if matched == 0 {
            tracing::warn!(
                payment_id = %payment.id,
                external_reference,
                "webhook update matched no record"
            );
        } else {
            tracing::info!(
                payment_id = %payment.id,
                external_reference,
                status = status.as_str(),
                "payment status updated"
            );
        }

        Ok(WebhookOutcome::Updated {
            payment_id: payment.id,
            status,
            matched: matched > 0,
        })
    }
}

fn normalize_id(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
