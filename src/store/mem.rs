use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus};
use crate::store::{ExpiredPayment, MonthlyStat, PaymentStats, PaymentStore, PaymentUpdate, StatusCount};
use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// In-memory store with the same update semantics as the Postgres
/// implementation, used by tests. Records are keyed by external reference.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<String, PaymentRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PaymentStore for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_pending(&self, payment: &NewPayment) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&payment.external_reference) {
            bail!("duplicate external reference {}", payment.external_reference);
        }

        records.insert(
            payment.external_reference.clone(),
            PaymentRecord {
                id: payment.id,
                external_reference: payment.external_reference.clone(),
                payer_email: payment.payer_email.clone(),
                amount_minor: payment.amount_minor,
                status: PaymentStatus::Pending,
                processor_payment_id: None,
                processor_collection_id: None,
                processor_status_detail: None,
                processor_payment_type: None,
                payment_date: None,
                notes: None,
                created_at: payment.created_at,
                updated_at: payment.created_at,
            },
        );

        Ok(())
    }

    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<PaymentRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(external_reference).cloned())
    }

    async fn apply_update(&self, external_reference: &str, update: &PaymentUpdate) -> Result<u64> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(external_reference) else {
            return Ok(0);
        };

        // Same guard as the SQL version: no reverting terminal records.
        if record.status.is_terminal() && update.status == PaymentStatus::Pending {
            return Ok(0);
        }

        record.status = update.status;
        record.processor_payment_id = Some(update.processor_payment_id.clone());
        record.processor_collection_id = update.processor_collection_id.clone();
        record.processor_status_detail = update.processor_status_detail.clone();
        record.processor_payment_type = update.processor_payment_type.clone();
        record.payment_date = Some(update.payment_date);
        if let Some(notes) = &update.notes {
            record.notes = Some(notes.clone());
        }
        record.updated_at = update.updated_at;

        Ok(1)
    }

    async fn expire_pending_before(
        &self,
        cutoff: DateTime<Utc>,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExpiredPayment>> {
        let mut records = self.records.lock().unwrap();
        let mut cancelled = Vec::new();

        for record in records.values_mut() {
            if record.status == PaymentStatus::Pending && record.created_at < cutoff {
                record.status = PaymentStatus::Cancelled;
                record.notes = Some(notes.to_string());
                record.updated_at = now;
                cancelled.push(ExpiredPayment {
                    id: record.id,
                    external_reference: record.external_reference.clone(),
                    payer_email: record.payer_email.clone(),
                    amount_minor: record.amount_minor,
                    created_at: record.created_at,
                });
            }
        }

        cancelled.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(cancelled)
    }

    async fn stats(&self) -> Result<PaymentStats> {
        let records = self.records.lock().unwrap();

        let mut counts: BTreeMap<&'static str, i64> = BTreeMap::new();
        let mut approved_amount_minor = 0i64;
        let mut monthly: BTreeMap<String, (i64, i64)> = BTreeMap::new();

        for record in records.values() {
            *counts.entry(record.status.as_str()).or_insert(0) += 1;

            if record.status == PaymentStatus::Approved {
                approved_amount_minor += record.amount_minor;
                if let Some(date) = record.payment_date {
                    let month = format!("{:04}-{:02}", date.year(), date.month());
                    let entry = monthly.entry(month).or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 += record.amount_minor;
                }
            }
        }

        Ok(PaymentStats {
            total: records.len() as i64,
            by_status: counts
                .into_iter()
                .map(|(status, count)| StatusCount {
                    status: status.to_string(),
                    count,
                })
                .collect(),
            approved_amount_minor,
            monthly: monthly
                .into_iter()
                .map(|(month, (approved_count, amount))| MonthlyStat {
                    month,
                    approved_count,
                    approved_amount_minor: amount,
                })
                .collect(),
        })
    }
}
