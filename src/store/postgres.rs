use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus};
use crate::store::{ExpiredPayment, MonthlyStat, PaymentStats, PaymentStore, PaymentUpdate, StatusCount};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl PaymentStore for PaymentsRepo {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_pending(&self, payment: &NewPayment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, external_reference, payer_email, amount_minor, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $5)
            "#,
        )
        .bind(payment.id)
        .bind(&payment.external_reference)
        .bind(&payment.payer_email)
        .bind(payment.amount_minor)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_external_reference(
        &self,
        external_reference: &str,
    ) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, external_reference, payer_email, amount_minor, status,
                   processor_payment_id, processor_collection_id, processor_status_detail,
                   processor_payment_type, payment_date, notes, created_at, updated_at
            FROM payments
            WHERE external_reference = $1
            "#,
        )
        .bind(external_reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PaymentRecord {
            id: r.get("id"),
            external_reference: r.get("external_reference"),
            payer_email: r.get("payer_email"),
            amount_minor: r.get("amount_minor"),
            status: PaymentStatus::from_processor(r.get::<String, _>("status").as_str()),
            processor_payment_id: r.get("processor_payment_id"),
            processor_collection_id: r.get("processor_collection_id"),
            processor_status_detail: r.get("processor_status_detail"),
            processor_payment_type: r.get("processor_payment_type"),
            payment_date: r.get("payment_date"),
            notes: r.get("notes"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    async fn apply_update(&self, external_reference: &str, update: &PaymentUpdate) -> Result<u64> {
        // The status guard keeps a delayed redelivery from reverting a
        // terminal record to pending.
        let res = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2,
                processor_payment_id = $3,
                processor_collection_id = $4,
                processor_status_detail = $5,
                processor_payment_type = $6,
                payment_date = $7,
                notes = COALESCE($8, notes),
                updated_at = $9
            WHERE external_reference = $1
              AND NOT (status <> 'pending' AND $2 = 'pending')
            "#,
        )
        .bind(external_reference)
        .bind(update.status.as_str())
        .bind(&update.processor_payment_id)
        .bind(&update.processor_collection_id)
        .bind(&update.processor_status_detail)
        .bind(&update.processor_payment_type)
        .bind(update.payment_date)
        .bind(&update.notes)
        .bind(update.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }

    async fn expire_pending_before(
        &self,
        cutoff: DateTime<Utc>,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExpiredPayment>> {
        let rows = sqlx::query(
            r#"
            UPDATE payments
            SET status = 'cancelled', notes = $2, updated_at = $3
            WHERE status = 'pending' AND created_at < $1
            RETURNING id, external_reference, payer_email, amount_minor, created_at
            "#,
        )
        .bind(cutoff)
        .bind(notes)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ExpiredPayment {
                id: row.get("id"),
                external_reference: row.get("external_reference"),
                payer_email: row.get("payer_email"),
                amount_minor: row.get("amount_minor"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn stats(&self) -> Result<PaymentStats> {
        let status_rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM payments GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        let by_status: Vec<StatusCount> = status_rows
            .into_iter()
            .map(|row| StatusCount {
                status: row.get("status"),
                count: row.get("count"),
            })
            .collect();
        let total = by_status.iter().map(|s| s.count).sum();

        let approved_amount_minor: i64 = sqlx::query(
            "SELECT COALESCE(SUM(amount_minor), 0)::BIGINT AS amount FROM payments WHERE status = 'approved'",
        )
        .fetch_one(&self.pool)
        .await?
        .get("amount");

        let monthly_rows = sqlx::query(
            r#"
            SELECT to_char(date_trunc('month', payment_date), 'YYYY-MM') AS month,
                   COUNT(*) AS approved_count,
                   COALESCE(SUM(amount_minor), 0)::BIGINT AS amount
            FROM payments
            WHERE status = 'approved' AND payment_date IS NOT NULL
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let monthly = monthly_rows
            .into_iter()
            .map(|row| MonthlyStat {
                month: row.get("month"),
                approved_count: row.get("approved_count"),
                approved_amount_minor: row.get("amount"),
            })
            .collect();

        Ok(PaymentStats {
            total,
            by_status,
            approved_amount_minor,
            monthly,
        })
    }
}
