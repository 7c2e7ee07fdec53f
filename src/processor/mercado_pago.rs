use crate::processor::{ProcessorClient, ProcessorPayment};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

pub struct MercadoPagoClient {
    pub base_url: String,
    pub access_token: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl ProcessorClient for MercadoPagoClient {
    fn name(&self) -> &'static str {
        "mercado_pago"
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<ProcessorPayment> {
        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await
            .context("processor API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "processor API returned HTTP {} for payment {}: {}",
                status.as_u16(),
                payment_id,
                body.chars().take(200).collect::<String>()
            );
        }

        let v: serde_json::Value = resp.json().await.context("processor API returned invalid JSON")?;

        Ok(ProcessorPayment {
            id: field_as_string(&v, "id").unwrap_or_else(|| payment_id.to_string()),
            status: v
                .get("status")
                .and_then(|s| s.as_str())
                .unwrap_or_default()
                .to_string(),
            status_detail: field_as_string(&v, "status_detail"),
            external_reference: field_as_string(&v, "external_reference"),
            collection_id: field_as_string(&v, "collection_id"),
            payment_type: field_as_string(&v, "payment_type_id"),
            date_approved: field_as_datetime(&v, "date_approved"),
            date_created: field_as_datetime(&v, "date_created"),
        })
    }
}

// Processor ids arrive as JSON numbers or strings depending on the endpoint.
fn field_as_string(v: &serde_json::Value, field: &str) -> Option<String> {
    match v.get(field) {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn field_as_datetime(v: &serde_json::Value, field: &str) -> Option<DateTime<Utc>> {
    v.get(field)
        .and_then(|d| d.as_str())
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.with_timezone(&Utc))
}
