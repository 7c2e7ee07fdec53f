use crate::processor::{ProcessorClient, ProcessorPayment};
use anyhow::{bail, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Scripted processor used in tests and local development: payments are
/// registered up front and a flag can force every fetch to fail.
#[derive(Default)]
pub struct MockProcessor {
    payments: Mutex<HashMap<String, ProcessorPayment>>,
    fail_fetch: AtomicBool,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, payment: ProcessorPayment) {
        self.payments
            .lock()
            .unwrap()
            .insert(payment.id.clone(), payment);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ProcessorClient for MockProcessor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<ProcessorPayment> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            bail!("mock processor unavailable");
        }

        let payments = self.payments.lock().unwrap();
        match payments.get(payment_id) {
            Some(payment) => Ok(payment.clone()),
            None => bail!("mock processor has no payment {}", payment_id),
        }
    }
}
