use chrono::{TimeZone, Utc};
use std::sync::Arc;
use storefront_payments::domain::payment::{NewPayment, PaymentStatus};
use storefront_payments::processor::mock::MockProcessor;
use storefront_payments::processor::ProcessorPayment;
use storefront_payments::service::webhook_service::{WebhookEvent, WebhookEventData, WebhookOutcome, WebhookService};
use storefront_payments::store::mem::InMemoryStore;
use storefront_payments::store::PaymentStore;

fn setup() -> (Arc<MockProcessor>, Arc<InMemoryStore>, WebhookService) {
    let processor = Arc::new(MockProcessor::new());
    let store = Arc::new(InMemoryStore::new());
    let service = WebhookService {
        processor: processor.clone(),
        store: store.clone(),
    };
    (processor, store, service)
}

fn payment_event(event_type: &str, id: &str) -> WebhookEvent {
    WebhookEvent {
        event_type: event_type.to_string(),
        data: WebhookEventData {
            id: serde_json::Value::String(id.to_string()),
        },
    }
}

fn processor_payment(id: &str, status: &str, external_reference: &str) -> ProcessorPayment {
    ProcessorPayment {
        id: id.to_string(),
        status: status.to_string(),
        status_detail: None,
        external_reference: Some(external_reference.to_string()),
        collection_id: Some("coll-1".to_string()),
        payment_type: Some("credit_card".to_string()),
        date_approved: None,
        date_created: Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()),
    }
}

async fn insert_pending(store: &InMemoryStore, external_reference: &str) {
    store
        .insert_pending(&NewPayment::new(external_reference, "buyer@example.com", 4_990))
        .await
        .unwrap();
}

#[tokio::test]
async fn non_payment_events_are_acknowledged_without_side_effects() {
    let (_processor, store, service) = setup();
    insert_pending(&store, "order-1").await;

    let outcome = service
        .handle_event(payment_event("subscription", "77001"))
        .await
        .unwrap();

    assert!(matches!(outcome, WebhookOutcome::Ignored { .. }));
    let record = store.find_by_external_reference("order-1").await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Pending);
    assert!(record.processor_payment_id.is_none());
}

#[tokio::test]
async fn processor_fetch_failure_leaves_the_record_untouched() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-2").await;
    processor.set_fail_fetch(true);

    let result = service.handle_event(payment_event("payment", "77002")).await;

    assert!(result.is_err());
    let record = store.find_by_external_reference("order-2").await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Pending);
    assert!(record.processor_payment_id.is_none());
    assert!(record.payment_date.is_none());
}

#[tokio::test]
async fn approved_payment_takes_the_processor_approval_timestamp() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-3").await;

    let approved_at = Utc.with_ymd_and_hms(2026, 8, 20, 9, 30, 0).unwrap();
    let mut payment = processor_payment("77003", "approved", "order-3");
    payment.date_approved = Some(approved_at);
    processor.put(payment);

    let outcome = service.handle_event(payment_event("payment", "77003")).await.unwrap();

    match outcome {
        WebhookOutcome::Updated { payment_id, status, matched } => {
            assert_eq!(payment_id, "77003");
            assert_eq!(status, PaymentStatus::Approved);
            assert!(matched);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let record = store.find_by_external_reference("order-3").await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Approved);
    assert_eq!(record.payment_date, Some(approved_at));
    assert_eq!(record.processor_payment_id.as_deref(), Some("77003"));
    assert_eq!(record.processor_collection_id.as_deref(), Some("coll-1"));
    assert_eq!(record.processor_payment_type.as_deref(), Some("credit_card"));
    assert!(record.notes.is_none());
}

#[tokio::test]
async fn missing_approval_timestamp_falls_back_to_creation_timestamp() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-4").await;
    processor.put(processor_payment("77004", "approved", "order-4"));

    service.handle_event(payment_event("payment", "77004")).await.unwrap();

    let record = store.find_by_external_reference("order-4").await.unwrap().unwrap();
    assert_eq!(
        record.payment_date,
        Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn rejected_payment_records_an_explanatory_note() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-5").await;

    let mut payment = processor_payment("77005", "rejected", "order-5");
    payment.status_detail = Some("cc_rejected_insufficient_amount".to_string());
    processor.put(payment);

    service.handle_event(payment_event("payment", "77005")).await.unwrap();

    let record = store.find_by_external_reference("order-5").await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Rejected);
    let notes = record.notes.expect("rejection must set notes");
    assert!(notes.contains("rejected"));
    assert!(notes.contains("cc_rejected_insufficient_amount"));
}

#[tokio::test]
async fn cancelled_payment_without_detail_still_records_a_note() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-6").await;
    processor.put(processor_payment("77006", "cancelled", "order-6"));

    service.handle_event(payment_event("payment", "77006")).await.unwrap();

    let record = store.find_by_external_reference("order-6").await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Cancelled);
    assert!(record.notes.unwrap().contains("cancelled"));
}

#[tokio::test]
async fn redelivering_the_same_event_is_idempotent() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-7").await;

    let mut payment = processor_payment("77007", "approved", "order-7");
    payment.date_approved = Some(Utc.with_ymd_and_hms(2026, 8, 21, 15, 0, 0).unwrap());
    processor.put(payment);

    service.handle_event(payment_event("payment", "77007")).await.unwrap();
    let first = store.find_by_external_reference("order-7").await.unwrap().unwrap();

    service.handle_event(payment_event("payment", "77007")).await.unwrap();
    let second = store.find_by_external_reference("order-7").await.unwrap().unwrap();

    // updated_at refreshes on every mutation; every other field must match.
    assert_eq!(second.status, first.status);
    assert_eq!(second.processor_payment_id, first.processor_payment_id);
    assert_eq!(second.processor_collection_id, first.processor_collection_id);
    assert_eq!(second.processor_status_detail, first.processor_status_detail);
    assert_eq!(second.processor_payment_type, first.processor_payment_type);
    assert_eq!(second.payment_date, first.payment_date);
    assert_eq!(second.notes, first.notes);
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn terminal_record_is_never_reverted_to_pending() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-8").await;

    let mut approved = processor_payment("77008", "approved", "order-8");
    approved.date_approved = Some(Utc.with_ymd_and_hms(2026, 8, 22, 10, 0, 0).unwrap());
    processor.put(approved);
    service.handle_event(payment_event("payment", "77008")).await.unwrap();

    // A delayed redelivery reports the stale pending state.
    processor.put(processor_payment("77008", "pending", "order-8"));
    let outcome = service.handle_event(payment_event("payment", "77008")).await.unwrap();

    match outcome {
        WebhookOutcome::Updated { matched, .. } => assert!(!matched),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let record = store.find_by_external_reference("order-8").await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Approved);
}

#[tokio::test]
async fn refund_after_approval_is_applied() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-9").await;

    processor.put(processor_payment("77009", "approved", "order-9"));
    service.handle_event(payment_event("payment", "77009")).await.unwrap();

    processor.put(processor_payment("77009", "refunded", "order-9"));
    service.handle_event(payment_event("payment", "77009")).await.unwrap();

    let record = store.find_by_external_reference("order-9").await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn unknown_external_reference_is_a_logged_noop() {
    let (processor, store, service) = setup();
    processor.put(processor_payment("77010", "approved", "order-that-does-not-exist"));

    let outcome = service.handle_event(payment_event("payment", "77010")).await.unwrap();

    match outcome {
        WebhookOutcome::Updated { matched, .. } => assert!(!matched),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(store
        .find_by_external_reference("order-that-does-not-exist")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn numeric_event_ids_are_accepted() {
    let (processor, store, service) = setup();
    insert_pending(&store, "order-10").await;
    processor.put(processor_payment("77011", "approved", "order-10"));

    let event = WebhookEvent {
        event_type: "payment".to_string(),
        data: WebhookEventData {
            id: serde_json::json!(77011),
        },
    };
    service.handle_event(event).await.unwrap();

    let record = store.find_by_external_reference("order-10").await.unwrap().unwrap();
    assert_eq!(record.status, PaymentStatus::Approved);
}
