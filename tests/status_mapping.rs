use storefront_payments::domain::payment::PaymentStatus;

#[test]
fn recognized_processor_statuses_map_to_matching_internal_status() {
    assert_eq!(PaymentStatus::from_processor("approved"), PaymentStatus::Approved);
    assert_eq!(PaymentStatus::from_processor("pending"), PaymentStatus::Pending);
    assert_eq!(PaymentStatus::from_processor("rejected"), PaymentStatus::Rejected);
    assert_eq!(PaymentStatus::from_processor("cancelled"), PaymentStatus::Cancelled);
    assert_eq!(PaymentStatus::from_processor("refunded"), PaymentStatus::Refunded);
}

#[test]
fn unrecognized_processor_statuses_fall_back_to_pending() {
    for s in ["in_process", "authorized", "charged_back", "APPROVED", "", "??"] {
        assert_eq!(PaymentStatus::from_processor(s), PaymentStatus::Pending, "input: {s:?}");
    }
}

#[test]
fn pending_is_the_only_non_terminal_status() {
    assert!(!PaymentStatus::Pending.is_terminal());
    assert!(PaymentStatus::Approved.is_terminal());
    assert!(PaymentStatus::Rejected.is_terminal());
    assert!(PaymentStatus::Cancelled.is_terminal());
    assert!(PaymentStatus::Refunded.is_terminal());
}

#[test]
fn status_round_trips_through_its_string_form() {
    for status in [
        PaymentStatus::Pending,
        PaymentStatus::Approved,
        PaymentStatus::Rejected,
        PaymentStatus::Cancelled,
        PaymentStatus::Refunded,
    ] {
        assert_eq!(PaymentStatus::from_processor(status.as_str()), status);
    }
}
