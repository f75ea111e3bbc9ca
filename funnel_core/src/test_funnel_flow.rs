//! Scenario tests for the funnel state machine.

use crate::errors::FunnelError;
use crate::state::FunnelState;
use crate::types::{FunnelStep, PaymentStatus, ServiceType};
use crate::validate::DetailsInput;

fn valid_details() -> DetailsInput {
    DetailsInput {
        name: "Asha Verma".to_string(),
        location: "Mumbai".to_string(),
        country_code: "+91".to_string(),
        whatsapp_number: "9876543210".to_string(),
        whatsapp_consent: true,
    }
}

/// A state that has completed step 1 for the given service.
fn state_with_details(service: ServiceType) -> FunnelState {
    let mut state = FunnelState::new();
    state.open_form(Some(service));
    state.set_details(valid_details()).unwrap();
    state
}

/// A state that has submitted successfully and holds a lead id.
fn submitted_state(service: ServiceType) -> FunnelState {
    let mut state = state_with_details(service);
    state.next_step();
    state.begin_submission().unwrap();
    state.submission_succeeded("abc123".to_string(), Some("LN-0001".to_string()));
    state
}

// ─────────────────────────────────────────────────────────
// Step clamping
// ─────────────────────────────────────────────────────────

#[test]
fn step_stays_in_range_for_any_next_prev_sequence() {
    let mut state = FunnelState::new();
    // A pseudo-random walk of next/prev calls; the step must never
    // leave the wizard's range.
    for i in 0..200u32 {
        if (i * 7 + 3) % 5 < 3 {
            state.next_step();
        } else {
            state.prev_step();
        }
        assert!(state.step >= FunnelStep::FIRST && state.step <= FunnelStep::LAST);
        assert!((1..=3).contains(&state.step.index()));
    }
}

// ─────────────────────────────────────────────────────────
// open / close / reset
// ─────────────────────────────────────────────────────────

#[test]
fn reopen_with_same_service_jumps_to_outcome() {
    let mut state = FunnelState::new();
    state.open_form(Some(ServiceType::Consultation));
    assert_eq!(state.step, FunnelStep::Details);

    state.close_form();
    state.open_form(Some(ServiceType::Consultation));
    assert_eq!(state.step, FunnelStep::Outcome);
    assert!(state.is_open);
}

#[test]
fn reopen_with_different_service_resets_to_details() {
    let mut state = FunnelState::new();
    state.open_form(Some(ServiceType::Consultation));
    state.next_step();

    state.open_form(Some(ServiceType::LegalNotice));
    assert_eq!(state.step, FunnelStep::Details);
    assert_eq!(state.form.service, Some(ServiceType::LegalNotice));
}

#[test]
fn open_form_always_clears_payment_status() {
    let mut state = submitted_state(ServiceType::Consultation);
    state.begin_payment().unwrap();
    state.payment_failed("declined").unwrap();
    assert_eq!(state.payment_status, Some(PaymentStatus::Failed));

    state.open_form(Some(ServiceType::Consultation));
    assert_eq!(state.payment_status, None);
}

#[test]
fn close_form_preserves_everything_but_visibility() {
    let mut state = submitted_state(ServiceType::LegalNotice);
    state.begin_payment().unwrap();
    let step_before = state.step;
    let form_before = state.form.clone();

    state.close_form();
    assert!(!state.is_open);
    assert_eq!(state.step, step_before);
    assert_eq!(state.form, form_before);
    assert_eq!(state.payment_status, Some(PaymentStatus::Pending));
}

#[test]
fn reset_form_clears_everything() {
    let mut state = submitted_state(ServiceType::LegalNotice);
    state.reset_form();
    assert_eq!(state, FunnelState::new());
}

// ─────────────────────────────────────────────────────────
// Submission gate
// ─────────────────────────────────────────────────────────

#[test]
fn submission_rejected_when_required_field_missing() {
    let mut state = FunnelState::new();
    state.open_form(Some(ServiceType::Consultation));
    // No details entered.
    let err = state.begin_submission().unwrap_err();
    assert!(matches!(err, FunnelError::Validation(_)));
    assert!(state.submission_error.is_some());
    assert!(!state.is_submitting);
}

#[test]
fn submission_rejected_without_service() {
    let mut state = FunnelState::new();
    state.open_form(None);
    state.set_details(valid_details()).unwrap();
    let err = state.begin_submission().unwrap_err();
    assert!(matches!(err, FunnelError::Validation(_)));
    assert_eq!(
        state.submission_error.as_deref(),
        Some("Missing required field: service")
    );
}

#[test]
fn submission_rejected_while_in_flight() {
    let mut state = state_with_details(ServiceType::Consultation);
    state.begin_submission().unwrap();
    assert_eq!(
        state.begin_submission().unwrap_err(),
        FunnelError::SubmissionInProgress
    );
}

#[test]
fn successful_submission_assigns_lead_id_and_advances_one_step() {
    let mut state = state_with_details(ServiceType::Consultation);
    state.next_step();
    let step_before = state.step;

    state.begin_submission().unwrap();
    state.submission_succeeded("abc123".to_string(), None);

    assert_eq!(state.form.lead_id.as_deref(), Some("abc123"));
    assert!(state.form.submission_success);
    assert!(!state.is_submitting);
    assert_eq!(state.step, step_before.next());
}

#[test]
fn failed_submission_stays_on_step_with_error() {
    let mut state = state_with_details(ServiceType::Consultation);
    state.next_step();
    let step_before = state.step;

    state.begin_submission().unwrap();
    state.submission_failed("server unavailable");

    assert_eq!(state.step, step_before);
    assert_eq!(state.submission_error.as_deref(), Some("server unavailable"));
    assert!(state.form.lead_id.is_none());
    // A new attempt clears the stale error.
    state.begin_submission().unwrap();
    assert!(state.submission_error.is_none());
}

// ─────────────────────────────────────────────────────────
// Payment lifecycle
// ─────────────────────────────────────────────────────────

#[test]
fn payment_without_lead_id_fails_fast() {
    let mut state = state_with_details(ServiceType::Consultation);
    let err = state.begin_payment().unwrap_err();
    assert!(matches!(err, FunnelError::PaymentPrecondition(_)));
    assert!(state.payment_error.is_some());
    assert_eq!(state.payment_status, None);
}

#[test]
fn payment_success_is_terminal_for_the_session() {
    let mut state = submitted_state(ServiceType::Consultation);
    state.begin_payment().unwrap();
    state.payment_succeeded("pay_1".to_string()).unwrap();

    assert_eq!(state.payment_status, Some(PaymentStatus::Success));
    assert_eq!(state.form.payment_id.as_deref(), Some("pay_1"));
    assert!(state.form.payment_success);

    let err = state.begin_payment().unwrap_err();
    assert!(matches!(err, FunnelError::InvalidTransition(_)));
}

#[test]
fn failed_payment_can_be_retried() {
    let mut state = submitted_state(ServiceType::Consultation);
    state.begin_payment().unwrap();
    state.payment_failed("insufficient_funds").unwrap();
    assert_eq!(state.payment_status, Some(PaymentStatus::Failed));
    assert_eq!(state.payment_error.as_deref(), Some("insufficient_funds"));

    state.begin_payment().unwrap();
    assert_eq!(state.payment_status, Some(PaymentStatus::Pending));
    assert!(state.payment_error.is_none());
}

#[test]
fn outcome_cannot_be_recorded_without_a_pending_payment() {
    let mut state = submitted_state(ServiceType::Consultation);
    assert!(state.payment_succeeded("pay_1".to_string()).is_err());
    assert!(state.payment_failed("nope").is_err());
}

// ─────────────────────────────────────────────────────────
// Resume after reload
// ─────────────────────────────────────────────────────────

#[test]
fn restore_pending_rehydrates_minimal_fields() {
    use crate::persist::{PersistedPaymentRecord, ResumableStatus};
    use chrono::Utc;

    let record = PersistedPaymentRecord {
        lead_id: "abc123".to_string(),
        service: ServiceType::LegalNotice,
        name: "Asha Verma".to_string(),
        whatsapp_number: Some("9876543210".to_string()),
        status: ResumableStatus::Failed,
        created_at: Utc::now(),
    };

    let mut state = FunnelState::new();
    state.restore_pending(&record);

    assert_eq!(state.form.lead_id.as_deref(), Some("abc123"));
    assert_eq!(state.form.service, Some(ServiceType::LegalNotice));
    assert_eq!(state.form.name.as_deref(), Some("Asha Verma"));
    assert_eq!(state.payment_status, Some(PaymentStatus::Failed));
    // Restored failed payments are retryable.
    assert!(state.begin_payment().is_ok());
}
