//! End-to-end orchestrator scenarios against a real (temp-file) SQLite
//! database and mocked gateways.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use sqlx::SqlitePool;
use uuid::Uuid;

use funnel_core::persist::{PersistedPaymentRecord, ResumableStatus};
use funnel_core::validate::DetailsInput;
use funnel_core::{FunnelStep, PaymentStatus, ServiceType};

use crate::analytics::AnalyticsEmitter;
use crate::db;
use crate::errors::{Result, ServerError};
use crate::gateway::{
    CheckoutOutcome, LeadSubmission, Order, OrderRequest, PaymentApi, SubmissionApi,
    SubmissionReceipt, VerifyRequest,
};
use crate::orchestrator::Orchestrator;
use crate::sessions::SessionStore;

// ─────────────────────────────────────────────────────────
// Test doubles
// ─────────────────────────────────────────────────────────

#[derive(Default)]
struct MockSubmissions {
    calls: AtomicUsize,
    fail_with: Option<&'static str>,
}

#[async_trait]
impl SubmissionApi for MockSubmissions {
    async fn submit(&self, _payload: &LeadSubmission) -> Result<SubmissionReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(message) => Err(ServerError::Gateway(message.to_string())),
            None => Ok(SubmissionReceipt {
                lead_id: "lead_123".to_string(),
                custom_id: Some("VK-0042".to_string()),
            }),
        }
    }
}

#[derive(Default)]
struct MockPayments {
    orders: AtomicUsize,
    verifies: AtomicUsize,
    order_fails: bool,
    verify_fails_with: Option<&'static str>,
}

#[async_trait]
impl PaymentApi for MockPayments {
    async fn create_order(&self, _request: &OrderRequest) -> Result<Order> {
        self.orders.fetch_add(1, Ordering::SeqCst);
        if self.order_fails {
            return Err(ServerError::Gateway("order backend down".to_string()));
        }
        Ok(Order {
            id: "order_1".to_string(),
        })
    }

    async fn verify(&self, _request: &VerifyRequest) -> Result<()> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        match self.verify_fails_with {
            Some(reason) => Err(ServerError::Gateway(reason.to_string())),
            None => Ok(()),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Harness
// ─────────────────────────────────────────────────────────

/// Fresh orchestrator over a temp-file database.  `sqlite::memory:` gives
/// every pooled connection its own database, so a real file it is.
async fn setup() -> (Orchestrator, SqlitePool) {
    let path = std::env::temp_dir().join(format!("funnel-test-{}.db", Uuid::new_v4()));
    let pool = db::init_pool(path.to_str().unwrap()).await.unwrap();
    let orchestrator = Orchestrator {
        sessions: SessionStore::new(),
        pool: pool.clone(),
        analytics: AnalyticsEmitter::new(Client::new(), None),
    };
    (orchestrator, pool)
}

fn valid_details() -> DetailsInput {
    DetailsInput {
        name: "Asha Verma".to_string(),
        location: "mumbai".to_string(),
        country_code: "+91".to_string(),
        whatsapp_number: "9876543210".to_string(),
        whatsapp_consent: true,
    }
}

/// Session with service + details filled in, ready to submit.
async fn ready_session(orchestrator: &Orchestrator) -> Uuid {
    let id = orchestrator.sessions.create().await;
    orchestrator
        .sessions
        .with_state(id, |s| {
            s.open_form(Some(ServiceType::LegalNotice));
            s.set_details(valid_details())
        })
        .await
        .unwrap()
        .0
        .unwrap();
    id
}

/// Session taken all the way through a successful submission.
async fn submitted_session(orchestrator: &Orchestrator) -> Uuid {
    let id = ready_session(orchestrator).await;
    let submissions = MockSubmissions::default();
    let state = orchestrator.submit_lead(id, &submissions).await.unwrap();
    assert_eq!(state.form.lead_id.as_deref(), Some("lead_123"));
    id
}

async fn lead_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

// ─────────────────────────────────────────────────────────
// Submission
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn incomplete_submission_never_reaches_the_gateway() {
    let (orchestrator, pool) = setup().await;
    let id = orchestrator.sessions.create().await;

    let submissions = MockSubmissions::default();
    let state = orchestrator.submit_lead(id, &submissions).await.unwrap();

    assert_eq!(submissions.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        state.submission_error.as_deref(),
        Some("Missing required field: service")
    );
    assert!(!state.is_submitting);
    assert_eq!(lead_count(&pool).await, 0);
}

#[tokio::test]
async fn successful_submission_advances_and_mirrors_the_lead() {
    let (orchestrator, pool) = setup().await;
    let id = ready_session(&orchestrator).await;

    let submissions = MockSubmissions::default();
    let state = orchestrator.submit_lead(id, &submissions).await.unwrap();

    assert_eq!(submissions.calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.form.lead_id.as_deref(), Some("lead_123"));
    assert_eq!(state.form.custom_id.as_deref(), Some("VK-0042"));
    assert!(state.form.submission_success);
    assert!(state.submission_error.is_none());
    assert!(!state.is_submitting);
    // Advanced exactly one step past the details form.
    assert_eq!(state.step, FunnelStep::Payment);
    assert_eq!(lead_count(&pool).await, 1);
}

#[tokio::test]
async fn gateway_rejection_keeps_the_lead_on_the_same_step() {
    let (orchestrator, pool) = setup().await;
    let id = ready_session(&orchestrator).await;

    let submissions = MockSubmissions {
        fail_with: Some("Server busy, try again"),
        ..Default::default()
    };
    let state = orchestrator.submit_lead(id, &submissions).await.unwrap();

    assert_eq!(
        state.submission_error.as_deref(),
        Some("Server busy, try again")
    );
    assert!(state.form.lead_id.is_none());
    assert!(!state.is_submitting);
    assert_eq!(state.step, FunnelStep::Details);
    assert_eq!(lead_count(&pool).await, 0);
}

#[tokio::test]
async fn mirror_write_failure_does_not_fail_an_accepted_submission() {
    let (orchestrator, pool) = setup().await;
    let id = ready_session(&orchestrator).await;

    // Break the local mirror; the gateway still accepts the lead.
    sqlx::query("DROP TABLE leads").execute(&pool).await.unwrap();

    let submissions = MockSubmissions::default();
    let state = orchestrator.submit_lead(id, &submissions).await.unwrap();

    assert_eq!(state.form.lead_id.as_deref(), Some("lead_123"));
    assert!(state.form.submission_success);
    assert!(state.submission_error.is_none());
    assert_eq!(state.step, FunnelStep::Payment);
}

#[tokio::test]
async fn resubmission_with_the_same_lead_id_stays_idempotent() {
    let (orchestrator, pool) = setup().await;
    let id = ready_session(&orchestrator).await;

    let submissions = MockSubmissions::default();
    orchestrator.submit_lead(id, &submissions).await.unwrap();
    // Second attempt returns the same lead id; the mirror must not grow.
    orchestrator.submit_lead(id, &submissions).await.unwrap();

    assert_eq!(lead_count(&pool).await, 1);
}

// ─────────────────────────────────────────────────────────
// Payment
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn payment_before_submission_touches_nothing() {
    let (orchestrator, pool) = setup().await;
    let id = ready_session(&orchestrator).await;

    let payments = MockPayments::default();
    let (params, state) = orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();

    assert!(params.is_none());
    assert_eq!(payments.orders.load(Ordering::SeqCst), 0);
    assert_eq!(
        state.payment_error.as_deref(),
        Some("lead id not assigned yet")
    );
    assert!(state.payment_status.is_none());
    assert!(db::load_payment_record(&pool, id, Utc::now())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn starting_payment_persists_the_record_and_closes_the_modal() {
    let (orchestrator, pool) = setup().await;
    let id = submitted_session(&orchestrator).await;

    let payments = MockPayments::default();
    let (params, state) = orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();

    let params = params.unwrap();
    assert_eq!(params.key_id, "rzp_test_key");
    assert_eq!(params.order_id.as_deref(), Some("order_1"));
    assert_eq!(params.amount_minor, 99_900);
    assert_eq!(params.currency, "INR");
    assert_eq!(params.prefill_name, "Asha Verma");

    assert!(!state.is_open);
    assert_eq!(state.payment_status, Some(PaymentStatus::Pending));

    let record = db::load_payment_record(&pool, id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.lead_id, "lead_123");
    assert_eq!(record.status, ResumableStatus::Pending);
}

#[tokio::test]
async fn order_creation_failure_is_not_fatal() {
    let (orchestrator, pool) = setup().await;
    let id = submitted_session(&orchestrator).await;

    let payments = MockPayments {
        order_fails: true,
        ..Default::default()
    };
    let (params, state) = orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();

    // The overlay creates its own order when none is supplied.
    let params = params.unwrap();
    assert!(params.order_id.is_none());
    assert_eq!(state.payment_status, Some(PaymentStatus::Pending));
    assert!(db::load_payment_record(&pool, id, Utc::now())
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn verified_payment_reopens_at_the_outcome_step() {
    let (orchestrator, pool) = setup().await;
    let id = submitted_session(&orchestrator).await;

    let payments = MockPayments::default();
    orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();

    let outcome = CheckoutOutcome::Completed {
        payment_id: "pay_9".to_string(),
        order_id: Some("order_1".to_string()),
        signature: Some("sig".to_string()),
    };
    let state = orchestrator
        .reconcile_checkout(id, outcome, &payments)
        .await
        .unwrap();

    assert_eq!(payments.verifies.load(Ordering::SeqCst), 1);
    assert_eq!(state.payment_status, Some(PaymentStatus::Success));
    assert_eq!(state.form.payment_id.as_deref(), Some("pay_9"));
    assert!(state.is_open);
    assert_eq!(state.step, FunnelStep::Outcome);
    assert!(!state.is_processing_payment);
    // Nothing left to resume.
    assert!(db::load_payment_record(&pool, id, Utc::now())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn failed_verification_marks_the_attempt_failed() {
    let (orchestrator, pool) = setup().await;
    let id = submitted_session(&orchestrator).await;

    let payments = MockPayments {
        verify_fails_with: Some("signature_mismatch"),
        ..Default::default()
    };
    orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();

    let outcome = CheckoutOutcome::Completed {
        payment_id: "pay_9".to_string(),
        order_id: Some("order_1".to_string()),
        signature: Some("bad".to_string()),
    };
    let state = orchestrator
        .reconcile_checkout(id, outcome, &payments)
        .await
        .unwrap();

    assert_eq!(state.payment_status, Some(PaymentStatus::Failed));
    // The upstream reason verbatim, without an error-variant prefix.
    assert_eq!(state.payment_error.as_deref(), Some("signature_mismatch"));
    // The modal stays closed on failure; only success reopens it.
    assert!(!state.is_open);

    // The record survives (as failed) so the banner can offer a retry.
    let record = db::load_payment_record(&pool, id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, ResumableStatus::Failed);
}

#[tokio::test]
async fn declined_checkout_keeps_a_failed_record() {
    let (orchestrator, pool) = setup().await;
    let id = submitted_session(&orchestrator).await;

    let payments = MockPayments::default();
    orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();

    let state = orchestrator
        .reconcile_checkout(
            id,
            CheckoutOutcome::Failed {
                reason: "insufficient_funds".to_string(),
            },
            &payments,
        )
        .await
        .unwrap();

    assert_eq!(payments.verifies.load(Ordering::SeqCst), 0);
    assert_eq!(state.payment_status, Some(PaymentStatus::Failed));
    assert_eq!(state.payment_error.as_deref(), Some("insufficient_funds"));

    let record = db::load_payment_record(&pool, id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, ResumableStatus::Failed);

    // A failed attempt is retryable.
    let (params, _) = orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();
    assert!(params.is_some());
}

#[tokio::test]
async fn dismissed_overlay_leaves_the_attempt_pending() {
    let (orchestrator, pool) = setup().await;
    let id = submitted_session(&orchestrator).await;

    let payments = MockPayments::default();
    orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();

    let state = orchestrator
        .reconcile_checkout(id, CheckoutOutcome::Dismissed, &payments)
        .await
        .unwrap();

    assert!(!state.is_processing_payment);
    assert_eq!(state.payment_status, Some(PaymentStatus::Pending));
    assert!(state.payment_error.is_none());

    let record = db::load_payment_record(&pool, id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, ResumableStatus::Pending);
}

// ─────────────────────────────────────────────────────────
// Resume after reload
// ─────────────────────────────────────────────────────────

#[tokio::test]
async fn nothing_to_resume_without_a_record() {
    let (orchestrator, _pool) = setup().await;
    let id = orchestrator.sessions.create().await;

    let (resumed, banner_eligible, _) = orchestrator.resume_pending(id).await.unwrap();
    assert!(!resumed);
    assert!(!banner_eligible);
}

#[tokio::test]
async fn unexpired_record_is_restored_into_the_session() {
    let (orchestrator, pool) = setup().await;
    let id = orchestrator.sessions.create().await;

    // A record left behind by a reload mid-payment.
    let record = PersistedPaymentRecord::pending(
        "lead_77".to_string(),
        ServiceType::Consultation,
        "Ravi Nair".to_string(),
        Some("9123456780".to_string()),
        Utc::now() - Duration::hours(1),
    );
    db::save_payment_record(&pool, id, &record).await.unwrap();

    let (resumed, banner_eligible, state) = orchestrator.resume_pending(id).await.unwrap();

    assert!(resumed);
    assert!(banner_eligible);
    assert_eq!(state.form.lead_id.as_deref(), Some("lead_77"));
    assert_eq!(state.form.service, Some(ServiceType::Consultation));
    assert_eq!(state.payment_status, Some(PaymentStatus::Pending));

    // A restored (stale) pending attempt may be retried.
    let payments = MockPayments::default();
    let (params, _) = orchestrator
        .start_payment(id, &payments, "rzp_test_key")
        .await
        .unwrap();
    assert!(params.is_some());
}

#[tokio::test]
async fn expired_record_is_discarded_on_resume() {
    let (orchestrator, pool) = setup().await;
    let id = orchestrator.sessions.create().await;

    let record = PersistedPaymentRecord::pending(
        "lead_77".to_string(),
        ServiceType::Consultation,
        "Ravi Nair".to_string(),
        None,
        Utc::now() - Duration::hours(13),
    );
    db::save_payment_record(&pool, id, &record).await.unwrap();

    let (resumed, _, state) = orchestrator.resume_pending(id).await.unwrap();
    assert!(!resumed);
    assert!(state.payment_status.is_none());
    // The expired row was deleted on read.
    assert!(db::load_payment_record(&pool, id, Utc::now())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn banner_suppressed_after_two_dismissals() {
    let (orchestrator, pool) = setup().await;
    let id = orchestrator.sessions.create().await;

    let record = PersistedPaymentRecord::pending(
        "lead_77".to_string(),
        ServiceType::LegalNotice,
        "Ravi Nair".to_string(),
        None,
        Utc::now(),
    );
    db::save_payment_record(&pool, id, &record).await.unwrap();

    let now = Utc::now();
    let first = db::register_banner_dismiss(&pool, id, now).await.unwrap();
    assert_eq!(first.count, 1);
    assert!(!first.banner_suppressed(now));

    let second = db::register_banner_dismiss(&pool, id, now).await.unwrap();
    assert_eq!(second.count, 2);
    assert!(second.banner_suppressed(now));

    let (resumed, banner_eligible, _) = orchestrator.resume_pending(id).await.unwrap();
    assert!(resumed);
    assert!(!banner_eligible);
}
