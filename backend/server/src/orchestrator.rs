//! Orchestration of the funnel's asynchronous steps: submission, payment,
//! checkout reconciliation, and resume-after-reload.
//!
//! The ordering rules live here:
//!
//! * the local validation gate runs before any network call;
//! * the pending payment record is persisted *before* checkout parameters
//!   are handed out (durability against navigation mid-overlay);
//! * the modal is closed before the overlay opens and reopened at the
//!   outcome step only on success;
//! * order-creation failure degrades gracefully — the checkout overlay can
//!   create its own order, so the flow proceeds without one.
//!
//! Every error is converted into a state field (`submission_error`,
//! `payment_error`); nothing here panics into the handler layer.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use funnel_core::persist::PersistedPaymentRecord;
use funnel_core::{pricing, FunnelState};

use crate::analytics::{AnalyticsEmitter, FunnelEvent};
use crate::db;
use crate::errors::{Result, ServerError};
use crate::gateway::{
    CheckoutOutcome, LeadSubmission, OrderRequest, PaymentApi, SubmissionApi, VerifyRequest,
};
use crate::sessions::SessionStore;

/// Everything the client needs to open the checkout overlay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutParams {
    pub key_id: String,
    /// Absent when order creation failed; the overlay creates its own.
    pub order_id: Option<String>,
    pub amount_minor: u64,
    pub currency: &'static str,
    pub description: String,
    pub prefill_name: String,
    pub prefill_contact: Option<String>,
}

/// What goes into `submission_error` / `payment_error`: the upstream
/// server's own message, not the error-variant prefix around it.
fn surface_message(e: ServerError) -> String {
    match e {
        ServerError::Gateway(msg) => msg,
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    pub sessions: SessionStore,
    pub pool: SqlitePool,
    pub analytics: AnalyticsEmitter,
}

impl Orchestrator {
    // ─────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────

    /// Submit the accumulated lead to the backend.
    ///
    /// Missing required fields fail the local gate — no network call is
    /// made and `submission_error` is set.  Gateway failures surface the
    /// server's message in `submission_error`; there is no automatic
    /// retry.  Either way the caller gets the updated state back.
    pub async fn submit_lead(
        &self,
        session_id: Uuid,
        submissions: &dyn SubmissionApi,
    ) -> Result<FunnelState> {
        let (gate, state) = self
            .sessions
            .with_state(session_id, |s| s.begin_submission())
            .await?;
        if gate.is_err() {
            // Rejected locally; no network call.
            return Ok(state);
        }

        // The gate guarantees these fields are present.
        let payload = LeadSubmission {
            service: state.form.service.unwrap_or(funnel_core::ServiceType::LegalNotice),
            name: state.form.name.clone().unwrap_or_default(),
            location: state.form.location.clone().unwrap_or_default(),
            whatsapp_number: state.form.whatsapp_number.clone().unwrap_or_default(),
            service_details: state.form.service_details.clone(),
            payment_choice: state.form.payment_choice,
            whatsapp_consent: state.form.whatsapp_consent,
            step: state.step.index(),
            submitted_at: Utc::now(),
        };

        match submissions.submit(&payload).await {
            Ok(receipt) => {
                // The mirror is non-authoritative: the gateway has already
                // accepted the lead, so a local write failure must not turn
                // the submission into an error.
                if let Err(e) = db::insert_lead(
                    &self.pool,
                    session_id,
                    &receipt.lead_id,
                    receipt.custom_id.as_deref(),
                    &payload,
                )
                .await
                {
                    warn!("Lead mirror write failed (ignored): {e}");
                }
                let (_, state) = self
                    .sessions
                    .with_state(session_id, |s| {
                        s.submission_succeeded(receipt.lead_id.clone(), receipt.custom_id.clone())
                    })
                    .await?;
                info!("Lead {} submitted for session {session_id}", receipt.lead_id);
                self.analytics.emit(
                    FunnelEvent::SubmissionSucceeded,
                    json!({ "leadId": receipt.lead_id, "service": payload.service.as_str() }),
                );
                Ok(state)
            }
            Err(e) => {
                let message = surface_message(e);
                let (_, state) = self
                    .sessions
                    .with_state(session_id, |s| s.submission_failed(message.clone()))
                    .await?;
                self.analytics
                    .emit(FunnelEvent::SubmissionFailed, json!({ "error": message }));
                Ok(state)
            }
        }
    }

    // ─────────────────────────────────────────────────────────
    // Payment
    // ─────────────────────────────────────────────────────────

    /// Start a payment for the session's submitted lead.
    ///
    /// Returns checkout parameters on success; when the local precondition
    /// gate fails (no lead id yet, no service, no name) the state carries
    /// `payment_error`, no gateway call is made, and no parameters are
    /// returned.
    pub async fn start_payment(
        &self,
        session_id: Uuid,
        payments: &dyn PaymentApi,
        checkout_key_id: &str,
    ) -> Result<(Option<CheckoutParams>, FunnelState)> {
        let (gate, state) = self
            .sessions
            .with_state(session_id, |s| s.begin_payment())
            .await?;
        if gate.is_err() {
            return Ok((None, state));
        }

        let lead_id = state.form.lead_id.clone().unwrap_or_default();
        let service = state.form.service.unwrap_or(funnel_core::ServiceType::LegalNotice);
        let name = state.form.name.clone().unwrap_or_default();
        let money = pricing::advance_amount(service);

        // Persist the pending record *before* the overlay can open, so an
        // interrupted payment survives navigation or a crash.
        let record = PersistedPaymentRecord::pending(
            lead_id.clone(),
            service,
            name.clone(),
            state.form.whatsapp_number.clone(),
            Utc::now(),
        );
        db::save_payment_record(&self.pool, session_id, &record).await?;

        // The overlay and the modal fight over z-index; close the modal.
        let (_, state) = self
            .sessions
            .with_state(session_id, |s| s.close_form())
            .await?;

        let order_request = OrderRequest {
            amount: money.amount_minor,
            currency: money.currency.to_string(),
            receipt: pricing::receipt_for(&lead_id),
            notes: json!({ "leadId": lead_id, "service": service.as_str() }),
        };
        let order_id = match payments.create_order(&order_request).await {
            Ok(order) => Some(order.id),
            Err(e) => {
                // Non-fatal: the overlay can generate its own order.
                warn!("Order creation failed, proceeding without one: {e}");
                None
            }
        };

        self.analytics.emit(
            FunnelEvent::PaymentInitiated,
            json!({
                "leadId": lead_id,
                "service": service.as_str(),
                "amountMinor": money.amount_minor,
                "orderId": order_id,
            }),
        );

        let params = CheckoutParams {
            key_id: checkout_key_id.to_string(),
            order_id,
            amount_minor: money.amount_minor,
            currency: money.currency,
            description: format!("{} — advance payment", service.label()),
            prefill_name: name,
            prefill_contact: state.form.whatsapp_number.clone(),
        };
        Ok((Some(params), state))
    }

    /// Reconcile the checkout overlay's outcome back into the session.
    pub async fn reconcile_checkout(
        &self,
        session_id: Uuid,
        outcome: CheckoutOutcome,
        payments: &dyn PaymentApi,
    ) -> Result<FunnelState> {
        match outcome {
            CheckoutOutcome::Completed {
                payment_id,
                order_id,
                signature,
            } => {
                let verify = VerifyRequest {
                    payment_id: payment_id.clone(),
                    order_id,
                    signature,
                };
                match payments.verify(&verify).await {
                    Ok(()) => {
                        let (result, state) = self
                            .sessions
                            .with_state(session_id, |s| {
                                let r = s.payment_succeeded(payment_id.clone());
                                s.reopen_at_outcome();
                                r
                            })
                            .await?;
                        if let Err(e) = result {
                            warn!("Payment success recorded out of order: {e}");
                        }
                        db::delete_payment_record(&self.pool, session_id).await?;
                        info!("Payment {payment_id} verified for session {session_id}");
                        self.analytics.emit(
                            FunnelEvent::PaymentSucceeded,
                            json!({ "paymentId": payment_id }),
                        );
                        Ok(state)
                    }
                    Err(e) => {
                        let message = surface_message(e);
                        self.record_payment_failure(session_id, message).await
                    }
                }
            }
            CheckoutOutcome::Failed { reason } => {
                self.record_payment_failure(session_id, reason).await
            }
            CheckoutOutcome::Dismissed => {
                // Analytics only; no status change is forced by this path.
                let (_, state) = self
                    .sessions
                    .with_state(session_id, |s| s.checkout_dismissed())
                    .await?;
                self.analytics
                    .emit(FunnelEvent::CheckoutDismissed, json!({}));
                Ok(state)
            }
        }
    }

    /// Mark the payment failed, keep the persisted record (as `failed`) so
    /// the banner can offer a retry, and leave the modal closed.
    async fn record_payment_failure(
        &self,
        session_id: Uuid,
        reason: String,
    ) -> Result<FunnelState> {
        let (result, state) = self
            .sessions
            .with_state(session_id, |s| s.payment_failed(reason.clone()))
            .await?;
        if let Err(e) = result {
            warn!("Payment failure recorded out of order: {e}");
        }
        db::mark_payment_record_failed(&self.pool, session_id).await?;
        self.analytics
            .emit(FunnelEvent::PaymentFailed, json!({ "reason": reason }));
        Ok(state)
    }

    // ─────────────────────────────────────────────────────────
    // Resume after reload
    // ─────────────────────────────────────────────────────────

    /// On mount: restore an unexpired in-flight payment into the session
    /// so a banner can offer to resume.  Expired records are discarded
    /// silently by the storage layer.  Returns whether anything was
    /// restored and whether the banner is still eligible to show.
    pub async fn resume_pending(&self, session_id: Uuid) -> Result<(bool, bool, FunnelState)> {
        let now = Utc::now();
        let record = db::load_payment_record(&self.pool, session_id, now).await?;

        let Some(record) = record else {
            let state = self.sessions.get(session_id).await?;
            return Ok((false, false, state));
        };

        let (_, state) = self
            .sessions
            .with_state(session_id, |s| s.restore_pending(&record))
            .await?;

        let banner_eligible = match db::load_banner_record(&self.pool, session_id).await? {
            Some(banner) => !banner.banner_suppressed(now),
            None => true,
        };

        self.analytics.emit(
            FunnelEvent::PaymentResumed,
            json!({ "leadId": record.lead_id, "status": record.status.as_str() }),
        );

        Ok((true, banner_eligible, state))
    }
}
