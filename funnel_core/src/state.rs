//! The lead-capture state machine.
//!
//! `FunnelState` is the single owner of all funnel-session state.  Callers
//! never write fields directly; every mutation goes through a method so the
//! transition rules stay in one place:
//!
//! * `current step` is always clamped within the wizard's three steps.
//! * `lead_id` appears only via [`FunnelState::submission_succeeded`] and is
//!   required before payment may start.
//! * `payment_status` moves only `None/Failed → Pending → {Success, Failed}`;
//!   `Success` is terminal for the session.
//! * Closing the form hides the modal but deliberately keeps everything
//!   else intact — the external checkout overlay needs the modal closed
//!   while it runs, and reopens it afterwards with state preserved.
//!
//! The busy flags (`is_submitting`, `is_processing_payment`) are advisory:
//! `begin_submission` / `begin_payment` reject re-entry while their flag is
//! set, but nothing stops a caller from ignoring the returned error.

use serde::{Deserialize, Serialize};

use crate::errors::{FunnelError, Result};
use crate::persist::PersistedPaymentRecord;
use crate::types::{FunnelStep, LeadFormData, PaymentChoice, PaymentStatus, ServiceType};
use crate::validate::{validate_details, DetailsInput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelState {
    pub step: FunnelStep,
    pub form: LeadFormData,
    /// Modal visibility, independent of the current step.
    pub is_open: bool,
    pub is_submitting: bool,
    pub is_processing_payment: bool,
    /// Last submission error, cleared at the start of each new attempt.
    pub submission_error: Option<String>,
    /// Last payment error, cleared at the start of each new attempt.
    pub payment_error: Option<String>,
    /// `None` means no payment has been attempted this session.
    pub payment_status: Option<PaymentStatus>,
}

impl Default for FunnelState {
    fn default() -> Self {
        FunnelState {
            step: FunnelStep::FIRST,
            form: LeadFormData::default(),
            is_open: false,
            is_submitting: false,
            is_processing_payment: false,
            submission_error: None,
            payment_error: None,
            payment_status: None,
        }
    }
}

impl FunnelState {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────
    // Modal / step navigation
    // ─────────────────────────────────────────────────────────

    /// Open the form, optionally pre-selecting a service.
    ///
    /// Reopening for the *same* service that is already selected jumps
    /// straight to [`FunnelStep::Outcome`] so the lead does not re-enter
    /// personal details; any other case resets to [`FunnelStep::Details`].
    /// Always clears `payment_status` for the fresh attempt.
    pub fn open_form(&mut self, service: Option<ServiceType>) {
        let same_service = match (service, self.form.service) {
            (Some(requested), Some(current)) => requested == current,
            _ => false,
        };

        if same_service {
            self.step = FunnelStep::Outcome;
        } else {
            self.step = FunnelStep::Details;
            if let Some(svc) = service {
                self.form.service = Some(svc);
            }
        }

        self.is_open = true;
        self.payment_status = None;
    }

    /// Advance one step, clamped at the last step.
    pub fn next_step(&mut self) {
        self.step = self.step.next();
    }

    /// Go back one step, clamped at the first step.
    pub fn prev_step(&mut self) {
        self.step = self.step.prev();
    }

    /// Hide the modal only.  Form data, step, and payment status survive so
    /// the checkout overlay can reopen the modal where the lead left off.
    pub fn close_form(&mut self) {
        self.is_open = false;
    }

    /// Full reset, used only for explicit "start over" actions.
    pub fn reset_form(&mut self) {
        *self = FunnelState::default();
    }

    // ─────────────────────────────────────────────────────────
    // Step 1 — personal details
    // ─────────────────────────────────────────────────────────

    /// Validate and store the personal-details step.
    ///
    /// Validation is synchronous and field-level; the step is not
    /// advanceable while any required field is invalid.
    pub fn set_details(&mut self, input: DetailsInput) -> Result<()> {
        validate_details(&input)?;

        self.form.name = Some(input.name.trim().to_string());
        self.form.location = Some(input.location);
        self.form.country_code = Some(input.country_code);
        self.form.whatsapp_number = Some(input.whatsapp_number);
        self.form.whatsapp_consent = input.whatsapp_consent;
        Ok(())
    }

    pub fn set_service(&mut self, service: ServiceType) {
        self.form.service = Some(service);
    }

    pub fn set_service_details(&mut self, details: Option<String>) {
        self.form.service_details = details.filter(|d| !d.trim().is_empty());
    }

    pub fn set_payment_choice(&mut self, choice: PaymentChoice) {
        self.form.payment_choice = choice;
    }

    // ─────────────────────────────────────────────────────────
    // Step 2 — submission
    // ─────────────────────────────────────────────────────────

    /// Gate a submission attempt.
    ///
    /// Rejects locally — no network call may be made by the caller — when
    /// any of `service`, `name`, `location`, `whatsapp_number` is absent,
    /// when consent was withdrawn, or when a submission is already in
    /// flight.  On success clears `submission_error` and raises the busy
    /// flag; the caller must follow up with [`FunnelState::submission_succeeded`]
    /// or [`FunnelState::submission_failed`].
    pub fn begin_submission(&mut self) -> Result<()> {
        if self.is_submitting {
            return Err(FunnelError::SubmissionInProgress);
        }

        let missing = self.missing_required_field();
        if let Some(field) = missing {
            let msg = format!("Missing required field: {field}");
            self.submission_error = Some(msg.clone());
            return Err(FunnelError::Validation(msg));
        }
        if !self.form.whatsapp_consent {
            let msg = "WhatsApp consent is required".to_string();
            self.submission_error = Some(msg.clone());
            return Err(FunnelError::Validation(msg));
        }

        self.submission_error = None;
        self.is_submitting = true;
        Ok(())
    }

    fn missing_required_field(&self) -> Option<&'static str> {
        if self.form.service.is_none() {
            Some("service")
        } else if self.form.name.as_deref().map_or(true, str::is_empty) {
            Some("name")
        } else if self.form.location.as_deref().map_or(true, str::is_empty) {
            Some("location")
        } else if self
            .form
            .whatsapp_number
            .as_deref()
            .map_or(true, str::is_empty)
        {
            Some("whatsappNumber")
        } else {
            None
        }
    }

    /// Record a successful submission and advance exactly one step.
    pub fn submission_succeeded(&mut self, lead_id: String, custom_id: Option<String>) {
        self.form.lead_id = Some(lead_id);
        self.form.custom_id = custom_id;
        self.form.submission_success = true;
        self.is_submitting = false;
        self.submission_error = None;
        self.next_step();
    }

    /// Surface a submission failure; the lead stays on the current step and
    /// may resubmit manually (no automatic retry).
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        self.submission_error = Some(message.into());
        self.is_submitting = false;
    }

    // ─────────────────────────────────────────────────────────
    // Payment lifecycle
    // ─────────────────────────────────────────────────────────

    /// Gate a payment attempt.
    ///
    /// Fails fast — the caller must not touch the gateway — unless
    /// `lead_id`, `service`, and `name` are all present.  Enforces the
    /// status lifecycle: a payment may start from `None` or `Failed` only.
    pub fn begin_payment(&mut self) -> Result<()> {
        if self.is_processing_payment {
            return Err(FunnelError::PaymentInProgress);
        }

        let precondition = if self.form.lead_id.is_none() {
            Some("lead id not assigned yet")
        } else if self.form.service.is_none() {
            Some("no service selected")
        } else if self.form.name.as_deref().map_or(true, str::is_empty) {
            Some("name not provided")
        } else {
            None
        };
        if let Some(reason) = precondition {
            self.payment_error = Some(reason.to_string());
            return Err(FunnelError::PaymentPrecondition(reason.to_string()));
        }

        match self.payment_status {
            None | Some(PaymentStatus::Failed) => {}
            // A Pending status here is stale (restored from a persisted
            // record after a reload) — a live attempt is excluded by the
            // busy-flag check above, so resuming is allowed.
            Some(PaymentStatus::Pending) => {}
            Some(PaymentStatus::Success) => {
                return Err(FunnelError::InvalidTransition(
                    "payment already succeeded this session".to_string(),
                ));
            }
        }

        self.payment_error = None;
        self.payment_status = Some(PaymentStatus::Pending);
        self.is_processing_payment = true;
        Ok(())
    }

    /// `Pending → Success`.  Terminal for the session.
    pub fn payment_succeeded(&mut self, payment_id: String) -> Result<()> {
        self.require_pending("success")?;
        self.payment_status = Some(PaymentStatus::Success);
        self.form.payment_success = true;
        self.form.payment_id = Some(payment_id);
        self.is_processing_payment = false;
        self.payment_error = None;
        Ok(())
    }

    /// `Pending → Failed`.  The lead may retry later.
    pub fn payment_failed(&mut self, message: impl Into<String>) -> Result<()> {
        self.require_pending("failure")?;
        self.payment_status = Some(PaymentStatus::Failed);
        self.payment_error = Some(message.into());
        self.is_processing_payment = false;
        Ok(())
    }

    /// The lead dismissed the checkout overlay without completing payment.
    /// No status change is forced by this path — the attempt stays
    /// `Pending` and remains resumable — but the busy flag drops so a
    /// fresh attempt is possible.
    pub fn checkout_dismissed(&mut self) {
        self.is_processing_payment = false;
    }

    /// Bring the modal back at the outcome step once the checkout overlay
    /// has finished.  Unlike [`FunnelState::open_form`] this preserves
    /// `payment_status` — that is the whole point of the outcome view.
    pub fn reopen_at_outcome(&mut self) {
        self.is_open = true;
        self.step = FunnelStep::Outcome;
    }

    fn require_pending(&self, outcome: &str) -> Result<()> {
        match self.payment_status {
            Some(PaymentStatus::Pending) => Ok(()),
            other => Err(FunnelError::InvalidTransition(format!(
                "cannot record payment {outcome} from status {other:?}"
            ))),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Resume after reload
    // ─────────────────────────────────────────────────────────

    /// Restore minimal fields from a persisted in-flight payment record so
    /// a banner can offer to resume without re-entering the wizard.
    ///
    /// The record must already have passed its TTL check; expired records
    /// are discarded by the storage layer, never restored.
    pub fn restore_pending(&mut self, record: &PersistedPaymentRecord) {
        self.form.lead_id = Some(record.lead_id.clone());
        self.form.service = Some(record.service);
        self.form.name = Some(record.name.clone());
        self.form.whatsapp_number = record.whatsapp_number.clone();
        self.form.submission_success = true;
        self.payment_status = Some(record.status.into());
    }
}
