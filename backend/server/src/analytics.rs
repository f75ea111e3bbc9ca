//! Fire-and-forget analytics emission.
//!
//! Every state transition in the funnel emits an event.  Emission never
//! blocks the caller, never surfaces an error, and degrades to a no-op
//! when no collector endpoint is configured.

use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Everything the funnel reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunnelEvent {
    FormOpened,
    FormClosed,
    FormReset,
    StepViewed,
    FieldInteraction,
    SubmissionSucceeded,
    SubmissionFailed,
    PaymentInitiated,
    PaymentSucceeded,
    PaymentFailed,
    CheckoutDismissed,
    OutcomeViewed,
    BannerDismissed,
    PaymentResumed,
}

impl FunnelEvent {
    /// Event name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FormOpened => "form_opened",
            Self::FormClosed => "form_closed",
            Self::FormReset => "form_reset",
            Self::StepViewed => "step_viewed",
            Self::FieldInteraction => "field_interaction",
            Self::SubmissionSucceeded => "submission_succeeded",
            Self::SubmissionFailed => "submission_failed",
            Self::PaymentInitiated => "payment_initiated",
            Self::PaymentSucceeded => "payment_succeeded",
            Self::PaymentFailed => "payment_failed",
            Self::CheckoutDismissed => "checkout_dismissed",
            Self::OutcomeViewed => "outcome_viewed",
            Self::BannerDismissed => "banner_dismissed",
            Self::PaymentResumed => "payment_resumed",
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsEmitter {
    client: Client,
    /// `None` means analytics is unconfigured; every emit is a no-op.
    endpoint: Option<String>,
}

impl AnalyticsEmitter {
    pub fn new(client: Client, endpoint: Option<String>) -> Self {
        if endpoint.is_none() {
            debug!("Analytics collector not configured; events will be dropped");
        }
        AnalyticsEmitter { client, endpoint }
    }

    /// Emit an event with a parameter bag.  Returns immediately; delivery
    /// happens on a detached task and failures are logged at debug only.
    pub fn emit(&self, event: FunnelEvent, params: Value) {
        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };
        let client = self.client.clone();
        let body = json!({
            "event": event.as_str(),
            "params": params,
        });

        tokio::spawn(async move {
            if let Err(e) = client.post(&endpoint).json(&body).send().await {
                debug!("Analytics emit failed (ignored): {e}");
            }
        });
    }
}
