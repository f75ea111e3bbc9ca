//! Clients for the external collaborators: the lead-submission backend and
//! the payment gateway (order creation + verification).
//!
//! ## Resilience
//!
//! * Payment **verification** is retried with capped exponential back-off,
//!   up to [`MAX_VERIFY_ATTEMPTS`] attempts — the gateway needs a moment to
//!   make a captured payment verifiable.  Definite validation rejections
//!   (bad signature and friends) are never retried; retrying a definite
//!   rejection only wastes time.
//! * **Submission** and **order creation** are never retried here: the
//!   funnel allows one manual attempt per user action, and a failed order
//!   creation is non-fatal anyway (the checkout overlay can create its own
//!   order).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use funnel_core::{PaymentChoice, ServiceType};

use crate::errors::{Result, ServerError};

const MAX_VERIFY_ATTEMPTS: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 1_000;
const MAX_BACKOFF_MS: u64 = 8_000;

// ─────────────────────────────────────────────────────────
// Wire shapes
// ─────────────────────────────────────────────────────────

/// The complete lead payload sent to the submission backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub service: ServiceType,
    pub name: String,
    pub location: String,
    pub whatsapp_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_details: Option<String>,
    pub payment_choice: PaymentChoice,
    pub whatsapp_consent: bool,
    /// Which wizard step produced this payload.
    pub step: u8,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    pub lead_id: Option<String>,
    pub custom_id: Option<String>,
    pub message: Option<String>,
}

/// What the orchestrator keeps from a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub lead_id: String,
    pub custom_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Minor currency units.
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    pub notes: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub payment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// The checkout overlay's three callbacks, reconciled into one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Completed {
        payment_id: String,
        order_id: Option<String>,
        signature: Option<String>,
    },
    Failed {
        reason: String,
    },
    /// The lead closed the overlay without paying.  Reported for analytics
    /// only; no status change is forced by this path.
    Dismissed,
}

// ─────────────────────────────────────────────────────────
// Gateway seams
// ─────────────────────────────────────────────────────────

#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// POST the lead payload; returns the assigned ids.
    async fn submit(&self, payload: &LeadSubmission) -> Result<SubmissionReceipt>;
}

#[async_trait]
pub trait PaymentApi: Send + Sync {
    /// Create a payment order ahead of the checkout overlay.
    async fn create_order(&self, request: &OrderRequest) -> Result<Order>;

    /// Verify a captured payment; retried internally per the back-off policy.
    async fn verify(&self, request: &VerifyRequest) -> Result<()>;
}

// ─────────────────────────────────────────────────────────
// HTTP implementation
// ─────────────────────────────────────────────────────────

pub struct HttpGateway {
    client: Client,
    submission_url: String,
    order_url: String,
    verify_url: String,
}

impl HttpGateway {
    pub fn new(
        client: Client,
        submission_url: String,
        order_url: String,
        verify_url: String,
    ) -> Self {
        HttpGateway {
            client,
            submission_url,
            order_url,
            verify_url,
        }
    }
}

#[async_trait]
impl SubmissionApi for HttpGateway {
    async fn submit(&self, payload: &LeadSubmission) -> Result<SubmissionReceipt> {
        let response = self
            .client
            .post(&self.submission_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body: SubmissionResponse = response.json().await?;

        if !status.is_success() || !body.success {
            let message = body
                .message
                .unwrap_or_else(|| format!("Submission failed with status {status}"));
            return Err(ServerError::Gateway(message));
        }

        let lead_id = body
            .lead_id
            .ok_or_else(|| ServerError::Gateway("Submission succeeded without a lead id".into()))?;

        Ok(SubmissionReceipt {
            lead_id,
            custom_id: body.custom_id,
        })
    }
}

#[async_trait]
impl PaymentApi for HttpGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<Order> {
        let response = self
            .client
            .post(&self.order_url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServerError::Gateway(format!(
                "Order creation failed with status {status}"
            )));
        }

        let order: Order = response.json().await?;
        debug!("Created payment order {}", order.id);
        Ok(order)
    }

    async fn verify(&self, request: &VerifyRequest) -> Result<()> {
        let mut backoff = INITIAL_BACKOFF_MS;

        for attempt in 1..=MAX_VERIFY_ATTEMPTS {
            let response = self
                .client
                .post(&self.verify_url)
                .json(request)
                .send()
                .await;

            match response {
                Err(e) => {
                    // Transient network failure; retry unless exhausted.
                    if attempt == MAX_VERIFY_ATTEMPTS {
                        return Err(ServerError::Http(e));
                    }
                    warn!("Verification request failed (retry in {backoff}ms): {e}");
                }
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    match resp.json::<VerifyResponse>().await {
                        Ok(body) if body.success => return Ok(()),
                        Ok(body) => {
                            let reason = body.error.or(body.message).unwrap_or_else(|| {
                                format!("verification rejected with status {status}")
                            });

                            if is_validation_rejection(status, &reason) {
                                // A definite rejection; retrying cannot change it.
                                return Err(ServerError::Gateway(reason));
                            }
                            if attempt == MAX_VERIFY_ATTEMPTS {
                                return Err(ServerError::Gateway(format!(
                                    "verification not confirmed after {MAX_VERIFY_ATTEMPTS} attempts: {reason}"
                                )));
                            }
                            warn!("Verification soft failure (retry in {backoff}ms): {reason}");
                        }
                        Err(e) => {
                            // Proxies answer transient 5xxs with HTML error
                            // pages; an unreadable body is a soft failure
                            // unless the status itself was definite.
                            if is_validation_rejection(status, "") {
                                return Err(ServerError::Http(e));
                            }
                            if attempt == MAX_VERIFY_ATTEMPTS {
                                return Err(ServerError::Http(e));
                            }
                            warn!(
                                "Verification returned an unreadable body (retry in {backoff}ms): {e}"
                            );
                        }
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(backoff)).await;
            backoff = (backoff * 2).min(MAX_BACKOFF_MS);
        }

        // Every branch of the final attempt returns above.
        Err(ServerError::Gateway(
            "verification retries exhausted".to_string(),
        ))
    }
}

/// Distinguish a definite validation rejection (no retry) from a transient
/// or unknown failure (retry up to the cap).
fn is_validation_rejection(status: u16, reason: &str) -> bool {
    if status == 400 || status == 422 {
        return true;
    }
    let lower = reason.to_lowercase();
    lower.contains("signature") || lower.contains("invalid") || lower.contains("validation")
}
