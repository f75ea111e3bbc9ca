//! Shared data structures for the lead-capture funnel.
//!
//! ## Design decisions
//!
//! ### Step model
//!
//! The funnel is a strict three-step wizard:
//!
//! ```text
//! Details ──► Payment ──► Outcome
//! ```
//!
//! `Outcome` doubles as the post-submission hub: reopening the form for a
//! service that was already selected lands there directly, and payment is
//! initiated (or retried) from it.
//!
//! ### Payment status as a finite-state machine
//!
//! [`PaymentStatus`] enforces a forward-only lifecycle per session:
//!
//! ```text
//! (none) ──► Pending ──► Success   (terminal)
//!    ▲           └─────► Failed
//!    └──────────────────────┘  (Failed may re-enter Pending on retry)
//! ```
//!
//! "No payment attempted yet" is `Option::<PaymentStatus>::None`, not a
//! fourth variant, so match sites on an attempted payment stay exhaustive.

use serde::{Deserialize, Serialize};

/// The services a lead can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    /// A lawyer-drafted legal notice sent on the client's behalf.
    LegalNotice,
    /// A scheduled consultation call with a lawyer.
    Consultation,
    /// Drafting of agreements, affidavits, replies and similar documents.
    DocumentDrafting,
    /// An ongoing corporate retainer engagement.
    CorporateRetainer,
}

impl ServiceType {
    /// Short identifier string, matching the wire/serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegalNotice => "legal-notice",
            Self::Consultation => "consultation",
            Self::DocumentDrafting => "document-drafting",
            Self::CorporateRetainer => "corporate-retainer",
        }
    }

    /// Parse the identifier form; `None` for anything unrecognised.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "legal-notice" => Some(Self::LegalNotice),
            "consultation" => Some(Self::Consultation),
            "document-drafting" => Some(Self::DocumentDrafting),
            "corporate-retainer" => Some(Self::CorporateRetainer),
            _ => None,
        }
    }

    /// Human-facing label used in page copy and checkout descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LegalNotice => "Legal Notice",
            Self::Consultation => "Lawyer Consultation",
            Self::DocumentDrafting => "Document Drafting",
            Self::CorporateRetainer => "Corporate Retainer",
        }
    }
}

/// Whether the lead wants to pay the advance now or only submit the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentChoice {
    #[default]
    SubmitOnly,
    PayNow,
}

/// Status of the payment attempted in this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// Wizard steps. Numeric indices are 1-based for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStep {
    /// Personal details entry.
    Details,
    /// Review and payment choice.
    Payment,
    /// Outcome display; also the hub for starting/retrying payment.
    Outcome,
}

impl FunnelStep {
    pub const FIRST: FunnelStep = FunnelStep::Details;
    pub const LAST: FunnelStep = FunnelStep::Outcome;

    /// 1-based index shown to the user.
    pub fn index(&self) -> u8 {
        match self {
            Self::Details => 1,
            Self::Payment => 2,
            Self::Outcome => 3,
        }
    }

    /// Advance one step, clamped at [`FunnelStep::LAST`].
    pub fn next(&self) -> FunnelStep {
        match self {
            Self::Details => Self::Payment,
            Self::Payment | Self::Outcome => Self::Outcome,
        }
    }

    /// Go back one step, clamped at [`FunnelStep::FIRST`].
    pub fn prev(&self) -> FunnelStep {
        match self {
            Self::Outcome => Self::Payment,
            Self::Payment | Self::Details => Self::Details,
        }
    }
}

/// The partial record accumulated across the wizard.
///
/// Everything is optional until validation requires it; `whatsapp_consent`
/// alone defaults to `true` (the checkbox is pre-ticked in the UI).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadFormData {
    pub name: Option<String>,
    /// One of the fixed city names from [`crate::catalog`].
    pub location: Option<String>,
    /// Dial code of the selected country, e.g. `"+91"`.
    pub country_code: Option<String>,
    /// National number digits, without the dial code.
    pub whatsapp_number: Option<String>,
    pub service: Option<ServiceType>,
    pub service_details: Option<String>,
    pub payment_choice: PaymentChoice,
    pub whatsapp_consent: bool,
    /// Assigned by the submission gateway on success; required before payment.
    pub lead_id: Option<String>,
    pub custom_id: Option<String>,
    pub submission_success: bool,
    pub payment_success: bool,
    pub payment_id: Option<String>,
}

impl Default for LeadFormData {
    fn default() -> Self {
        LeadFormData {
            name: None,
            location: None,
            country_code: None,
            whatsapp_number: None,
            service: None,
            service_details: None,
            payment_choice: PaymentChoice::default(),
            whatsapp_consent: true,
            lead_id: None,
            custom_id: None,
            submission_success: false,
            payment_success: false,
            payment_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_indices_are_one_based() {
        assert_eq!(FunnelStep::Details.index(), 1);
        assert_eq!(FunnelStep::Payment.index(), 2);
        assert_eq!(FunnelStep::Outcome.index(), 3);
    }

    #[test]
    fn step_next_clamps_at_outcome() {
        assert_eq!(FunnelStep::Outcome.next(), FunnelStep::Outcome);
    }

    #[test]
    fn step_prev_clamps_at_details() {
        assert_eq!(FunnelStep::Details.prev(), FunnelStep::Details);
    }

    #[test]
    fn service_slug_round_trip() {
        for svc in [
            ServiceType::LegalNotice,
            ServiceType::Consultation,
            ServiceType::DocumentDrafting,
            ServiceType::CorporateRetainer,
        ] {
            assert_eq!(ServiceType::from_slug(svc.as_str()), Some(svc));
        }
        assert_eq!(ServiceType::from_slug("notary"), None);
    }

    #[test]
    fn consent_defaults_to_true() {
        assert!(LeadFormData::default().whatsapp_consent);
    }
}
