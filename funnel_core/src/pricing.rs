//! Advance-payment pricing.
//!
//! Amounts are minor units (paise); the currency is fixed to INR.  The
//! advance is a partial upfront fee, not the full service price.

use serde::{Deserialize, Serialize};

use crate::types::ServiceType;

pub const CURRENCY: &str = "INR";

/// An amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: u64,
    pub currency: &'static str,
}

impl Money {
    /// Render as a display string, e.g. `"₹999"`.
    pub fn display(&self) -> String {
        format!("₹{}", self.amount_minor / 100)
    }
}

/// Advance amount collected per service.
pub fn advance_amount(service: ServiceType) -> Money {
    let amount_minor = match service {
        ServiceType::LegalNotice => 99_900,       // ₹999
        ServiceType::Consultation => 49_900,      // ₹499
        ServiceType::DocumentDrafting => 149_900, // ₹1,499
        ServiceType::CorporateRetainer => 499_900, // ₹4,999
    };
    Money {
        amount_minor,
        currency: CURRENCY,
    }
}

/// Receipt string for order creation, derived from the lead id.
pub fn receipt_for(lead_id: &str) -> String {
    format!("lead_{lead_id}")
}
