//! # Lead-funnel domain crate
//!
//! Pure domain logic for the legal-services lead-generation funnel — no
//! I/O, no async, no framework types.  The service binary in
//! `backend/server` drives everything here.
//!
//! | Concern              | Module                          |
//! |----------------------|---------------------------------|
//! | Wizard state machine | [`state`]                       |
//! | Field validation     | [`validate`]                    |
//! | Page copy resolution | [`content`]                     |
//! | Route/sitemap gen    | [`routes`]                      |
//! | Fixed catalogs       | [`catalog`]                     |
//! | Advance pricing      | [`pricing`]                     |
//! | TTL'd resume records | [`persist`]                     |

pub mod catalog;
pub mod content;
pub mod errors;
pub mod persist;
pub mod pricing;
pub mod routes;
pub mod state;
pub mod types;
pub mod validate;

#[cfg(test)]
mod test_funnel_flow;

pub use errors::{FunnelError, Result};
pub use state::FunnelState;
pub use types::{FunnelStep, LeadFormData, PaymentChoice, PaymentStatus, ServiceType};
