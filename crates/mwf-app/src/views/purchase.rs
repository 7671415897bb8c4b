//! # Purchase Offer View State

use crate::runtime_bridge::PurchaseSchema;

/// Purchase form state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseState {
    /// Schema for the form renderer; the form is hidden until this is set
    pub schema: Option<PurchaseSchema>,
    /// Schema fetch in flight
    pub loading_schema: bool,
    /// Offer submission in flight
    pub submitting: bool,
    /// Offers accepted by the backend this session
    pub offers_sent: u32,
}

impl PurchaseState {
    /// Whether the form should be shown.
    pub fn is_ready(&self) -> bool {
        self.schema.is_some()
    }
}
