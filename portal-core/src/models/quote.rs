use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeeResult, PricingInput};
use crate::calculations::pricing::calculate_combined_fees;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub contact_email: String,
    pub input: PricingInput,

    // Calculated values
    pub bookkeeping: FeeResult,
    pub taas: FeeResult,
    pub total: FeeResult,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new quotes (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuote {
    pub contact_email: String,
    pub input: PricingInput,
    pub bookkeeping: FeeResult,
    pub taas: FeeResult,
    pub total: FeeResult,
}

impl NewQuote {
    /// Prices `input` and captures the fees alongside it.
    pub fn price(
        contact_email: impl Into<String>,
        input: PricingInput,
    ) -> Self {
        let fees = calculate_combined_fees(&input);
        Self {
            contact_email: contact_email.into(),
            bookkeeping: fees.bookkeeping.fees(),
            taas: fees.taas.fees(),
            total: fees.combined,
            input,
        }
    }
}
