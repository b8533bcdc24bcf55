//! Fee pricing for the bookkeeping and TaaS service lines.
//!
//! Each line is priced independently into a [`FeeQuote`]; the combined
//! result sums whichever lines are complete. Pricing never fails: missing
//! intake answers produce [`FeeQuote::Incomplete`].

mod bookkeeping;
pub mod tables;
mod taas;

pub use bookkeeping::calculate_bookkeeping_fees;
pub use taas::calculate_taas_fees;

use crate::models::{CombinedFeeResult, PricingInput};

/// Prices both service lines and their sum.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use portal_core::calculations::pricing::calculate_combined_fees;
/// use portal_core::{Industry, PricingInput, RevenueBand, TransactionBand};
///
/// let input = PricingInput {
///     revenue_band: Some(RevenueBand::From25KTo75K),
///     monthly_transactions: Some(TransactionBand::From100To300),
///     industry: Some(Industry::SoftwareSaas),
///     cleanup_months: Some(3),
///     cleanup_complexity: Some(dec!(0.75)),
///     ..PricingInput::default()
/// };
///
/// let result = calculate_combined_fees(&input);
///
/// assert!(result.includes_bookkeeping);
/// assert!(!result.includes_taas);
/// assert_eq!(result.combined.monthly_fee, dec!(430));
/// assert_eq!(result.combined.setup_fee, dec!(975));
/// ```
pub fn calculate_combined_fees(input: &PricingInput) -> CombinedFeeResult {
    CombinedFeeResult::new(
        calculate_bookkeeping_fees(input),
        calculate_taas_fees(input),
        input.includes_bookkeeping,
        input.includes_taas,
    )
}
