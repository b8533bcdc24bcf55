//! Bookkeeping fee calculation.
//!
//! The monthly fee scales a $150 base by revenue band, adds a flat
//! transaction-volume surcharge, then applies the industry's monthly factor:
//!
//! ```text
//! monthly = round((150 × revenue_multiplier + tx_surcharge) × industry.monthly)
//! ```
//!
//! The setup fee prices historical cleanup work:
//!
//! ```text
//! setup = ceil25(max(monthly, monthly × complexity × industry.cleanup × cleanup_months))
//! ```
//!
//! A manual override with reason `Other` and a positive custom fee replaces
//! the computed setup fee verbatim. With no cleanup months the setup fee is 0.

use rust_decimal::Decimal;
use tracing::debug;

use super::tables::{
    base_monthly_fee, industry_multiplier, revenue_multiplier, transaction_surcharge,
};
use crate::calculations::common::{ceil_to_nearest, max, round_whole_dollars};
use crate::models::{FeeQuote, FeeResult, OverrideReason, PricingField, PricingInput};

/// Prices the bookkeeping line.
///
/// Returns [`FeeQuote::Incomplete`] when revenue band, monthly transactions,
/// industry or cleanup months is missing, or when a cleanup period is given
/// without a complexity factor.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use portal_core::calculations::pricing::calculate_bookkeeping_fees;
/// use portal_core::{FeeQuote, FeeResult, Industry, PricingInput, RevenueBand, TransactionBand};
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
/// assert_eq!(
///     calculate_bookkeeping_fees(&input),
///     FeeQuote::Complete(FeeResult::new(dec!(430), dec!(975)))
/// );
/// ```
pub fn calculate_bookkeeping_fees(input: &PricingInput) -> FeeQuote {
    if !input.includes_bookkeeping {
        return FeeQuote::NotIncluded;
    }

    let missing = missing_fields(input);
    let (Some(revenue_band), Some(transactions), Some(industry), Some(cleanup_months)) = (
        input.revenue_band,
        input.monthly_transactions,
        input.industry,
        input.cleanup_months,
    ) else {
        debug!(?missing, "bookkeeping quote incomplete");
        return FeeQuote::Incomplete { missing };
    };
    if !missing.is_empty() {
        debug!(?missing, "bookkeeping quote incomplete");
        return FeeQuote::Incomplete { missing };
    }

    let multiplier = industry_multiplier(industry);
    let monthly_fee = round_whole_dollars(
        (base_monthly_fee() * revenue_multiplier(revenue_band)
            + transaction_surcharge(transactions))
            * multiplier.monthly,
    );

    let setup_fee = match manual_override_fee(input) {
        Some(custom) => custom,
        None if cleanup_months > 0 => {
            let complexity = input.cleanup_complexity.unwrap_or(Decimal::ONE);
            let cleanup_cost =
                monthly_fee * complexity * multiplier.cleanup * Decimal::from(cleanup_months);
            ceil_to_nearest(max(monthly_fee, cleanup_cost), Decimal::new(25, 0))
        }
        None => Decimal::ZERO,
    };

    FeeQuote::Complete(FeeResult::new(monthly_fee, setup_fee))
}

fn missing_fields(input: &PricingInput) -> Vec<PricingField> {
    let mut missing = Vec::new();
    if input.revenue_band.is_none() {
        missing.push(PricingField::RevenueBand);
    }
    if input.monthly_transactions.is_none() {
        missing.push(PricingField::MonthlyTransactions);
    }
    if input.industry.is_none() {
        missing.push(PricingField::Industry);
    }
    match input.cleanup_months {
        None => missing.push(PricingField::CleanupMonths),
        Some(months) if months > 0 && input.cleanup_complexity.is_none() => {
            missing.push(PricingField::CleanupComplexity);
        }
        Some(_) => {}
    }
    missing
}

/// The custom setup fee, when an `Other` override with a positive fee is active.
fn manual_override_fee(input: &PricingInput) -> Option<Decimal> {
    if !input.cleanup_override || input.override_reason != Some(OverrideReason::Other) {
        return None;
    }
    input
        .custom_setup_fee
        .filter(|fee| *fee > Decimal::ZERO)
}
