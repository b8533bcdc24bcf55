//! Tax-as-a-Service fee calculation.
//!
//! | Component                 | Monthly amount |
//! |---------------------------|----------------|
//! | Base                      | $150 |
//! | Entities beyond 5         | $75 each |
//! | States beyond the first   | $50 each, at most 49 |
//! | International filing      | $200 flat |
//! | Owners beyond 5           | $25 each |
//! | Bookkeeping quality       | $0 / $75 / $150 |
//! | Personal 1040s            | $25 per owner |
//!
//! The sum is scaled by the TaaS industry and revenue-tier factors, discounted
//! 15% for existing Seed bookkeeping clients, and rounded up to the nearest
//! $25. The setup fee is a flat $2,100 per unfiled prior year.

use rust_decimal::Decimal;
use tracing::debug;

use super::tables::{
    average_monthly_revenue, base_monthly_fee, bookkeeping_quality_upcharge,
    taas_industry_multiplier, taas_revenue_multiplier,
};
use crate::calculations::common::ceil_to_nearest;
use crate::models::{BookkeepingQuality, FeeQuote, FeeResult, PricingField, PricingInput};

const INCLUDED_ENTITIES: u32 = 5;
const INCLUDED_OWNERS: u32 = 5;
const MAX_ADDITIONAL_STATES: u32 = 49;

/// Answers the TaaS line needs, once all of them are present.
struct TaasProfile {
    num_entities: u32,
    states_filed: u32,
    international_filing: bool,
    num_business_owners: u32,
    bookkeeping_quality: BookkeepingQuality,
    include_1040s: bool,
    prior_years_unfiled: u32,
    already_on_seed_bookkeeping: bool,
}

impl TaasProfile {
    fn from_input(input: &PricingInput) -> Result<Self, Vec<PricingField>> {
        match (
            input.entity_type,
            input.num_entities,
            input.states_filed,
            input.international_filing,
            input.num_business_owners,
            input.bookkeeping_quality,
            input.include_1040s,
            input.prior_years_unfiled,
            input.already_on_seed_bookkeeping,
        ) {
            (
                Some(_),
                Some(num_entities),
                Some(states_filed),
                Some(international_filing),
                Some(num_business_owners),
                Some(bookkeeping_quality),
                Some(include_1040s),
                Some(prior_years_unfiled),
                Some(already_on_seed_bookkeeping),
            ) => Ok(Self {
                num_entities,
                states_filed,
                international_filing,
                num_business_owners,
                bookkeeping_quality,
                include_1040s,
                prior_years_unfiled,
                already_on_seed_bookkeeping,
            }),
            _ => Err(missing_fields(input)),
        }
    }

    fn entity_upcharge(&self) -> Decimal {
        Decimal::from(self.num_entities.saturating_sub(INCLUDED_ENTITIES)) * Decimal::new(75, 0)
    }

    fn state_upcharge(&self) -> Decimal {
        let additional = self
            .states_filed
            .saturating_sub(1)
            .min(MAX_ADDITIONAL_STATES);
        Decimal::from(additional) * Decimal::new(50, 0)
    }

    fn international_upcharge(&self) -> Decimal {
        if self.international_filing {
            Decimal::new(200, 0)
        } else {
            Decimal::ZERO
        }
    }

    fn owner_upcharge(&self) -> Decimal {
        Decimal::from(self.num_business_owners.saturating_sub(INCLUDED_OWNERS))
            * Decimal::new(25, 0)
    }

    fn personal_return_upcharge(&self) -> Decimal {
        if self.include_1040s {
            Decimal::from(self.num_business_owners) * Decimal::new(25, 0)
        } else {
            Decimal::ZERO
        }
    }

    fn monthly_before_multipliers(&self) -> Decimal {
        base_monthly_fee()
            + self.entity_upcharge()
            + self.state_upcharge()
            + self.international_upcharge()
            + self.owner_upcharge()
            + bookkeeping_quality_upcharge(self.bookkeeping_quality)
            + self.personal_return_upcharge()
    }
}

/// Prices the TaaS line.
///
/// Returns [`FeeQuote::NotIncluded`] unless `includes_taas` is set, and
/// [`FeeQuote::Incomplete`] until every TaaS intake question is answered.
pub fn calculate_taas_fees(input: &PricingInput) -> FeeQuote {
    if !input.includes_taas {
        return FeeQuote::NotIncluded;
    }

    let profile = match TaasProfile::from_input(input) {
        Ok(profile) => profile,
        Err(missing) => {
            debug!(?missing, "TaaS quote incomplete");
            return FeeQuote::Incomplete { missing };
        }
    };

    let industry_factor = taas_industry_multiplier(input.industry);
    let revenue_factor = taas_revenue_multiplier(average_monthly_revenue(input.revenue_band));

    let raw_fee = profile.monthly_before_multipliers() * industry_factor * revenue_factor;
    let discounted = if profile.already_on_seed_bookkeeping {
        raw_fee * Decimal::new(85, 2)
    } else {
        raw_fee
    };
    let monthly_fee = ceil_to_nearest(discounted, Decimal::new(25, 0));

    let setup_fee = Decimal::from(profile.prior_years_unfiled) * Decimal::new(2100, 0);

    FeeQuote::Complete(FeeResult::new(monthly_fee, setup_fee))
}

fn missing_fields(input: &PricingInput) -> Vec<PricingField> {
    [
        (input.entity_type.is_none(), PricingField::EntityType),
        (input.num_entities.is_none(), PricingField::NumEntities),
        (input.states_filed.is_none(), PricingField::StatesFiled),
        (input.international_filing.is_none(), PricingField::InternationalFiling),
        (input.num_business_owners.is_none(), PricingField::NumBusinessOwners),
        (input.bookkeeping_quality.is_none(), PricingField::BookkeepingQuality),
        (input.include_1040s.is_none(), PricingField::Include1040s),
        (input.prior_years_unfiled.is_none(), PricingField::PriorYearsUnfiled),
        (
            input.already_on_seed_bookkeeping.is_none(),
            PricingField::AlreadyOnSeedBookkeeping,
        ),
    ]
    .into_iter()
    .filter_map(|(absent, field)| absent.then_some(field))
    .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{EntityType, Industry, RevenueBand};

    fn llc_input() -> PricingInput {
        PricingInput {
            includes_taas: true,
            revenue_band: Some(RevenueBand::From25KTo75K),
            industry: Some(Industry::SoftwareSaas),
            entity_type: Some(EntityType::Llc),
            num_entities: Some(2),
            states_filed: Some(3),
            international_filing: Some(false),
            num_business_owners: Some(2),
            bookkeeping_quality: Some(BookkeepingQuality::OutsideCpa),
            include_1040s: Some(true),
            prior_years_unfiled: Some(2),
            already_on_seed_bookkeeping: Some(false),
            ..PricingInput::default()
        }
    }

    fn complete(quote: FeeQuote) -> FeeResult {
        match quote {
            FeeQuote::Complete(fees) => fees,
            other => panic!("expected complete quote, got {other:?}"),
        }
    }

    #[test]
    fn prices_typical_llc() {
        // (150 + 100 states + 75 quality + 50 personal) × 1.0 × 1.4 = 525
        let fees = complete(calculate_taas_fees(&llc_input()));

        assert_eq!(fees.monthly_fee, dec!(525));
        assert_eq!(fees.setup_fee, dec!(4200));
    }

    #[test]
    fn seed_clients_get_fifteen_percent_off_before_rounding() {
        // 525 × 0.85 = 446.25 → 450
        let input = PricingInput {
            already_on_seed_bookkeeping: Some(true),
            ..llc_input()
        };

        let fees = complete(calculate_taas_fees(&input));

        assert_eq!(fees.monthly_fee, dec!(450));
    }

    #[test]
    fn stacks_every_upcharge() {
        // 150 + 225 entities + 2450 states (capped) + 200 intl + 50 owners
        //     + 150 quality + 175 personal = 3400; × 1.5 × 2.0 = 10200
        let input = PricingInput {
            revenue_band: Some(RevenueBand::Over1M),
            industry: Some(Industry::ConstructionTrades),
            num_entities: Some(8),
            states_filed: Some(60),
            international_filing: Some(true),
            num_business_owners: Some(7),
            bookkeeping_quality: Some(BookkeepingQuality::NotDone),
            include_1040s: Some(true),
            prior_years_unfiled: Some(0),
            ..llc_input()
        };

        let fees = complete(calculate_taas_fees(&input));

        assert_eq!(fees, FeeResult::new(dec!(10200), dec!(0)));
    }

    #[test]
    fn state_upcharge_caps_at_fifty_states() {
        let fifty = PricingInput {
            states_filed: Some(50),
            ..llc_input()
        };
        let fifty_one = PricingInput {
            states_filed: Some(51),
            ..llc_input()
        };

        assert_eq!(
            calculate_taas_fees(&fifty),
            calculate_taas_fees(&fifty_one)
        );
    }

    #[test]
    fn minimal_client_pays_base_rate() {
        let input = PricingInput {
            revenue_band: None,
            industry: Some(Industry::Hospitality),
            num_entities: Some(1),
            states_filed: Some(1),
            num_business_owners: Some(1),
            bookkeeping_quality: Some(BookkeepingQuality::CleanSeed),
            include_1040s: Some(false),
            prior_years_unfiled: Some(0),
            ..llc_input()
        };

        let fees = complete(calculate_taas_fees(&input));

        assert_eq!(fees, FeeResult::new(dec!(150), dec!(0)));
    }

    #[test]
    fn setup_fee_is_flat_per_unfiled_year() {
        let input = PricingInput {
            prior_years_unfiled: Some(7),
            ..llc_input()
        };

        let fees = complete(calculate_taas_fees(&input));

        assert_eq!(fees.setup_fee, dec!(14700));
    }

    #[test]
    fn missing_answers_are_reported() {
        let input = PricingInput {
            states_filed: None,
            include_1040s: None,
            ..llc_input()
        };

        assert_eq!(
            calculate_taas_fees(&input),
            FeeQuote::Incomplete {
                missing: vec![PricingField::StatesFiled, PricingField::Include1040s]
            }
        );
    }

    #[test]
    fn not_included_without_flag() {
        let input = PricingInput {
            includes_taas: false,
            ..llc_input()
        };

        assert_eq!(calculate_taas_fees(&input), FeeQuote::NotIncluded);
    }
}
