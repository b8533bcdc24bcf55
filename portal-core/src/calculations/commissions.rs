//! Year-one commission schedule for a closed deal.
//!
//! | Month | Type              | Amount |
//! |-------|-------------------|--------|
//! | 1     | `initial_monthly` | monthly value × 40% |
//! | 1     | `setup_fee`       | setup fee × 20% |
//! | 2–12  | `residual`        | monthly value × 10% |
//!
//! Residual payments fall on the first payment date plus `month - 1`
//! calendar months; when the target month is shorter the day is clamped to
//! its last day.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use portal_core::calculations::commissions::{calculate_commissions, generate_commission_records};
//! # use chrono::Utc;
//! # use portal_core::Deal;
//!
//! let first_payment = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! # let deal = Deal {
//! #     id: 1,
//! #     crm_deal_id: "hs-1".to_string(),
//! #     company_name: "Acme".to_string(),
//! #     sales_rep_id: 7,
//! #     monthly_value: dec!(1000),
//! #     setup_fee: dec!(2000),
//! #     closed_date: first_payment,
//! #     first_payment_date: first_payment,
//! #     created_at: Utc::now(),
//! #     updated_at: Utc::now(),
//! # };
//! let calculation = calculate_commissions(&deal, first_payment);
//!
//! assert_eq!(calculation.initial_month_commission, dec!(400));
//! assert_eq!(calculation.setup_fee_commission, dec!(400));
//! assert_eq!(calculation.total_commission_year1, dec!(1900));
//! assert_eq!(generate_commission_records(&deal, &calculation).len(), 13);
//! ```

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::round_half_up;
use crate::models::{CommissionType, Deal, NewCommissionRecord};

/// Errors raised when a commission configuration is out of range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommissionConfigError {
    #[error("initial month rate must be between 0 and 1, got {0}")]
    InvalidInitialMonthRate(Decimal),

    #[error("setup fee rate must be between 0 and 1, got {0}")]
    InvalidSetupFeeRate(Decimal),

    #[error("residual rate must be between 0 and 1, got {0}")]
    InvalidResidualRate(Decimal),

    /// Month 1 is the initial payment, so at most 11 residual months fit in a year.
    #[error("residual months must be between 0 and 11, got {0}")]
    InvalidResidualMonths(u32),
}

/// Commission rates applied to a deal's contract values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionConfig {
    /// Share of the first month's recurring value.
    pub initial_month_rate: Decimal,

    /// Share of the one-time setup fee.
    pub setup_fee_rate: Decimal,

    /// Share of the recurring value paid in each residual month.
    pub residual_rate: Decimal,

    /// Residual months following month 1.
    pub residual_months: u32,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            initial_month_rate: Decimal::new(40, 2),
            setup_fee_rate: Decimal::new(20, 2),
            residual_rate: Decimal::new(10, 2),
            residual_months: 11,
        }
    }
}

impl CommissionConfig {
    /// Validates every rate is in [0, 1] and the residuals fit in twelve months.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommissionConfigError`] found.
    pub fn validate(&self) -> Result<(), CommissionConfigError> {
        let in_unit_range = |rate: Decimal| rate >= Decimal::ZERO && rate <= Decimal::ONE;

        if !in_unit_range(self.initial_month_rate) {
            return Err(CommissionConfigError::InvalidInitialMonthRate(
                self.initial_month_rate,
            ));
        }
        if !in_unit_range(self.setup_fee_rate) {
            return Err(CommissionConfigError::InvalidSetupFeeRate(
                self.setup_fee_rate,
            ));
        }
        if !in_unit_range(self.residual_rate) {
            return Err(CommissionConfigError::InvalidResidualRate(
                self.residual_rate,
            ));
        }
        if self.residual_months > 11 {
            return Err(CommissionConfigError::InvalidResidualMonths(
                self.residual_months,
            ));
        }
        Ok(())
    }
}

/// One residual payment in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualCommission {
    pub month: u32,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionCalculation {
    /// Month 1 of the schedule; every payment date is counted from it.
    pub first_payment_date: NaiveDate,
    pub initial_month_commission: Decimal,
    pub setup_fee_commission: Decimal,
    pub residual_commissions: Vec<ResidualCommission>,
    pub total_commission_year1: Decimal,
}

/// Calculator for a deal's year-one commission schedule.
#[derive(Debug, Clone, Default)]
pub struct CommissionSchedule {
    config: CommissionConfig,
}

impl CommissionSchedule {
    /// # Errors
    ///
    /// Returns [`CommissionConfigError`] if `config` fails validation.
    pub fn new(config: CommissionConfig) -> Result<Self, CommissionConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Computes every payment owed for `deal`, starting from `first_payment_date`.
    ///
    /// Amounts are not validated; a negative deal value yields negative
    /// commissions and a warning.
    pub fn calculate(
        &self,
        deal: &Deal,
        first_payment_date: NaiveDate,
    ) -> CommissionCalculation {
        if deal.monthly_value < Decimal::ZERO || deal.setup_fee < Decimal::ZERO {
            warn!(
                crm_deal_id = %deal.crm_deal_id,
                monthly_value = %deal.monthly_value,
                setup_fee = %deal.setup_fee,
                "Deal has a negative contract value; commissions will be negative"
            );
        }

        let initial_month_commission =
            round_half_up(deal.monthly_value * self.config.initial_month_rate);
        let setup_fee_commission = round_half_up(deal.setup_fee * self.config.setup_fee_rate);

        let residual_amount = round_half_up(deal.monthly_value * self.config.residual_rate);
        let residual_commissions: Vec<ResidualCommission> = (2..=self.config.residual_months + 1)
            .map(|month| ResidualCommission {
                month,
                amount: residual_amount,
                payment_date: add_months(first_payment_date, month - 1),
            })
            .collect();

        let total_commission_year1 = initial_month_commission
            + setup_fee_commission
            + residual_commissions
                .iter()
                .map(|residual| residual.amount)
                .sum::<Decimal>();

        CommissionCalculation {
            first_payment_date,
            initial_month_commission,
            setup_fee_commission,
            residual_commissions,
            total_commission_year1,
        }
    }

    /// Materializes `calculation` as ledger records for `deal`.
    ///
    /// The initial-month and setup-fee records are skipped when their amount
    /// is zero. Each record carries the contract value it was computed from
    /// and the first day of its payment month, counted from the
    /// calculation's first payment date.
    pub fn records(
        &self,
        deal: &Deal,
        calculation: &CommissionCalculation,
    ) -> Vec<NewCommissionRecord> {
        let first_month = first_of_month(calculation.first_payment_date);
        let record = |commission_type, rate, base_amount, amount, month_number, payment_month| {
            NewCommissionRecord {
                deal_id: deal.id,
                sales_rep_id: deal.sales_rep_id,
                commission_type,
                rate,
                base_amount,
                amount,
                month_number,
                payment_month,
            }
        };

        let mut records = Vec::with_capacity(2 + calculation.residual_commissions.len());

        if !calculation.initial_month_commission.is_zero() {
            records.push(record(
                CommissionType::InitialMonthly,
                self.config.initial_month_rate,
                deal.monthly_value,
                calculation.initial_month_commission,
                1,
                first_month,
            ));
        }
        if !calculation.setup_fee_commission.is_zero() {
            records.push(record(
                CommissionType::SetupFee,
                self.config.setup_fee_rate,
                deal.setup_fee,
                calculation.setup_fee_commission,
                1,
                first_month,
            ));
        }
        for residual in &calculation.residual_commissions {
            records.push(record(
                CommissionType::Residual,
                self.config.residual_rate,
                deal.monthly_value,
                residual.amount,
                residual.month,
                first_of_month(residual.payment_date),
            ));
        }

        records
    }
}

/// Computes the year-one schedule with the standard 40/20/10 rates.
pub fn calculate_commissions(
    deal: &Deal,
    first_payment_date: NaiveDate,
) -> CommissionCalculation {
    CommissionSchedule::default().calculate(deal, first_payment_date)
}

/// Ledger records for a schedule produced by [`calculate_commissions`].
pub fn generate_commission_records(
    deal: &Deal,
    calculation: &CommissionCalculation,
) -> Vec<NewCommissionRecord> {
    CommissionSchedule::default().records(deal, calculation)
}

/// Adds calendar months, clamping the day to the end of shorter months.
fn add_months(
    date: NaiveDate,
    months: u32,
) -> NaiveDate {
    // Saturates instead of overflowing near NaiveDate::MAX.
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;

    fn date(
        year: i32,
        month: u32,
        day: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn test_deal(
        monthly_value: Decimal,
        setup_fee: Decimal,
    ) -> Deal {
        Deal {
            id: 42,
            crm_deal_id: "hs-42".to_string(),
            company_name: "Acme Dental".to_string(),
            sales_rep_id: 7,
            monthly_value,
            setup_fee,
            closed_date: date(2024, 1, 10),
            first_payment_date: date(2024, 1, 15),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    // =========================================================================
    // CommissionConfig::validate tests
    // =========================================================================

    #[test]
    fn default_config_is_valid() {
        assert_eq!(CommissionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_rate_above_one() {
        let config = CommissionConfig {
            initial_month_rate: dec!(1.5),
            ..CommissionConfig::default()
        };

        assert_eq!(
            CommissionSchedule::new(config).map(|_| ()),
            Err(CommissionConfigError::InvalidInitialMonthRate(dec!(1.5)))
        );
    }

    #[test]
    fn rejects_negative_residual_rate() {
        let config = CommissionConfig {
            residual_rate: dec!(-0.1),
            ..CommissionConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(CommissionConfigError::InvalidResidualRate(dec!(-0.1)))
        );
    }

    #[test]
    fn rejects_more_than_eleven_residual_months() {
        let config = CommissionConfig {
            residual_months: 12,
            ..CommissionConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(CommissionConfigError::InvalidResidualMonths(12))
        );
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn standard_deal_schedule() {
        let deal = test_deal(dec!(1000), dec!(2000));

        let calculation = calculate_commissions(&deal, date(2024, 1, 15));

        assert_eq!(calculation.initial_month_commission, dec!(400));
        assert_eq!(calculation.setup_fee_commission, dec!(400));
        assert_eq!(calculation.residual_commissions.len(), 11);
        assert!(
            calculation
                .residual_commissions
                .iter()
                .all(|residual| residual.amount == dec!(100))
        );
        assert_eq!(calculation.total_commission_year1, dec!(1900));
    }

    #[test]
    fn residuals_cover_months_two_through_twelve() {
        let deal = test_deal(dec!(1000), dec!(2000));

        let calculation = calculate_commissions(&deal, date(2024, 1, 15));

        let first = &calculation.residual_commissions[0];
        let last = &calculation.residual_commissions[10];
        assert_eq!((first.month, first.payment_date), (2, date(2024, 2, 15)));
        assert_eq!((last.month, last.payment_date), (12, date(2024, 12, 15)));
    }

    #[test]
    fn month_end_payment_dates_clamp() {
        let deal = test_deal(dec!(1000), dec!(0));

        let calculation = calculate_commissions(&deal, date(2024, 1, 31));

        assert_eq!(calculation.residual_commissions[0].payment_date, date(2024, 2, 29));
        assert_eq!(calculation.residual_commissions[2].payment_date, date(2024, 4, 30));
    }

    #[test]
    fn fractional_amounts_round_to_cents() {
        let deal = test_deal(dec!(333.33), dec!(0));

        let calculation = calculate_commissions(&deal, date(2024, 1, 15));

        assert_eq!(calculation.initial_month_commission, dec!(133.33));
        assert_eq!(calculation.residual_commissions[0].amount, dec!(33.33));
    }

    #[test]
    fn custom_rates_flow_through() {
        let schedule = CommissionSchedule::new(CommissionConfig {
            initial_month_rate: dec!(0.50),
            setup_fee_rate: dec!(0.10),
            residual_rate: dec!(0.05),
            residual_months: 5,
        })
        .expect("valid config");
        let deal = test_deal(dec!(1000), dec!(2000));

        let calculation = schedule.calculate(&deal, date(2024, 1, 15));

        assert_eq!(calculation.residual_commissions.len(), 5);
        assert_eq!(calculation.total_commission_year1, dec!(950));
    }

    #[test]
    fn negative_deal_values_are_not_rejected() {
        let _guard = init_test_tracing();
        let deal = test_deal(dec!(-500), dec!(0));

        let calculation = calculate_commissions(&deal, date(2024, 1, 15));

        assert_eq!(calculation.initial_month_commission, dec!(-200));
        assert_eq!(calculation.total_commission_year1, dec!(-750));
    }

    // =========================================================================
    // records tests
    // =========================================================================

    #[test]
    fn generates_thirteen_records() {
        let deal = test_deal(dec!(1000), dec!(2000));
        let calculation = calculate_commissions(&deal, deal.first_payment_date);

        let records = generate_commission_records(&deal, &calculation);

        assert_eq!(records.len(), 13);
        assert_eq!(
            records[0],
            NewCommissionRecord {
                deal_id: 42,
                sales_rep_id: 7,
                commission_type: CommissionType::InitialMonthly,
                rate: dec!(0.40),
                base_amount: dec!(1000),
                amount: dec!(400),
                month_number: 1,
                payment_month: date(2024, 1, 1),
            }
        );
        assert_eq!(records[1].commission_type, CommissionType::SetupFee);
        assert_eq!(records[1].base_amount, dec!(2000));
        assert_eq!(records[1].rate, dec!(0.20));
    }

    #[test]
    fn residual_records_use_first_day_of_payment_month() {
        let deal = test_deal(dec!(1000), dec!(2000));
        let calculation = calculate_commissions(&deal, deal.first_payment_date);

        let records = generate_commission_records(&deal, &calculation);

        let residuals: Vec<_> = records
            .iter()
            .filter(|record| record.commission_type == CommissionType::Residual)
            .collect();
        assert_eq!(residuals.len(), 11);
        assert_eq!(residuals[0].month_number, 2);
        assert_eq!(residuals[0].payment_month, date(2024, 2, 1));
        assert_eq!(residuals[10].month_number, 12);
        assert_eq!(residuals[10].payment_month, date(2024, 12, 1));
        assert!(residuals.iter().all(|record| record.rate == dec!(0.10)));
    }

    #[test]
    fn records_follow_the_calculated_first_payment() {
        // The deal says January; the schedule is anchored to June.
        let deal = test_deal(dec!(1000), dec!(2000));
        let calculation = calculate_commissions(&deal, date(2024, 6, 15));

        let records = generate_commission_records(&deal, &calculation);

        let months: Vec<(u32, NaiveDate)> = records
            .iter()
            .map(|record| (record.month_number, record.payment_month))
            .collect();
        assert_eq!(months[0], (1, date(2024, 6, 1)));
        assert_eq!(months[1], (1, date(2024, 6, 1)));
        assert_eq!(months[2], (2, date(2024, 7, 1)));
        assert_eq!(months[12], (12, date(2025, 5, 1)));
    }

    #[test]
    fn zero_setup_fee_skips_setup_record() {
        let deal = test_deal(dec!(1000), dec!(0));
        let calculation = calculate_commissions(&deal, deal.first_payment_date);

        let records = generate_commission_records(&deal, &calculation);

        assert_eq!(records.len(), 12);
        assert!(
            records
                .iter()
                .all(|record| record.commission_type != CommissionType::SetupFee)
        );
    }

    #[test]
    fn setup_only_deal_keeps_residual_placeholders() {
        let deal = test_deal(dec!(0), dec!(1500));
        let calculation = calculate_commissions(&deal, deal.first_payment_date);

        let records = generate_commission_records(&deal, &calculation);

        assert_eq!(records.len(), 12);
        assert_eq!(records[0].commission_type, CommissionType::SetupFee);
        assert_eq!(records[0].amount, dec!(300));
    }
}
