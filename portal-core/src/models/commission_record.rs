use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionType {
    InitialMonthly,
    SetupFee,
    Residual,
}

impl CommissionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialMonthly => "initial_monthly",
            Self::SetupFee => "setup_fee",
            Self::Residual => "residual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initial_monthly" => Some(Self::InitialMonthly),
            "setup_fee" => Some(Self::SetupFee),
            "residual" => Some(Self::Residual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRecord {
    pub id: i64,
    pub deal_id: i64,
    pub sales_rep_id: i64,
    pub commission_type: CommissionType,
    pub rate: Decimal,
    pub base_amount: Decimal,
    pub amount: Decimal,
    /// 1 for the first payment month, up to 12.
    pub month_number: u32,
    /// Always the first day of the month the payment falls in.
    pub payment_month: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// For inserting generated records (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommissionRecord {
    pub deal_id: i64,
    pub sales_rep_id: i64,
    pub commission_type: CommissionType,
    pub rate: Decimal,
    pub base_amount: Decimal,
    pub amount: Decimal,
    pub month_number: u32,
    pub payment_month: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_type_codes_round_trip() {
        for kind in [
            CommissionType::InitialMonthly,
            CommissionType::SetupFee,
            CommissionType::Residual,
        ] {
            assert_eq!(CommissionType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CommissionType::parse("bonus"), None);
    }
}
