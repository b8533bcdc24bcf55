use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monthly bonus tiers; only the highest one met is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MonthlyBonusTier {
    #[serde(rename = "5_clients")]
    FiveClients,
    #[serde(rename = "10_clients")]
    TenClients,
    #[serde(rename = "15_clients")]
    FifteenClients,
}

impl MonthlyBonusTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FiveClients => "5_clients",
            Self::TenClients => "10_clients",
            Self::FifteenClients => "15_clients",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "5_clients" => Some(Self::FiveClients),
            "10_clients" => Some(Self::TenClients),
            "15_clients" => Some(Self::FifteenClients),
            _ => None,
        }
    }
}

/// Lifetime milestone tiers; each is independent and cumulative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MilestoneTier {
    #[serde(rename = "25_clients")]
    Clients25,
    #[serde(rename = "40_clients")]
    Clients40,
    #[serde(rename = "60_clients")]
    Clients60,
    #[serde(rename = "100_clients")]
    Clients100,
}

impl MilestoneTier {
    /// Ascending by threshold.
    pub const ALL: [MilestoneTier; 4] = [
        Self::Clients25,
        Self::Clients40,
        Self::Clients60,
        Self::Clients100,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients25 => "25_clients",
            Self::Clients40 => "40_clients",
            Self::Clients60 => "60_clients",
            Self::Clients100 => "100_clients",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBonus {
    pub id: i64,
    pub sales_rep_id: i64,
    /// First day of the calendar month the bonus was earned in.
    pub bonus_month: NaiveDate,
    pub tier: MonthlyBonusTier,
    pub amount: Decimal,
    pub reward_description: String,
    pub clients_closed: u32,
    pub awarded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMonthlyBonus {
    pub sales_rep_id: i64,
    pub bonus_month: NaiveDate,
    pub tier: MonthlyBonusTier,
    pub amount: Decimal,
    pub reward_description: String,
    pub clients_closed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneBonus {
    pub id: i64,
    pub sales_rep_id: i64,
    pub tier: MilestoneTier,
    pub amount: Decimal,
    pub equity_offer: bool,
    pub clients_closed: u32,
    pub awarded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMilestoneBonus {
    pub sales_rep_id: i64,
    pub tier: MilestoneTier,
    pub amount: Decimal,
    pub equity_offer: bool,
    pub clients_closed: u32,
}
