//! Sales-rep bonus rules.
//!
//! Monthly bonuses are mutually exclusive: only the highest tier met in a
//! calendar month pays. Milestones are cumulative over a rep's lifetime and a
//! rep can hold all of them at once. Neither function knows what has already
//! been awarded; the repository enforces one award per key.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{MilestoneTier, MonthlyBonusTier};

impl MonthlyBonusTier {
    /// Highest tier first, so the first match wins.
    const DESCENDING: [MonthlyBonusTier; 3] = [
        Self::FifteenClients,
        Self::TenClients,
        Self::FiveClients,
    ];

    pub fn threshold(&self) -> u32 {
        match self {
            Self::FiveClients => 5,
            Self::TenClients => 10,
            Self::FifteenClients => 15,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Self::FiveClients => Decimal::new(500, 0),
            Self::TenClients => Decimal::new(1000, 0),
            Self::FifteenClients => Decimal::new(1500, 0),
        }
    }

    pub fn reward_description(&self) -> &'static str {
        match self {
            Self::FiveClients => "$500 cash bonus",
            Self::TenClients => "$1,000 cash bonus",
            Self::FifteenClients => "$1,500 cash or high-value gift of choice",
        }
    }
}

impl MilestoneTier {
    pub fn threshold(&self) -> u32 {
        match self {
            Self::Clients25 => 25,
            Self::Clients40 => 40,
            Self::Clients60 => 60,
            Self::Clients100 => 100,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Self::Clients25 => Decimal::new(1_000, 0),
            Self::Clients40 => Decimal::new(5_000, 0),
            Self::Clients60 => Decimal::new(7_500, 0),
            Self::Clients100 => Decimal::new(10_000, 0),
        }
    }

    pub fn equity_offer(&self) -> bool {
        matches!(self, Self::Clients100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBonusAward {
    pub tier: MonthlyBonusTier,
    pub amount: Decimal,
    pub reward_description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneAward {
    pub tier: MilestoneTier,
    pub amount: Decimal,
    pub equity_offer: bool,
}

impl From<MilestoneTier> for MilestoneAward {
    fn from(tier: MilestoneTier) -> Self {
        Self {
            tier,
            amount: tier.amount(),
            equity_offer: tier.equity_offer(),
        }
    }
}

/// Milestones reached so far and the distance to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneProgress {
    pub achieved: Vec<MilestoneAward>,
    /// `None` once every milestone is reached.
    pub next_milestone: Option<MilestoneTier>,
    pub clients_to_next: Option<u32>,
}

/// The monthly bonus earned by closing `clients_closed` clients in one month.
///
/// Returns `None` below five clients.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use portal_core::calculations::bonuses::calculate_monthly_bonus;
/// use portal_core::MonthlyBonusTier;
///
/// assert_eq!(calculate_monthly_bonus(4), None);
///
/// let award = calculate_monthly_bonus(12).unwrap();
/// assert_eq!(award.tier, MonthlyBonusTier::TenClients);
/// assert_eq!(award.amount, dec!(1000));
/// ```
pub fn calculate_monthly_bonus(clients_closed: u32) -> Option<MonthlyBonusAward> {
    MonthlyBonusTier::DESCENDING
        .into_iter()
        .find(|tier| clients_closed >= tier.threshold())
        .map(|tier| MonthlyBonusAward {
            tier,
            amount: tier.amount(),
            reward_description: tier.reward_description().to_string(),
        })
}

/// Milestone progress for a rep with `total_clients_closed` lifetime clients.
pub fn calculate_milestone_bonus(total_clients_closed: u32) -> MilestoneProgress {
    let achieved = MilestoneTier::ALL
        .into_iter()
        .filter(|tier| total_clients_closed >= tier.threshold())
        .map(MilestoneAward::from)
        .collect();

    let next_milestone = MilestoneTier::ALL
        .into_iter()
        .find(|tier| total_clients_closed < tier.threshold());

    MilestoneProgress {
        achieved,
        next_milestone,
        clients_to_next: next_milestone.map(|tier| tier.threshold() - total_clients_closed),
    }
}
