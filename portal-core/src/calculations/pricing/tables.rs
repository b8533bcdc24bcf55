//! Static pricing tables.
//!
//! Every lookup is an exhaustive `match` over a closed enum, so adding a new
//! band or industry fails to compile until it is priced here.

use rust_decimal::Decimal;

use crate::models::{BookkeepingQuality, Industry, RevenueBand, TransactionBand};

/// Bookkeeping and TaaS both start from the same base monthly fee.
pub fn base_monthly_fee() -> Decimal {
    Decimal::new(150, 0)
}

/// Multiplier applied to the bookkeeping base fee for each revenue band.
pub fn revenue_multiplier(band: RevenueBand) -> Decimal {
    match band {
        RevenueBand::Under10K => Decimal::new(10, 1),
        RevenueBand::From10KTo25K => Decimal::new(10, 1),
        RevenueBand::From25KTo75K => Decimal::new(22, 1),
        RevenueBand::From75KTo250K => Decimal::new(35, 1),
        RevenueBand::From250KTo1M => Decimal::new(50, 1),
        RevenueBand::Over1M => Decimal::new(70, 1),
    }
}

/// Flat monthly surcharge for transaction volume.
pub fn transaction_surcharge(band: TransactionBand) -> Decimal {
    match band {
        TransactionBand::Under100 => Decimal::ZERO,
        TransactionBand::From100To300 => Decimal::new(100, 0),
        TransactionBand::From300To600 => Decimal::new(500, 0),
        TransactionBand::From600To1000 => Decimal::new(800, 0),
        TransactionBand::From1000To2000 => Decimal::new(1200, 0),
        TransactionBand::Over2000 => Decimal::new(1600, 0),
    }
}

/// Industry difficulty factors for recurring work and for historical cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndustryMultiplier {
    pub monthly: Decimal,
    pub cleanup: Decimal,
}

impl IndustryMultiplier {
    fn new(
        monthly: i64,
        cleanup: i64,
    ) -> Self {
        // Both factors are tabulated in hundredths.
        Self {
            monthly: Decimal::new(monthly, 2),
            cleanup: Decimal::new(cleanup, 2),
        }
    }
}

pub fn industry_multiplier(industry: Industry) -> IndustryMultiplier {
    match industry {
        Industry::SoftwareSaas => IndustryMultiplier::new(100, 100),
        Industry::ProfessionalServices => IndustryMultiplier::new(100, 110),
        Industry::Consulting => IndustryMultiplier::new(100, 105),
        Industry::HealthcareMedical => IndustryMultiplier::new(140, 130),
        Industry::RealEstate => IndustryMultiplier::new(125, 105),
        Industry::PropertyManagement => IndustryMultiplier::new(130, 110),
        Industry::EcommerceRetail => IndustryMultiplier::new(135, 115),
        Industry::RestaurantFoodService => IndustryMultiplier::new(160, 140),
        Industry::Hospitality => IndustryMultiplier::new(160, 140),
        Industry::ConstructionTrades => IndustryMultiplier::new(150, 108),
        Industry::Manufacturing => IndustryMultiplier::new(145, 125),
        Industry::TransportationLogistics => IndustryMultiplier::new(140, 120),
        Industry::Nonprofit => IndustryMultiplier::new(120, 115),
        Industry::LawFirm => IndustryMultiplier::new(130, 135),
        Industry::AccountingFinance => IndustryMultiplier::new(110, 110),
        Industry::MarketingAdvertising => IndustryMultiplier::new(115, 110),
        Industry::Insurance => IndustryMultiplier::new(135, 125),
        Industry::Automotive => IndustryMultiplier::new(140, 120),
        Industry::Education => IndustryMultiplier::new(125, 120),
        Industry::FitnessWellness => IndustryMultiplier::new(115, 110),
        Industry::EntertainmentEvents => IndustryMultiplier::new(150, 130),
        Industry::Agriculture => IndustryMultiplier::new(145, 120),
        Industry::Other => IndustryMultiplier::new(120, 115),
    }
}

/// TaaS complexity factor. Only a handful of industries are priced up; the
/// rest file at the base rate.
pub fn taas_industry_multiplier(industry: Option<Industry>) -> Decimal {
    match industry {
        Some(Industry::SoftwareSaas) => Decimal::new(10, 1),
        Some(Industry::ProfessionalServices) => Decimal::new(11, 1),
        Some(Industry::Consulting) => Decimal::new(11, 1),
        Some(Industry::MarketingAdvertising) => Decimal::new(12, 1),
        Some(Industry::EcommerceRetail) => Decimal::new(13, 1),
        Some(Industry::RealEstate) => Decimal::new(14, 1),
        Some(Industry::ConstructionTrades) => Decimal::new(15, 1),
        _ => Decimal::ONE,
    }
}

/// Estimated average monthly revenue used to bucket TaaS clients.
pub fn average_monthly_revenue(band: Option<RevenueBand>) -> Decimal {
    match band {
        Some(RevenueBand::Under10K) => Decimal::new(5_000, 0),
        Some(RevenueBand::From10KTo25K) => Decimal::new(17_500, 0),
        Some(RevenueBand::From25KTo75K) => Decimal::new(50_000, 0),
        Some(RevenueBand::From75KTo250K) => Decimal::new(162_500, 0),
        Some(RevenueBand::From250KTo1M) => Decimal::new(625_000, 0),
        Some(RevenueBand::Over1M) => Decimal::new(1_500_000, 0),
        None => Decimal::ZERO,
    }
}

/// Six-tier TaaS revenue multiplier, 1.0 through 2.0.
pub fn taas_revenue_multiplier(average_monthly_revenue: Decimal) -> Decimal {
    const TIERS: [(i64, i64); 5] = [
        (10_000, 10),
        (25_000, 12),
        (75_000, 14),
        (250_000, 16),
        (1_000_000, 18),
    ];

    TIERS
        .iter()
        .find(|(ceiling, _)| average_monthly_revenue <= Decimal::new(*ceiling, 0))
        .map(|(_, factor)| Decimal::new(*factor, 1))
        .unwrap_or(Decimal::new(20, 1))
}

/// Monthly TaaS upcharge for preparing returns from the client's books.
pub fn bookkeeping_quality_upcharge(quality: BookkeepingQuality) -> Decimal {
    match quality {
        BookkeepingQuality::CleanSeed => Decimal::ZERO,
        BookkeepingQuality::OutsideCpa => Decimal::new(75, 0),
        BookkeepingQuality::SelfManaged | BookkeepingQuality::NotDone => Decimal::new(150, 0),
    }
}
