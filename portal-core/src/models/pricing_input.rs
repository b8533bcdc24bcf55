use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Annual revenue bucket selected on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum RevenueBand {
    #[serde(rename = "<$10K")]
    Under10K,
    #[serde(rename = "10K-25K")]
    From10KTo25K,
    #[serde(rename = "25K-75K")]
    From25KTo75K,
    #[serde(rename = "75K-250K")]
    From75KTo250K,
    #[serde(rename = "250K-1M")]
    From250KTo1M,
    #[serde(rename = "1M+")]
    Over1M,
}

impl RevenueBand {
    pub const ALL: [RevenueBand; 6] = [
        Self::Under10K,
        Self::From10KTo25K,
        Self::From25KTo75K,
        Self::From75KTo250K,
        Self::From250KTo1M,
        Self::Over1M,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Under10K => "<$10K",
            Self::From10KTo25K => "10K-25K",
            Self::From25KTo75K => "25K-75K",
            Self::From75KTo250K => "75K-250K",
            Self::From250KTo1M => "250K-1M",
            Self::Over1M => "1M+",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.as_str() == s)
    }
}

impl TryFrom<String> for RevenueBand {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown revenue band '{value}'"))
    }
}

/// Monthly transaction volume bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TransactionBand {
    #[serde(rename = "<100")]
    Under100,
    #[serde(rename = "100-300")]
    From100To300,
    #[serde(rename = "300-600")]
    From300To600,
    #[serde(rename = "600-1000")]
    From600To1000,
    #[serde(rename = "1000-2000")]
    From1000To2000,
    #[serde(rename = "2000+")]
    Over2000,
}

impl TransactionBand {
    pub const ALL: [TransactionBand; 6] = [
        Self::Under100,
        Self::From100To300,
        Self::From300To600,
        Self::From600To1000,
        Self::From1000To2000,
        Self::Over2000,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Under100 => "<100",
            Self::From100To300 => "100-300",
            Self::From300To600 => "300-600",
            Self::From600To1000 => "600-1000",
            Self::From1000To2000 => "1000-2000",
            Self::Over2000 => "2000+",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|band| band.as_str() == s)
    }
}

impl TryFrom<String> for TransactionBand {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown transaction band '{value}'"))
    }
}

/// Client industry. Names outside the table deserialize as [`Industry::Other`]
/// and are priced with its factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Industry {
    #[serde(rename = "Software/SaaS")]
    SoftwareSaas,
    #[serde(rename = "Professional Services")]
    ProfessionalServices,
    #[serde(rename = "Consulting")]
    Consulting,
    #[serde(rename = "Healthcare/Medical")]
    HealthcareMedical,
    #[serde(rename = "Real Estate")]
    RealEstate,
    #[serde(rename = "Property Management")]
    PropertyManagement,
    #[serde(rename = "E-commerce/Retail")]
    EcommerceRetail,
    #[serde(rename = "Restaurant/Food Service")]
    RestaurantFoodService,
    #[serde(rename = "Hospitality")]
    Hospitality,
    #[serde(rename = "Construction/Trades")]
    ConstructionTrades,
    #[serde(rename = "Manufacturing")]
    Manufacturing,
    #[serde(rename = "Transportation/Logistics")]
    TransportationLogistics,
    #[serde(rename = "Nonprofit")]
    Nonprofit,
    #[serde(rename = "Law Firm")]
    LawFirm,
    #[serde(rename = "Accounting/Finance")]
    AccountingFinance,
    #[serde(rename = "Marketing/Advertising")]
    MarketingAdvertising,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "Automotive")]
    Automotive,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Fitness/Wellness")]
    FitnessWellness,
    #[serde(rename = "Entertainment/Events")]
    EntertainmentEvents,
    #[serde(rename = "Agriculture")]
    Agriculture,
    #[serde(rename = "Other")]
    Other,
}

impl Industry {
    pub const ALL: [Industry; 23] = [
        Self::SoftwareSaas,
        Self::ProfessionalServices,
        Self::Consulting,
        Self::HealthcareMedical,
        Self::RealEstate,
        Self::PropertyManagement,
        Self::EcommerceRetail,
        Self::RestaurantFoodService,
        Self::Hospitality,
        Self::ConstructionTrades,
        Self::Manufacturing,
        Self::TransportationLogistics,
        Self::Nonprofit,
        Self::LawFirm,
        Self::AccountingFinance,
        Self::MarketingAdvertising,
        Self::Insurance,
        Self::Automotive,
        Self::Education,
        Self::FitnessWellness,
        Self::EntertainmentEvents,
        Self::Agriculture,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoftwareSaas => "Software/SaaS",
            Self::ProfessionalServices => "Professional Services",
            Self::Consulting => "Consulting",
            Self::HealthcareMedical => "Healthcare/Medical",
            Self::RealEstate => "Real Estate",
            Self::PropertyManagement => "Property Management",
            Self::EcommerceRetail => "E-commerce/Retail",
            Self::RestaurantFoodService => "Restaurant/Food Service",
            Self::Hospitality => "Hospitality",
            Self::ConstructionTrades => "Construction/Trades",
            Self::Manufacturing => "Manufacturing",
            Self::TransportationLogistics => "Transportation/Logistics",
            Self::Nonprofit => "Nonprofit",
            Self::LawFirm => "Law Firm",
            Self::AccountingFinance => "Accounting/Finance",
            Self::MarketingAdvertising => "Marketing/Advertising",
            Self::Insurance => "Insurance",
            Self::Automotive => "Automotive",
            Self::Education => "Education",
            Self::FitnessWellness => "Fitness/Wellness",
            Self::EntertainmentEvents => "Entertainment/Events",
            Self::Agriculture => "Agriculture",
            Self::Other => "Other",
        }
    }

    /// Parses a display name; anything unrecognised lands in [`Industry::Other`].
    pub fn parse_or_other(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|industry| industry.as_str() == s)
            .unwrap_or(Self::Other)
    }
}

impl From<String> for Industry {
    fn from(value: String) -> Self {
        Self::parse_or_other(&value)
    }
}

/// Why a sales rep overrode the computed cleanup pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideReason {
    #[serde(rename = "Brand New Business")]
    BrandNewBusiness,
    #[serde(rename = "Books Confirmed Current")]
    BooksConfirmedCurrent,
    #[serde(rename = "Other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "LLC")]
    Llc,
    #[serde(rename = "S-Corp")]
    SCorp,
    #[serde(rename = "C-Corp")]
    CCorp,
    #[serde(rename = "Partnership")]
    Partnership,
    #[serde(rename = "Sole Proprietor")]
    SoleProprietor,
    #[serde(rename = "Non-Profit")]
    NonProfit,
}

/// State of the client's books, which drives the TaaS preparation upcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookkeepingQuality {
    #[serde(rename = "Clean (Seed)")]
    CleanSeed,
    #[serde(rename = "Outside CPA")]
    OutsideCpa,
    #[serde(rename = "Self-Managed")]
    SelfManaged,
    #[serde(rename = "Not Done")]
    NotDone,
}

/// Client intake snapshot submitted by the quote form.
///
/// Every attribute is optional: an absent value means the question has not
/// been answered yet, and the affected service line is quoted as incomplete
/// rather than priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInput {
    // Bookkeeping
    #[serde(default = "default_includes_bookkeeping")]
    pub includes_bookkeeping: bool,
    #[serde(default)]
    pub revenue_band: Option<RevenueBand>,
    #[serde(default)]
    pub monthly_transactions: Option<TransactionBand>,
    #[serde(default)]
    pub industry: Option<Industry>,
    #[serde(default)]
    pub cleanup_months: Option<u32>,
    #[serde(default)]
    pub cleanup_complexity: Option<Decimal>,
    #[serde(default)]
    pub cleanup_override: bool,
    #[serde(default)]
    pub override_reason: Option<OverrideReason>,
    #[serde(default)]
    pub custom_setup_fee: Option<Decimal>,

    // Tax-as-a-Service
    #[serde(default)]
    pub includes_taas: bool,
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    #[serde(default)]
    pub num_entities: Option<u32>,
    #[serde(default)]
    pub states_filed: Option<u32>,
    #[serde(default)]
    pub international_filing: Option<bool>,
    #[serde(default)]
    pub num_business_owners: Option<u32>,
    #[serde(default)]
    pub bookkeeping_quality: Option<BookkeepingQuality>,
    #[serde(default, rename = "include1040s")]
    pub include_1040s: Option<bool>,
    #[serde(default)]
    pub prior_years_unfiled: Option<u32>,
    #[serde(default)]
    pub already_on_seed_bookkeeping: Option<bool>,
}

fn default_includes_bookkeeping() -> bool {
    true
}

impl Default for PricingInput {
    fn default() -> Self {
        Self {
            includes_bookkeeping: true,
            revenue_band: None,
            monthly_transactions: None,
            industry: None,
            cleanup_months: None,
            cleanup_complexity: None,
            cleanup_override: false,
            override_reason: None,
            custom_setup_fee: None,
            includes_taas: false,
            entity_type: None,
            num_entities: None,
            states_filed: None,
            international_filing: None,
            num_business_owners: None,
            bookkeeping_quality: None,
            include_1040s: None,
            prior_years_unfiled: None,
            already_on_seed_bookkeeping: None,
        }
    }
}
