pub mod accrual;
pub mod loader;
pub mod logging;

pub use accrual::{AccrualSummary, CommissionAccrual, DealSync};
pub use loader::{DealLoader, DealLoaderError, DealRecord};
