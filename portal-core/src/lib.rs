pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{PortalRepository, RepositoryError};
pub use models::*;
