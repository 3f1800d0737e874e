pub mod config;
pub mod error;
pub mod icp;
pub mod profile;

pub use config::Config;
pub use error::{LeadSignalError, StoreError};
pub use icp::IcpCriteria;
pub use profile::{normalize_domain, CompanyProfile, FirmType, FitClass, SHEET_COLUMNS};
