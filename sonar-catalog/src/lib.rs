//! # sonar-catalog
//!
//! The read-only procurement data catalog. The orchestration core treats the
//! domain datasets as opaque and reaches them only through the narrow read
//! interface exposed here: portfolio summary, supplier lookup and filtering,
//! recent risk changes, inflation figures, and scenario deltas.

mod data;
mod queries;

pub use data::{Catalog, ManagedCategory, Supplier};
pub use queries::{
    InflationDriverShare, InflationSummary, PortfolioSummary, RiskChange, ScenarioDelta,
    SupplierFilter,
};
