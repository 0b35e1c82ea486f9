//! # Rusty-Valuation
//!
//! A multi-model valuation engine for private companies.
//!
//! Given a sparse financial snapshot of a company, the engine produces five
//! independent estimates of Enterprise Value and Equity Value (revenue
//! multiple, EBITDA multiple, earnings multiple, DCF-lite and a weighted
//! hybrid), each with a confidence score and a human-readable basis.
//! Per-model assumptions are resolved from a store through a cascading lookup
//! that falls back to built-in defaults.
//!
//! ## Example
//!
//! ```rust
//! use rusty_valuation::prelude::*;
//!
//! let profile = CompanyProfile::from_record(&RawCompanyRecord {
//!     orgnr: "556000-0001".to_string(),
//!     revenue: Some(10_000.0),
//!     net_profit: Some(1_000.0),
//!     ebit_margin: Some(0.12),
//!     revenue_growth: Some(0.08),
//!     ..Default::default()
//! });
//!
//! let engine = ValuationEngine::with_defaults();
//! let report = engine.value(&profile);
//!
//! assert_eq!(report.outputs.len(), 5);
//! assert_eq!(report.outputs[0].model_key, ModelKey::RevenueMultiple);
//! ```

pub mod assumptions;
pub mod engine;
pub mod error;
pub mod profile;
pub mod types;
pub mod valuation;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::assumptions::{
        AssumptionKey, AssumptionOverrides, AssumptionRecord, AssumptionResolver,
        AssumptionSource, AssumptionStore, InMemoryAssumptionStore, ValuationAssumptions,
    };
    #[cfg(feature = "rusqlite-support")]
    pub use crate::assumptions::AssumptionDB;
    pub use crate::engine::{EngineConfig, ValuationEngine, ValuationReport, ValuationSummary};
    pub use crate::error::{Result, ValuationError};
    pub use crate::profile::{CompanyProfile, IndustryClassifier, ProfileBuilder, RawCompanyRecord};
    pub use crate::types::*;
    pub use crate::valuation::{NetDebtMethod, ValuationInputs, ValuationOutput};
}
