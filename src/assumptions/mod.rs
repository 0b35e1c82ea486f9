//! Valuation assumptions
//!
//! Assumption sets are stored per `(model, industry, size, growth)` tuple and
//! resolved through a cascade (see [`resolver`]). A stored row or a caller
//! override is an [`AssumptionRecord`] where every field is optional; the
//! resolver turns it into a concrete [`ValuationAssumptions`].

#[cfg(feature = "rusqlite-support")]
pub mod assumption_db;
pub mod resolver;
pub mod store;

#[cfg(feature = "rusqlite-support")]
pub use assumption_db::AssumptionDB;
pub use resolver::AssumptionResolver;
pub use store::{AssumptionStore, InMemoryAssumptionStore};

use crate::types::{GrowthBucket, ModelKey, Ratio, SizeBucket};
use crate::valuation::constants::{
    DEFAULT_DISCOUNT_RATE, DEFAULT_EARNINGS_MULTIPLE, DEFAULT_EBITDA_MULTIPLE,
    DEFAULT_REVENUE_MULTIPLE, DEFAULT_TERMINAL_MULTIPLE,
};
use crate::valuation::net_debt::NetDebtMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied overrides, keyed by model
pub type AssumptionOverrides = BTreeMap<ModelKey, AssumptionRecord>;

/// Lookup key into an assumption store. `None` means the generic row for that
/// dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssumptionKey {
    pub model_key: ModelKey,
    pub industry: Option<String>,
    pub size_bucket: Option<SizeBucket>,
    pub growth_bucket: Option<GrowthBucket>,
}

impl AssumptionKey {
    pub fn new(
        model_key: ModelKey,
        industry: Option<String>,
        size_bucket: Option<SizeBucket>,
        growth_bucket: Option<GrowthBucket>,
    ) -> Self {
        Self {
            model_key,
            industry,
            size_bucket,
            growth_bucket,
        }
    }

    /// Fully generic key for a model
    pub fn generic(model_key: ModelKey) -> Self {
        Self::new(model_key, None, None, None)
    }

    /// Candidate keys in lookup order: exact tuple, generic industry, fully generic
    pub fn cascade(
        model_key: ModelKey,
        industry: &str,
        size_bucket: SizeBucket,
        growth_bucket: GrowthBucket,
    ) -> [(AssumptionSource, AssumptionKey); 3] {
        [
            (
                AssumptionSource::Exact,
                Self::new(
                    model_key,
                    Some(industry.to_string()),
                    Some(size_bucket),
                    Some(growth_bucket),
                ),
            ),
            (
                AssumptionSource::GenericIndustry,
                Self::new(model_key, None, Some(size_bucket), Some(growth_bucket)),
            ),
            (AssumptionSource::ModelGeneric, Self::generic(model_key)),
        ]
    }
}

/// Which cascade level produced a resolved assumption set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionSource {
    /// Exact `(model, industry, size, growth)` match
    Exact,
    /// `(model, generic industry, size, growth)` match
    GenericIndustry,
    /// `(model, generic, generic, generic)` match
    ModelGeneric,
    /// Compiled-in per-model defaults
    BuiltIn,
}

impl AssumptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssumptionSource::Exact => "exact",
            AssumptionSource::GenericIndustry => "generic_industry",
            AssumptionSource::ModelGeneric => "model_generic",
            AssumptionSource::BuiltIn => "built_in",
        }
    }
}

/// Partial assumption set, as stored or as supplied in overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssumptionRecord {
    #[serde(default, alias = "revenueMultiple")]
    pub revenue_multiple: Option<f64>,
    #[serde(default, alias = "ebitdaMultiple")]
    pub ebitda_multiple: Option<f64>,
    #[serde(default, alias = "earningsMultiple")]
    pub earnings_multiple: Option<f64>,
    #[serde(default, alias = "discountRate")]
    pub discount_rate: Option<Ratio>,
    #[serde(default, alias = "terminalMultiple")]
    pub terminal_multiple: Option<f64>,
    #[serde(default, alias = "netDebtMethod")]
    pub net_debt_method: Option<NetDebtMethod>,
    #[serde(default, alias = "netDebtK")]
    pub net_debt_k: Option<f64>,
    #[serde(default, alias = "netDebtDirect")]
    pub net_debt_direct: Option<f64>,
}

impl AssumptionRecord {
    pub fn is_empty(&self) -> bool {
        *self == AssumptionRecord::default()
    }
}

/// Resolved assumption set for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationAssumptions {
    pub model_key: ModelKey,
    pub revenue_multiple: Option<f64>,
    pub ebitda_multiple: Option<f64>,
    pub earnings_multiple: Option<f64>,
    pub discount_rate: Option<Ratio>,
    pub terminal_multiple: Option<f64>,
    pub net_debt_method: NetDebtMethod,
    pub net_debt_k: Option<f64>,
    pub net_debt_direct: Option<f64>,
    pub source: AssumptionSource,
    /// Whether caller overrides replaced any field
    pub overridden: bool,
}

impl ValuationAssumptions {
    /// Compiled-in defaults for a model
    pub fn built_in(model_key: ModelKey) -> Self {
        let mut assumptions = Self {
            model_key,
            revenue_multiple: None,
            ebitda_multiple: None,
            earnings_multiple: None,
            discount_rate: None,
            terminal_multiple: None,
            net_debt_method: NetDebtMethod::RatioRevenue,
            net_debt_k: None,
            net_debt_direct: None,
            source: AssumptionSource::BuiltIn,
            overridden: false,
        };

        match model_key {
            ModelKey::RevenueMultiple => {
                assumptions.revenue_multiple = Some(DEFAULT_REVENUE_MULTIPLE);
            }
            ModelKey::EbitdaMultiple => {
                assumptions.ebitda_multiple = Some(DEFAULT_EBITDA_MULTIPLE);
            }
            ModelKey::EarningsMultiple => {
                assumptions.earnings_multiple = Some(DEFAULT_EARNINGS_MULTIPLE);
            }
            ModelKey::DcfLite => {
                assumptions.discount_rate = Some(DEFAULT_DISCOUNT_RATE);
                assumptions.terminal_multiple = Some(DEFAULT_TERMINAL_MULTIPLE);
            }
            ModelKey::HybridScore => {
                // The hybrid model feeds its assumptions to all four base models
                assumptions.revenue_multiple = Some(DEFAULT_REVENUE_MULTIPLE);
                assumptions.ebitda_multiple = Some(DEFAULT_EBITDA_MULTIPLE);
                assumptions.earnings_multiple = Some(DEFAULT_EARNINGS_MULTIPLE);
                assumptions.discount_rate = Some(DEFAULT_DISCOUNT_RATE);
                assumptions.terminal_multiple = Some(DEFAULT_TERMINAL_MULTIPLE);
            }
        }

        assumptions
    }

    /// Assumption set built from a stored record
    ///
    /// The row wins as a whole; a row without a net debt method uses the
    /// built-in one.
    pub fn from_record(model_key: ModelKey, record: &AssumptionRecord, source: AssumptionSource) -> Self {
        Self {
            model_key,
            revenue_multiple: record.revenue_multiple,
            ebitda_multiple: record.ebitda_multiple,
            earnings_multiple: record.earnings_multiple,
            discount_rate: record.discount_rate,
            terminal_multiple: record.terminal_multiple,
            net_debt_method: record
                .net_debt_method
                .unwrap_or(NetDebtMethod::RatioRevenue),
            net_debt_k: record.net_debt_k,
            net_debt_direct: record.net_debt_direct,
            source,
            overridden: false,
        }
    }

    /// Apply overrides: every field present in `overrides` replaces the resolved value
    pub fn with_overrides(mut self, overrides: &AssumptionRecord) -> Self {
        if overrides.is_empty() {
            return self;
        }

        fn replace<T: Copy>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        replace(&mut self.revenue_multiple, overrides.revenue_multiple);
        replace(&mut self.ebitda_multiple, overrides.ebitda_multiple);
        replace(&mut self.earnings_multiple, overrides.earnings_multiple);
        replace(&mut self.discount_rate, overrides.discount_rate);
        replace(&mut self.terminal_multiple, overrides.terminal_multiple);
        replace(&mut self.net_debt_k, overrides.net_debt_k);
        replace(&mut self.net_debt_direct, overrides.net_debt_direct);
        if let Some(method) = overrides.net_debt_method {
            self.net_debt_method = method;
        }
        self.overridden = true;
        self
    }

    /// Same assumptions re-keyed for another model (hybrid sub-model runs)
    pub fn for_model(&self, model_key: ModelKey) -> Self {
        Self {
            model_key,
            ..self.clone()
        }
    }
}
