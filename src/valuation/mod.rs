//! Valuation models
//!
//! Five independent strategies, each a pure function of a company profile and
//! its own assumption set:
//!
//! - **revenue**: EV from a revenue multiple
//! - **ebitda**: EV from an EBITDA multiple (EBITDA proxied when missing)
//! - **earnings**: equity from a P/E-style earnings multiple
//! - **dcf**: three-year discounted cash flow with a terminal multiple
//! - **hybrid**: weighted blend of the four above
//!
//! The set of models is closed, so dispatch is a `match` on [`ModelKey`].
//!
//! # Example
//!
//! ```rust
//! use rusty_valuation::assumptions::ValuationAssumptions;
//! use rusty_valuation::profile::{CompanyProfile, RawCompanyRecord};
//! use rusty_valuation::types::ModelKey;
//! use rusty_valuation::valuation;
//!
//! let profile = CompanyProfile::from_record(&RawCompanyRecord {
//!     revenue: Some(10_000.0),
//!     net_profit: Some(1_000.0),
//!     ..Default::default()
//! });
//! let assumptions = ValuationAssumptions::built_in(ModelKey::RevenueMultiple);
//! let output = valuation::compute(ModelKey::RevenueMultiple, &profile, &assumptions).unwrap();
//! assert_eq!(output.value_ev, Some(10_000.0));
//! ```

pub mod constants;
pub mod dcf;
pub mod earnings;
pub mod ebitda;
pub mod hybrid;
pub mod net_debt;
pub mod revenue;

pub use dcf::DcfLiteModel;
pub use earnings::EarningsMultipleModel;
pub use ebitda::EbitdaMultipleModel;
pub use hybrid::{HybridScoreModel, HybridWeights};
pub use net_debt::{compute_net_debt, NetDebtCalculation, NetDebtMethod};
pub use revenue::RevenueMultipleModel;

use crate::assumptions::{AssumptionSource, ValuationAssumptions};
use crate::error::{Result, ValuationError};
use crate::profile::CompanyProfile;
use crate::types::{ModelKey, Money};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every raw figure and intermediate value a model used
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationInputs {
    /// Named figures, e.g. `revenue`, `multiple`, `pv_year_1`
    pub figures: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_debt: Option<NetDebtCalculation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumption_source: Option<AssumptionSource>,
    /// Normalized hybrid weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<ModelKey, f64>>,
    /// Set when a hybrid weight went negative and was clamped to zero
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub weights_clamped: bool,
    /// Why a value is missing or was approximated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValuationInputs {
    pub fn new(assumptions: &ValuationAssumptions) -> Self {
        Self {
            assumption_source: Some(assumptions.source),
            ..Default::default()
        }
    }

    /// Record a named figure
    pub fn figure(mut self, name: &str, value: f64) -> Self {
        self.figures.insert(name.to_string(), value);
        self
    }

    pub fn with_net_debt(mut self, net_debt: NetDebtCalculation) -> Self {
        self.net_debt = Some(net_debt);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Result of one model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationOutput {
    pub model_key: ModelKey,
    pub model_name: String,
    pub value_ev: Option<Money>,
    pub value_equity: Option<Money>,
    /// Human-readable derivation
    pub basis: String,
    pub multiple_used: Option<f64>,
    /// Confidence score in [0, 100]
    pub confidence: u8,
    pub inputs: ValuationInputs,
}

impl ValuationOutput {
    /// Output carrying an estimate
    pub fn valued(
        model_key: ModelKey,
        value_ev: Money,
        value_equity: Money,
        basis: String,
        multiple_used: Option<f64>,
        confidence: u8,
        inputs: ValuationInputs,
    ) -> Self {
        Self {
            model_key,
            model_name: model_key.display_name().to_string(),
            value_ev: Some(value_ev),
            value_equity: Some(value_equity),
            basis,
            multiple_used,
            confidence,
            inputs,
        }
    }

    /// Null output for a model that does not apply to this company
    pub fn inapplicable(
        model_key: ModelKey,
        basis: impl Into<String>,
        reason: impl Into<String>,
        inputs: ValuationInputs,
    ) -> Self {
        Self {
            model_key,
            model_name: model_key.display_name().to_string(),
            value_ev: None,
            value_equity: None,
            basis: basis.into(),
            multiple_used: None,
            confidence: 0,
            inputs: inputs.with_reason(reason),
        }
    }

    /// Null output standing in for a failed computation
    ///
    /// Keeps the provenance of the assumptions that were in effect.
    pub fn failed(
        model_key: ModelKey,
        error: &ValuationError,
        assumptions: &ValuationAssumptions,
    ) -> Self {
        let message = error.to_string();
        Self {
            model_key,
            model_name: model_key.display_name().to_string(),
            value_ev: None,
            value_equity: None,
            basis: format!("Error: {}", message),
            multiple_used: None,
            confidence: 0,
            inputs: ValuationInputs {
                error: Some(message),
                ..ValuationInputs::new(assumptions)
            },
        }
    }

    /// Whether the model produced an estimate
    pub fn has_value(&self) -> bool {
        self.value_ev.is_some() && self.value_equity.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.inputs.error.is_some()
    }
}

/// Run one model
pub fn compute(
    model: ModelKey,
    profile: &CompanyProfile,
    assumptions: &ValuationAssumptions,
) -> Result<ValuationOutput> {
    match model {
        ModelKey::RevenueMultiple => RevenueMultipleModel::compute(profile, assumptions),
        ModelKey::EbitdaMultiple => EbitdaMultipleModel::compute(profile, assumptions),
        ModelKey::EarningsMultiple => EarningsMultipleModel::compute(profile, assumptions),
        ModelKey::DcfLite => DcfLiteModel::compute(profile, assumptions),
        ModelKey::HybridScore => HybridScoreModel::compute(profile, assumptions),
    }
}

/// Multiples must be finite and non-negative
pub(crate) fn validate_multiple(model: ModelKey, field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValuationError::InvalidAssumption { model, field, value })
    }
}

/// Fail on NaN or infinite results instead of reporting them
pub(crate) fn ensure_finite(model: ModelKey, quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValuationError::NonFiniteValue { model, quantity })
    }
}
