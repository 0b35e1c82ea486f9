//! Hybrid score-adjusted model
//!
//! Runs the four base models with the hybrid assumption set and blends the
//! estimates that came back non-null. Weights start from
//! [`HYBRID_BASE_WEIGHTS`] and are shifted by the company's profitability,
//! growth and margin before being normalized to sum to one.

use super::constants::{HYBRID_BASE_WEIGHTS, HYBRID_WEIGHT_STEP};
use super::{compute, ensure_finite, ValuationInputs, ValuationOutput};
use crate::assumptions::ValuationAssumptions;
use crate::error::Result;
use crate::profile::CompanyProfile;
use crate::types::ModelKey;
use std::collections::BTreeMap;

pub const ALL_NULL_BASIS: &str = "No individual model produced a value";
pub const ALL_NULL_REASON: &str = "All individual models returned null values";

const REVENUE: usize = 0;
const EBITDA: usize = 1;
const EARNINGS: usize = 2;
const DCF: usize = 3;

/// Normalized blend weights for the four base models
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridWeights {
    /// Weights in `ModelKey::BASE` order, summing to 1
    pub weights: [f64; 4],
    /// True when an adjustment drove a weight negative and it was clamped to 0
    pub clamped: bool,
}

impl HybridWeights {
    /// Base weights → rule adjustments → clamp → normalize
    pub fn for_profile(profile: &CompanyProfile) -> Self {
        let step = HYBRID_WEIGHT_STEP;
        let mut w = HYBRID_BASE_WEIGHTS;

        if profile.net_profit <= 0.0 {
            w[EARNINGS] = 0.0;
            w[DCF] = 0.0;
            w[REVENUE] += step;
            w[EBITDA] += step;
        } else {
            w[EARNINGS] += step;
            w[DCF] += step;
        }

        if profile.revenue_growth > 0.15 {
            w[REVENUE] += step;
            w[EBITDA] += step;
            w[EARNINGS] -= step;
            w[DCF] -= step;
        }

        if profile.net_profit_margin > 0.1 {
            w[EARNINGS] += step;
            w[DCF] += step;
            w[REVENUE] -= step;
            w[EBITDA] -= step;
        }

        // Stacked rules can push a weight below zero (e.g. unprofitable and
        // high growth); a negative weight has no meaning in a blend.
        let mut clamped = false;
        for weight in w.iter_mut() {
            if *weight < 0.0 {
                *weight = 0.0;
                clamped = true;
            }
        }

        let total: f64 = w.iter().sum();
        if total > 0.0 {
            for weight in w.iter_mut() {
                *weight /= total;
            }
        } else {
            w = HYBRID_BASE_WEIGHTS;
        }

        Self { weights: w, clamped }
    }

    /// Weight of a base model; 0 for the hybrid itself
    pub fn get(&self, model: ModelKey) -> f64 {
        ModelKey::BASE
            .iter()
            .position(|m| *m == model)
            .map(|idx| self.weights[idx])
            .unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn as_map(&self) -> BTreeMap<ModelKey, f64> {
        ModelKey::BASE
            .iter()
            .zip(self.weights.iter())
            .map(|(model, weight)| (*model, *weight))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct HybridScoreModel;

impl HybridScoreModel {
    pub const KEY: ModelKey = ModelKey::HybridScore;

    pub fn compute(
        profile: &CompanyProfile,
        assumptions: &ValuationAssumptions,
    ) -> Result<ValuationOutput> {
        let sub_outputs = ModelKey::BASE
            .iter()
            .map(|model| compute(*model, profile, &assumptions.for_model(*model)))
            .collect::<Result<Vec<_>>>()?;

        Self::blend(profile, assumptions, &sub_outputs)
    }

    /// Blend already computed base-model outputs
    pub fn blend(
        profile: &CompanyProfile,
        assumptions: &ValuationAssumptions,
        sub_outputs: &[ValuationOutput],
    ) -> Result<ValuationOutput> {
        let weights = HybridWeights::for_profile(profile);
        if weights.clamped {
            log::warn!(
                "Hybrid weights for {} clamped to zero after adjustment",
                profile.orgnr
            );
        }

        let mut inputs = ValuationInputs::new(assumptions);
        inputs.weights = Some(weights.as_map());
        inputs.weights_clamped = weights.clamped;

        let mut weight_sum = 0.0;
        let mut ev_sum = 0.0;
        let mut equity_sum = 0.0;
        let mut confidences = Vec::new();

        for output in sub_outputs {
            let (Some(ev), Some(equity)) = (output.value_ev, output.value_equity) else {
                continue;
            };
            let weight = weights.get(output.model_key);
            let key = output.model_key.as_str();
            inputs = inputs
                .figure(&format!("{}_ev", key), ev)
                .figure(&format!("{}_equity", key), equity);

            weight_sum += weight;
            ev_sum += weight * ev;
            equity_sum += weight * equity;
            confidences.push(output.confidence as f64);
        }

        if confidences.is_empty() || weight_sum <= 0.0 {
            return Ok(ValuationOutput::inapplicable(
                Self::KEY,
                ALL_NULL_BASIS,
                ALL_NULL_REASON,
                inputs,
            ));
        }

        let ev = ensure_finite(Self::KEY, "enterprise value", ev_sum / weight_sum)?;
        let equity = ensure_finite(Self::KEY, "equity value", equity_sum / weight_sum)?;
        let confidence =
            (confidences.iter().sum::<f64>() / confidences.len() as f64).round() as u8;

        let weight_list = ModelKey::BASE
            .iter()
            .map(|model| format!("{} {:.1}%", model.display_name(), weights.get(*model) * 100.0))
            .collect::<Vec<_>>()
            .join(", ");
        let basis = format!(
            "Weighted average of {} model(s) [{}]; EV {:.0}, equity {:.0}",
            confidences.len(),
            weight_list,
            ev,
            equity
        );
        let inputs = inputs.figure("included_weight", weight_sum);

        Ok(ValuationOutput::valued(
            Self::KEY,
            ev,
            equity,
            basis,
            None,
            confidence,
            inputs,
        ))
    }
}
