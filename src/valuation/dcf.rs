//! DCF-lite model
//!
//! A three-year discounted cash flow approximation with net profit standing in
//! for free cash flow and a terminal value taken as a multiple of the year-4
//! cash flow.

use super::constants::{
    clamp_confidence, CONFIDENCE_LARGE_REVENUE, DCF_GROWTH_CAP, DCF_PROJECTION_YEARS,
    DCF_REASONABLE_GROWTH, DEFAULT_DISCOUNT_RATE, DEFAULT_TERMINAL_MULTIPLE,
};
use super::net_debt::{compute_net_debt, NetDebtMethod};
use super::{ensure_finite, validate_multiple, ValuationInputs, ValuationOutput};
use crate::assumptions::ValuationAssumptions;
use crate::error::{Result, ValuationError};
use crate::profile::CompanyProfile;
use crate::types::{ModelKey, Money, Ratio};

pub const NEGATIVE_CASH_FLOW_BASIS: &str = "Cannot value company with negative cash flow using DCF";
pub const NEGATIVE_CASH_FLOW_REASON: &str = "Negative or zero cash flow";

/// Present values of a DCF-lite projection
#[derive(Debug, Clone, PartialEq)]
pub struct DcfProjection {
    /// Discounted cash flows for years 1..=3
    pub discounted_flows: Vec<Money>,
    /// Undiscounted terminal value at year 4
    pub terminal_value: Money,
    pub discounted_terminal: Money,
}

impl DcfProjection {
    /// Project and discount `base_cash_flow` growing at `growth`
    pub fn project(base_cash_flow: Money, growth: Ratio, discount_rate: Ratio, terminal_multiple: f64) -> Self {
        let discounted_flows = (1..=DCF_PROJECTION_YEARS)
            .map(|year| {
                let flow = base_cash_flow * (1.0 + growth).powi(year);
                flow / (1.0 + discount_rate).powi(year)
            })
            .collect();

        let terminal_year = DCF_PROJECTION_YEARS + 1;
        let terminal_value = base_cash_flow * (1.0 + growth).powi(terminal_year) * terminal_multiple;
        let discounted_terminal = terminal_value / (1.0 + discount_rate).powi(terminal_year);

        Self {
            discounted_flows,
            terminal_value,
            discounted_terminal,
        }
    }

    /// Enterprise value: discounted flows plus discounted terminal value
    pub fn enterprise_value(&self) -> Money {
        self.discounted_flows.iter().sum::<Money>() + self.discounted_terminal
    }
}

#[derive(Debug, Clone)]
pub struct DcfLiteModel;

impl DcfLiteModel {
    pub const KEY: ModelKey = ModelKey::DcfLite;

    pub fn compute(
        profile: &CompanyProfile,
        assumptions: &ValuationAssumptions,
    ) -> Result<ValuationOutput> {
        let base_cash_flow = profile.net_profit;
        if base_cash_flow <= 0.0 {
            let inputs = ValuationInputs::new(assumptions).figure("base_cash_flow", base_cash_flow);
            return Ok(ValuationOutput::inapplicable(
                Self::KEY,
                NEGATIVE_CASH_FLOW_BASIS,
                NEGATIVE_CASH_FLOW_REASON,
                inputs,
            ));
        }

        let discount_rate = assumptions.discount_rate.unwrap_or(DEFAULT_DISCOUNT_RATE);
        if !discount_rate.is_finite() || discount_rate <= -1.0 {
            return Err(ValuationError::InvalidAssumption {
                model: Self::KEY,
                field: "discount_rate",
                value: discount_rate,
            });
        }
        let terminal_multiple = validate_multiple(
            Self::KEY,
            "terminal_multiple",
            assumptions.terminal_multiple.unwrap_or(DEFAULT_TERMINAL_MULTIPLE),
        )?;

        // Growth is capped; extrapolating higher rates is not credible
        let growth = profile.revenue_growth.min(DCF_GROWTH_CAP);
        let projection = DcfProjection::project(base_cash_flow, growth, discount_rate, terminal_multiple);
        let net_debt = compute_net_debt(profile, assumptions);

        let ev = ensure_finite(Self::KEY, "enterprise value", projection.enterprise_value())?;
        let equity = ensure_finite(Self::KEY, "equity value", ev - net_debt.net_debt)?;

        let confidence = Self::confidence(profile, growth, net_debt.method);
        let basis = format!(
            "3-year DCF on net profit {:.0}: growth {:.1}%, discount rate {:.1}%, terminal {:.2}x year-4 cash flow; EV {:.0}; equity = EV − net debt {:.0} ({})",
            base_cash_flow,
            growth * 100.0,
            discount_rate * 100.0,
            terminal_multiple,
            ev,
            net_debt.net_debt,
            net_debt.source
        );

        let mut inputs = ValuationInputs::new(assumptions)
            .figure("base_cash_flow", base_cash_flow)
            .figure("growth_rate", growth)
            .figure("discount_rate", discount_rate)
            .figure("terminal_multiple", terminal_multiple)
            .figure("terminal_value", projection.terminal_value)
            .figure("pv_terminal", projection.discounted_terminal);
        for (idx, pv) in projection.discounted_flows.iter().enumerate() {
            inputs = inputs.figure(&format!("pv_year_{}", idx + 1), *pv);
        }
        let inputs = inputs.with_net_debt(net_debt);

        Ok(ValuationOutput::valued(
            Self::KEY,
            ev,
            equity,
            basis,
            Some(terminal_multiple),
            confidence,
            inputs,
        ))
    }

    fn confidence(profile: &CompanyProfile, growth: Ratio, method: NetDebtMethod) -> u8 {
        let mut score = 50;
        if profile.net_profit_margin > 0.05 {
            score += 15;
        }
        let (low, high) = DCF_REASONABLE_GROWTH;
        if growth > low && growth < high {
            score += 10;
        }
        if profile.revenue > CONFIDENCE_LARGE_REVENUE {
            score += 10;
        }
        if method == NetDebtMethod::Zero {
            score -= 5;
        }
        clamp_confidence(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::RawCompanyRecord;
    use approx::assert_relative_eq;

    fn profile(net_profit: f64, growth: f64) -> CompanyProfile {
        CompanyProfile::from_record(&RawCompanyRecord {
            revenue: Some(10_000.0),
            net_profit: Some(net_profit),
            revenue_growth: Some(growth),
            net_profit_margin: Some(net_profit / 10_000.0),
            ..Default::default()
        })
    }

    #[test]
    fn test_projection_without_growth() {
        let projection = DcfProjection::project(100.0, 0.0, 0.10, 8.0);

        assert_relative_eq!(projection.discounted_flows[0], 100.0 / 1.1, epsilon = 1e-9);
        assert_relative_eq!(projection.discounted_flows[2], 100.0 / 1.1_f64.powi(3), epsilon = 1e-9);
        assert_relative_eq!(projection.terminal_value, 800.0, epsilon = 1e-9);
        assert_relative_eq!(projection.discounted_terminal, 800.0 / 1.1_f64.powi(4), epsilon = 1e-9);
    }

    #[test]
    fn test_dcf_value() {
        let assumptions = ValuationAssumptions::built_in(ModelKey::DcfLite);

        let output = DcfLiteModel::compute(&profile(1_000.0, 0.08), &assumptions).unwrap();

        let g: f64 = 0.08;
        let expected: f64 = (1..=3)
            .map(|y| 1_000.0 * (1.0 + g).powi(y) / 1.1_f64.powi(y))
            .sum::<f64>()
            + 1_000.0 * (1.0 + g).powi(4) * 8.0 / 1.1_f64.powi(4);

        assert_relative_eq!(output.value_ev.unwrap(), expected, epsilon = 1e-6);
        assert_relative_eq!(output.value_equity.unwrap(), expected - 2_000.0, epsilon = 1e-6);
        // 50 + 15 (margin 10%) + 10 (growth in band)
        assert_eq!(output.confidence, 75);
        assert_eq!(output.multiple_used, Some(8.0));
        assert!(output.inputs.figures.contains_key("pv_year_3"));
    }

    #[test]
    fn test_growth_is_capped() {
        let assumptions = ValuationAssumptions::built_in(ModelKey::DcfLite);

        let capped = DcfLiteModel::compute(&profile(1_000.0, 0.80), &assumptions).unwrap();
        let at_cap = DcfLiteModel::compute(&profile(1_000.0, 0.15), &assumptions).unwrap();

        assert_eq!(capped.value_ev, at_cap.value_ev);
        assert_eq!(capped.inputs.figures["growth_rate"], 0.15);
    }

    #[test]
    fn test_unprofitable_is_null() {
        let assumptions = ValuationAssumptions::built_in(ModelKey::DcfLite);

        let output = DcfLiteModel::compute(&profile(-500.0, 0.1), &assumptions).unwrap();

        assert!(output.value_ev.is_none() && output.value_equity.is_none());
        assert_eq!(output.confidence, 0);
        assert_eq!(output.inputs.reason.as_deref(), Some(NEGATIVE_CASH_FLOW_REASON));
    }

    #[test]
    fn test_invalid_discount_rate() {
        let mut assumptions = ValuationAssumptions::built_in(ModelKey::DcfLite);
        assumptions.discount_rate = Some(-1.0);

        let err = DcfLiteModel::compute(&profile(1_000.0, 0.05), &assumptions).unwrap_err();
        assert!(err.to_string().contains("discount_rate"));
    }
}
