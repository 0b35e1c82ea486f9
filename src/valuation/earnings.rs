//! Earnings multiple (P/E analogue) model

use super::constants::{clamp_confidence, CONFIDENCE_SMALL_REVENUE, DEFAULT_EARNINGS_MULTIPLE};
use super::net_debt::compute_net_debt;
use super::{ensure_finite, validate_multiple, ValuationInputs, ValuationOutput};
use crate::assumptions::ValuationAssumptions;
use crate::error::Result;
use crate::profile::CompanyProfile;
use crate::types::ModelKey;

pub const UNPROFITABLE_BASIS: &str = "Cannot value unprofitable company using earnings multiple";
pub const UNPROFITABLE_REASON: &str = "Negative or zero net profit";

/// `equity = net profit × multiple`, `EV = equity + net debt`
///
/// Only applies to profitable companies.
#[derive(Debug, Clone)]
pub struct EarningsMultipleModel;

impl EarningsMultipleModel {
    pub const KEY: ModelKey = ModelKey::EarningsMultiple;

    pub fn compute(
        profile: &CompanyProfile,
        assumptions: &ValuationAssumptions,
    ) -> Result<ValuationOutput> {
        if !profile.is_profitable() {
            let inputs = ValuationInputs::new(assumptions).figure("net_profit", profile.net_profit);
            return Ok(ValuationOutput::inapplicable(
                Self::KEY,
                UNPROFITABLE_BASIS,
                UNPROFITABLE_REASON,
                inputs,
            ));
        }

        let multiple = validate_multiple(
            Self::KEY,
            "earnings_multiple",
            assumptions.earnings_multiple.unwrap_or(DEFAULT_EARNINGS_MULTIPLE),
        )?;
        let net_debt = compute_net_debt(profile, assumptions);

        let equity = ensure_finite(Self::KEY, "equity value", profile.net_profit * multiple)?;
        let ev = ensure_finite(Self::KEY, "enterprise value", equity + net_debt.net_debt)?;

        let confidence = Self::confidence(profile);
        let basis = format!(
            "Net profit {:.0} × {:.2}x = equity {:.0}; EV = equity + net debt {:.0} ({})",
            profile.net_profit, multiple, equity, net_debt.net_debt, net_debt.source
        );
        let inputs = ValuationInputs::new(assumptions)
            .figure("net_profit", profile.net_profit)
            .figure("net_profit_margin", profile.net_profit_margin)
            .figure("revenue", profile.revenue)
            .figure("multiple", multiple)
            .with_net_debt(net_debt);

        Ok(ValuationOutput::valued(
            Self::KEY,
            ev,
            equity,
            basis,
            Some(multiple),
            confidence,
            inputs,
        ))
    }

    fn confidence(profile: &CompanyProfile) -> u8 {
        let mut score = 70;
        if profile.net_profit_margin > 0.05 {
            score += 15;
        }
        if profile.net_profit_margin > 0.10 {
            score += 10;
        }
        if profile.revenue_growth > 0.10 {
            score += 10;
        }
        if profile.revenue < CONFIDENCE_SMALL_REVENUE {
            score -= 10;
        }
        clamp_confidence(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::RawCompanyRecord;
    use approx::assert_relative_eq;

    fn profile(net_profit: f64, margin: f64, revenue: f64) -> CompanyProfile {
        CompanyProfile::from_record(&RawCompanyRecord {
            revenue: Some(revenue),
            net_profit: Some(net_profit),
            net_profit_margin: Some(margin),
            ..Default::default()
        })
    }

    #[test]
    fn test_earnings_multiple() {
        let assumptions = ValuationAssumptions::built_in(ModelKey::EarningsMultiple);

        let output = EarningsMultipleModel::compute(&profile(1_000.0, 0.1, 10_000.0), &assumptions).unwrap();

        assert_relative_eq!(output.value_equity.unwrap(), 8_000.0, epsilon = 1e-9);
        assert_relative_eq!(output.value_ev.unwrap(), 10_000.0, epsilon = 1e-9);
        // 70 + 15 (margin > 5%) - 10 (small revenue)
        assert_eq!(output.confidence, 75);
    }

    #[test]
    fn test_unprofitable_is_null() {
        let assumptions = ValuationAssumptions::built_in(ModelKey::EarningsMultiple);

        for net_profit in [0.0, -500.0] {
            let output =
                EarningsMultipleModel::compute(&profile(net_profit, 0.0, 10_000.0), &assumptions).unwrap();
            assert!(output.value_ev.is_none());
            assert!(output.value_equity.is_none());
            assert_eq!(output.confidence, 0);
            assert_eq!(output.basis, UNPROFITABLE_BASIS);
            assert_eq!(output.inputs.reason.as_deref(), Some(UNPROFITABLE_REASON));
        }
    }

    #[test]
    fn test_confidence_caps_at_100() {
        let assumptions = ValuationAssumptions::built_in(ModelKey::EarningsMultiple);
        let mut p = profile(3_000_000.0, 0.2, 15_000_000.0);
        p.revenue_growth = 0.3;

        let output = EarningsMultipleModel::compute(&p, &assumptions).unwrap();
        // 70 + 15 + 10 + 10 = 105 -> 100
        assert_eq!(output.confidence, 100);
    }
}
