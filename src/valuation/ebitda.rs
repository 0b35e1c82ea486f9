//! EBITDA multiple model

use super::constants::{clamp_confidence, CONFIDENCE_LARGE_REVENUE, DEFAULT_EBITDA_MULTIPLE};
use super::net_debt::{compute_net_debt, NetDebtMethod};
use super::{ensure_finite, validate_multiple, ValuationInputs, ValuationOutput};
use crate::assumptions::ValuationAssumptions;
use crate::error::Result;
use crate::profile::CompanyProfile;
use crate::types::ModelKey;

/// Reason recorded when EBITDA had to be approximated
pub const EBITDA_PROXY_REASON: &str = "EBITDA not reported; proxied as revenue × EBIT margin";

/// `EV = EBITDA × multiple`, `equity = EV − net debt`
///
/// Uses reported EBITDA when available, otherwise `revenue × ebit_margin`.
#[derive(Debug, Clone)]
pub struct EbitdaMultipleModel;

impl EbitdaMultipleModel {
    pub const KEY: ModelKey = ModelKey::EbitdaMultiple;

    pub fn compute(
        profile: &CompanyProfile,
        assumptions: &ValuationAssumptions,
    ) -> Result<ValuationOutput> {
        let multiple = validate_multiple(
            Self::KEY,
            "ebitda_multiple",
            assumptions.ebitda_multiple.unwrap_or(DEFAULT_EBITDA_MULTIPLE),
        )?;
        let reported = profile.has_reported_ebitda();
        let ebitda = profile.ebitda_or_proxy();
        let net_debt = compute_net_debt(profile, assumptions);

        let ev = ensure_finite(Self::KEY, "enterprise value", ebitda * multiple)?;
        let equity = ensure_finite(Self::KEY, "equity value", ev - net_debt.net_debt)?;

        let confidence = Self::confidence(profile, ebitda, reported, net_debt.method);
        let ebitda_label = if reported { "EBITDA" } else { "Proxy EBITDA" };
        let basis = format!(
            "{} {:.0} × {:.2}x = EV {:.0}; equity = EV − net debt {:.0} ({})",
            ebitda_label, ebitda, multiple, ev, net_debt.net_debt, net_debt.source
        );

        let mut inputs = ValuationInputs::new(assumptions)
            .figure("ebitda", ebitda)
            .figure("revenue", profile.revenue)
            .figure("multiple", multiple)
            .with_net_debt(net_debt);
        if !reported {
            inputs = inputs
                .figure("ebit_margin", profile.ebit_margin)
                .with_reason(EBITDA_PROXY_REASON);
        }

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

    fn confidence(profile: &CompanyProfile, ebitda: f64, reported: bool, method: NetDebtMethod) -> u8 {
        let mut score = 60;
        score += if reported { 15 } else { -10 };
        if ebitda > 0.0 {
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

    fn profile(ebitda: Option<f64>) -> CompanyProfile {
        CompanyProfile::from_record(&RawCompanyRecord {
            revenue: Some(10_000.0),
            net_profit: Some(1_000.0),
            ebitda,
            ebit_margin: Some(0.12),
            revenue_growth: Some(0.08),
            ..Default::default()
        })
    }

    #[test]
    fn test_proxy_ebitda() {
        let mut assumptions = ValuationAssumptions::built_in(ModelKey::EbitdaMultiple);
        assumptions.net_debt_k = Some(0.2);

        let output = EbitdaMultipleModel::compute(&profile(None), &assumptions).unwrap();

        assert_relative_eq!(output.value_ev.unwrap(), 7_200.0, epsilon = 1e-9);
        assert_relative_eq!(output.value_equity.unwrap(), 5_200.0, epsilon = 1e-9);
        assert_eq!(output.inputs.reason.as_deref(), Some(EBITDA_PROXY_REASON));
        // 60 - 10 (proxy) + 10 (positive)
        assert_eq!(output.confidence, 60);
    }

    #[test]
    fn test_reported_ebitda() {
        let assumptions = ValuationAssumptions::built_in(ModelKey::EbitdaMultiple);

        let output = EbitdaMultipleModel::compute(&profile(Some(1_500.0)), &assumptions).unwrap();

        assert_relative_eq!(output.value_ev.unwrap(), 9_000.0, epsilon = 1e-9);
        assert!(output.inputs.reason.is_none());
        assert_eq!(output.confidence, 85);
        assert!(output.basis.starts_with("EBITDA 1500"));
    }

    #[test]
    fn test_negative_ebitda_still_valued() {
        let mut assumptions = ValuationAssumptions::built_in(ModelKey::EbitdaMultiple);
        assumptions.net_debt_method = NetDebtMethod::Zero;

        let output = EbitdaMultipleModel::compute(&profile(Some(-400.0)), &assumptions).unwrap();

        assert_relative_eq!(output.value_ev.unwrap(), -2_400.0, epsilon = 1e-9);
        // 60 + 15 (reported) - 5 (zero net debt)
        assert_eq!(output.confidence, 70);
    }
}
