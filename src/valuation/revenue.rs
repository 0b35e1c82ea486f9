//! Revenue multiple model

use super::constants::{clamp_confidence, CONFIDENCE_LARGE_REVENUE, DEFAULT_REVENUE_MULTIPLE};
use super::net_debt::{compute_net_debt, NetDebtMethod};
use super::{ensure_finite, validate_multiple, ValuationInputs, ValuationOutput};
use crate::assumptions::ValuationAssumptions;
use crate::error::Result;
use crate::profile::CompanyProfile;
use crate::types::ModelKey;

/// `EV = revenue × multiple`, `equity = EV − net debt`
///
/// Always applicable: every profile has a revenue figure, even if it is zero.
#[derive(Debug, Clone)]
pub struct RevenueMultipleModel;

impl RevenueMultipleModel {
    pub const KEY: ModelKey = ModelKey::RevenueMultiple;

    pub fn compute(
        profile: &CompanyProfile,
        assumptions: &ValuationAssumptions,
    ) -> Result<ValuationOutput> {
        let multiple = validate_multiple(
            Self::KEY,
            "revenue_multiple",
            assumptions.revenue_multiple.unwrap_or(DEFAULT_REVENUE_MULTIPLE),
        )?;
        let net_debt = compute_net_debt(profile, assumptions);

        let ev = ensure_finite(Self::KEY, "enterprise value", profile.revenue * multiple)?;
        let equity = ensure_finite(Self::KEY, "equity value", ev - net_debt.net_debt)?;

        let confidence = Self::confidence(profile, net_debt.method);
        let basis = format!(
            "Revenue {:.0} × {:.2}x = EV {:.0}; equity = EV − net debt {:.0} ({})",
            profile.revenue, multiple, ev, net_debt.net_debt, net_debt.source
        );
        let inputs = ValuationInputs::new(assumptions)
            .figure("revenue", profile.revenue)
            .figure("revenue_growth", profile.revenue_growth)
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

    fn confidence(profile: &CompanyProfile, method: NetDebtMethod) -> u8 {
        let mut score = 70;
        if profile.revenue > CONFIDENCE_LARGE_REVENUE {
            score += 10;
        }
        if profile.revenue_growth > 0.10 {
            score += 10;
        }
        if method == NetDebtMethod::Zero {
            score -= 5;
        }
        clamp_confidence(score)
    }
}
