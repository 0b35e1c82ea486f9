//! Net debt estimation
//!
//! Bridges enterprise value and equity value. The policy is chosen per model
//! by its assumption set, so net debt is recomputed for every model run.

use crate::assumptions::ValuationAssumptions;
use crate::profile::CompanyProfile;
use crate::types::Money;
use crate::valuation::constants::{DEFAULT_NET_DEBT_K_EBITDA, DEFAULT_NET_DEBT_K_REVENUE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Net debt policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum NetDebtMethod {
    /// Absolute figure from `net_debt_direct`
    Direct,
    /// `revenue × k`
    RatioRevenue,
    /// `ebitda × k`, with EBITDA proxied from the EBIT margin when missing
    RatioEbitda,
    /// No net debt
    Zero,
}

impl NetDebtMethod {
    /// Parse a stored method name; unknown names fall back to `Zero`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "direct" => NetDebtMethod::Direct,
            "ratio_revenue" => NetDebtMethod::RatioRevenue,
            "ratio_ebitda" => NetDebtMethod::RatioEbitda,
            _ => NetDebtMethod::Zero,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetDebtMethod::Direct => "direct",
            NetDebtMethod::RatioRevenue => "ratio_revenue",
            NetDebtMethod::RatioEbitda => "ratio_ebitda",
            NetDebtMethod::Zero => "zero",
        }
    }
}

impl From<String> for NetDebtMethod {
    fn from(s: String) -> Self {
        NetDebtMethod::parse(&s)
    }
}

impl fmt::Display for NetDebtMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a net debt estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetDebtCalculation {
    pub net_debt: Money,
    pub method: NetDebtMethod,
    /// Human-readable derivation, e.g. `revenue × 0.2`
    pub source: String,
}

/// Estimate net debt for a profile under the given assumptions
pub fn compute_net_debt(
    profile: &CompanyProfile,
    assumptions: &ValuationAssumptions,
) -> NetDebtCalculation {
    let method = assumptions.net_debt_method;

    match method {
        NetDebtMethod::Direct => {
            let net_debt = assumptions.net_debt_direct.unwrap_or(0.0);
            NetDebtCalculation {
                net_debt,
                method,
                source: format!("direct {}", net_debt),
            }
        }
        NetDebtMethod::RatioRevenue => {
            let k = assumptions.net_debt_k.unwrap_or(DEFAULT_NET_DEBT_K_REVENUE);
            NetDebtCalculation {
                net_debt: profile.revenue * k,
                method,
                source: format!("revenue × {}", k),
            }
        }
        NetDebtMethod::RatioEbitda => {
            let k = assumptions.net_debt_k.unwrap_or(DEFAULT_NET_DEBT_K_EBITDA);
            let (ebitda, label) = match profile.ebitda {
                Some(ebitda) => (ebitda, "ebitda"),
                None => (profile.revenue * profile.ebit_margin, "(revenue × ebit margin)"),
            };
            NetDebtCalculation {
                net_debt: ebitda * k,
                method,
                source: format!("{} × {}", label, k),
            }
        }
        NetDebtMethod::Zero => NetDebtCalculation {
            net_debt: 0.0,
            method,
            source: "zero".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::RawCompanyRecord;
    use crate::types::ModelKey;
    use approx::assert_relative_eq;

    fn profile(ebitda: Option<f64>) -> CompanyProfile {
        CompanyProfile::from_record(&RawCompanyRecord {
            revenue: Some(10_000.0),
            net_profit: Some(1_000.0),
            ebitda,
            ebit_margin: Some(0.12),
            ..Default::default()
        })
    }

    fn assumptions(method: NetDebtMethod, k: Option<f64>, direct: Option<f64>) -> ValuationAssumptions {
        let mut assumptions = ValuationAssumptions::built_in(ModelKey::RevenueMultiple);
        assumptions.net_debt_method = method;
        assumptions.net_debt_k = k;
        assumptions.net_debt_direct = direct;
        assumptions
    }

    #[test]
    fn test_ratio_revenue() {
        let calc = compute_net_debt(&profile(None), &assumptions(NetDebtMethod::RatioRevenue, Some(0.2), None));
        assert_relative_eq!(calc.net_debt, 2_000.0, epsilon = 1e-9);
        assert_eq!(calc.method, NetDebtMethod::RatioRevenue);
        assert_eq!(calc.source, "revenue × 0.2");
    }

    #[test]
    fn test_ratio_revenue_default_k() {
        let calc = compute_net_debt(&profile(None), &assumptions(NetDebtMethod::RatioRevenue, None, None));
        assert_relative_eq!(calc.net_debt, 2_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ratio_ebitda_uses_reported_ebitda() {
        let calc = compute_net_debt(&profile(Some(1_500.0)), &assumptions(NetDebtMethod::RatioEbitda, None, None));
        assert_relative_eq!(calc.net_debt, 750.0, epsilon = 1e-9);
        assert_eq!(calc.source, "ebitda × 0.5");
    }

    #[test]
    fn test_ratio_ebitda_proxies_missing_ebitda() {
        let calc = compute_net_debt(&profile(None), &assumptions(NetDebtMethod::RatioEbitda, Some(1.0), None));
        assert_relative_eq!(calc.net_debt, 1_200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_direct() {
        let calc = compute_net_debt(&profile(None), &assumptions(NetDebtMethod::Direct, None, Some(-350.0)));
        assert_eq!(calc.net_debt, -350.0);

        let calc = compute_net_debt(&profile(None), &assumptions(NetDebtMethod::Direct, None, None));
        assert_eq!(calc.net_debt, 0.0);
    }

    #[test]
    fn test_zero() {
        let calc = compute_net_debt(&profile(None), &assumptions(NetDebtMethod::Zero, Some(0.9), Some(100.0)));
        assert_eq!(calc.net_debt, 0.0);
        assert_eq!(calc.method, NetDebtMethod::Zero);
    }

    #[test]
    fn test_unknown_method_falls_back_to_zero() {
        assert_eq!(NetDebtMethod::parse("book_value"), NetDebtMethod::Zero);
        assert_eq!(NetDebtMethod::parse("RATIO_EBITDA"), NetDebtMethod::RatioEbitda);

        let method: NetDebtMethod = serde_json::from_str("\"something_else\"").unwrap();
        assert_eq!(method, NetDebtMethod::Zero);
        assert_eq!(serde_json::to_string(&NetDebtMethod::RatioRevenue).unwrap(), "\"ratio_revenue\"");
    }

    #[test]
    fn test_compute_net_debt_is_pure() {
        let p = profile(None);
        for method in [
            NetDebtMethod::Direct,
            NetDebtMethod::RatioRevenue,
            NetDebtMethod::RatioEbitda,
            NetDebtMethod::Zero,
        ] {
            let a = assumptions(method, Some(0.3), Some(42.0));
            assert_eq!(compute_net_debt(&p, &a), compute_net_debt(&p, &a));
        }
    }
}
