//! Core types and classification buckets

use crate::error::{Result, ValuationError};
use crate::valuation::constants::{
    HIGH_GROWTH_THRESHOLD, LARGE_REVENUE_THRESHOLD, MEDIUM_GROWTH_THRESHOLD,
    MEDIUM_REVENUE_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money type. All monetary fields of one profile share a single currency unit.
pub type Money = f64;

/// Ratio type (0.12 = 12%)
pub type Ratio = f64;

/// Organisation number identifying a company
pub type OrgNr = String;

/// Identifier of one of the five valuation models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKey {
    RevenueMultiple,
    EbitdaMultiple,
    EarningsMultiple,
    DcfLite,
    HybridScore,
}

impl ModelKey {
    /// All models in output order
    pub const ALL: [ModelKey; 5] = [
        ModelKey::RevenueMultiple,
        ModelKey::EbitdaMultiple,
        ModelKey::EarningsMultiple,
        ModelKey::DcfLite,
        ModelKey::HybridScore,
    ];

    /// The four models blended by the hybrid model
    pub const BASE: [ModelKey; 4] = [
        ModelKey::RevenueMultiple,
        ModelKey::EbitdaMultiple,
        ModelKey::EarningsMultiple,
        ModelKey::DcfLite,
    ];

    /// Parse model key from its storage identifier
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "revenue_multiple" => Ok(ModelKey::RevenueMultiple),
            "ebitda_multiple" => Ok(ModelKey::EbitdaMultiple),
            "earnings_multiple" => Ok(ModelKey::EarningsMultiple),
            "dcf_lite" => Ok(ModelKey::DcfLite),
            "hybrid_score" => Ok(ModelKey::HybridScore),
            _ => Err(ValuationError::UnknownModel(s.to_string())),
        }
    }

    /// Storage identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKey::RevenueMultiple => "revenue_multiple",
            ModelKey::EbitdaMultiple => "ebitda_multiple",
            ModelKey::EarningsMultiple => "earnings_multiple",
            ModelKey::DcfLite => "dcf_lite",
            ModelKey::HybridScore => "hybrid_score",
        }
    }

    /// Human-readable model name
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKey::RevenueMultiple => "Revenue Multiple",
            ModelKey::EbitdaMultiple => "EBITDA Multiple",
            ModelKey::EarningsMultiple => "Earnings Multiple (P/E)",
            ModelKey::DcfLite => "DCF-Lite",
            ModelKey::HybridScore => "Hybrid Score-Adjusted",
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Company size classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    /// Classify by revenue (currency-unit thousands)
    pub fn from_revenue(revenue: Money) -> Self {
        if revenue > LARGE_REVENUE_THRESHOLD {
            SizeBucket::Large
        } else if revenue > MEDIUM_REVENUE_THRESHOLD {
            SizeBucket::Medium
        } else {
            SizeBucket::Small
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(SizeBucket::Small),
            "medium" => Ok(SizeBucket::Medium),
            "large" => Ok(SizeBucket::Large),
            _ => Err(ValuationError::ParseError(format!("Unknown size bucket: {}", s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeBucket::Small => "small",
            SizeBucket::Medium => "medium",
            SizeBucket::Large => "large",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Revenue growth classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthBucket {
    Low,
    Medium,
    High,
}

impl GrowthBucket {
    /// Classify by annual revenue growth
    pub fn from_growth(revenue_growth: Ratio) -> Self {
        if revenue_growth > HIGH_GROWTH_THRESHOLD {
            GrowthBucket::High
        } else if revenue_growth > MEDIUM_GROWTH_THRESHOLD {
            GrowthBucket::Medium
        } else {
            GrowthBucket::Low
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(GrowthBucket::Low),
            "medium" => Ok(GrowthBucket::Medium),
            "high" => Ok(GrowthBucket::High),
            _ => Err(ValuationError::ParseError(format!("Unknown growth bucket: {}", s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthBucket::Low => "low",
            GrowthBucket::Medium => "medium",
            GrowthBucket::High => "high",
        }
    }
}

impl fmt::Display for GrowthBucket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_key_parse() {
        assert_eq!(ModelKey::parse("revenue_multiple").unwrap(), ModelKey::RevenueMultiple);
        assert_eq!(ModelKey::parse("DCF_LITE").unwrap(), ModelKey::DcfLite);
        assert!(ModelKey::parse("pe_ratio").is_err());
    }

    #[test]
    fn test_model_key_order() {
        let keys: Vec<&str> = ModelKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "revenue_multiple",
                "ebitda_multiple",
                "earnings_multiple",
                "dcf_lite",
                "hybrid_score"
            ]
        );
    }

    #[test]
    fn test_model_key_serde() {
        let json = serde_json::to_string(&ModelKey::HybridScore).unwrap();
        assert_eq!(json, "\"hybrid_score\"");
    }

    #[test]
    fn test_size_bucket_thresholds() {
        assert_eq!(SizeBucket::from_revenue(50_001.0), SizeBucket::Large);
        assert_eq!(SizeBucket::from_revenue(50_000.0), SizeBucket::Medium);
        assert_eq!(SizeBucket::from_revenue(10_001.0), SizeBucket::Medium);
        assert_eq!(SizeBucket::from_revenue(10_000.0), SizeBucket::Small);
        assert_eq!(SizeBucket::from_revenue(0.0), SizeBucket::Small);
    }

    #[test]
    fn test_growth_bucket_thresholds() {
        assert_eq!(GrowthBucket::from_growth(0.16), GrowthBucket::High);
        assert_eq!(GrowthBucket::from_growth(0.15), GrowthBucket::Medium);
        assert_eq!(GrowthBucket::from_growth(0.06), GrowthBucket::Medium);
        assert_eq!(GrowthBucket::from_growth(0.05), GrowthBucket::Low);
        assert_eq!(GrowthBucket::from_growth(-0.2), GrowthBucket::Low);
    }

    #[test]
    fn test_bucket_parse() {
        assert_eq!(SizeBucket::parse("Large").unwrap(), SizeBucket::Large);
        assert_eq!(GrowthBucket::parse("medium").unwrap(), GrowthBucket::Medium);
        assert!(SizeBucket::parse("huge").is_err());
        assert_eq!(GrowthBucket::High.to_string(), "high");
    }
}
