//! Company profiles
//!
//! Normalizes a raw financial record, as delivered by the data-enrichment
//! layer, into a canonical [`CompanyProfile`] with size and growth buckets and
//! a normalized industry label. Building a profile never fails: missing
//! numeric fields default to zero.

use crate::types::{GrowthBucket, Money, OrgNr, Ratio, SizeBucket};
use crate::valuation::constants::{FALLBACK_INDUSTRY, TECH_INDUSTRY};
use serde::{Deserialize, Serialize};

/// Raw company record with every figure optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCompanyRecord {
    #[serde(default)]
    pub orgnr: OrgNr,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "industryLabel", alias = "industry_label")]
    pub industry: Option<String>,
    pub revenue: Option<Money>,
    #[serde(alias = "netProfit")]
    pub net_profit: Option<Money>,
    pub ebitda: Option<Money>,
    #[serde(alias = "revenueGrowth")]
    pub revenue_growth: Option<Ratio>,
    #[serde(alias = "ebitMargin")]
    pub ebit_margin: Option<Ratio>,
    #[serde(alias = "netProfitMargin")]
    pub net_profit_margin: Option<Ratio>,
    /// Headcount as delivered; fractional or negative values are tolerated
    pub employees: Option<f64>,
    /// Yearly revenue, oldest first
    #[serde(default, alias = "historicalRevenue")]
    pub historical_revenue: Vec<Money>,
    /// Yearly net profit, oldest first
    #[serde(default, alias = "historicalProfit")]
    pub historical_profit: Vec<Money>,
}

/// Canonical, immutable company profile consumed by the valuation models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub orgnr: OrgNr,
    pub name: String,
    /// Normalized industry label
    pub industry: String,
    /// Industry label as delivered, before normalization
    pub raw_industry: Option<String>,
    pub size_bucket: SizeBucket,
    pub growth_bucket: GrowthBucket,
    pub revenue: Money,
    pub net_profit: Money,
    /// Reported EBITDA; `None` when it has to be proxied
    pub ebitda: Option<Money>,
    pub revenue_growth: Ratio,
    pub ebit_margin: Ratio,
    pub net_profit_margin: Ratio,
    pub employees: u32,
    pub historical_revenue: Vec<Money>,
    pub historical_profit: Vec<Money>,
}

impl CompanyProfile {
    /// Build a profile with the default industry classifier
    pub fn from_record(record: &RawCompanyRecord) -> Self {
        ProfileBuilder::new().build(record)
    }

    /// EBITDA if reported, otherwise `revenue × ebit_margin`
    pub fn ebitda_or_proxy(&self) -> Money {
        self.ebitda.unwrap_or(self.revenue * self.ebit_margin)
    }

    /// Whether EBITDA was reported rather than proxied
    pub fn has_reported_ebitda(&self) -> bool {
        self.ebitda.is_some()
    }

    pub fn is_profitable(&self) -> bool {
        self.net_profit > 0.0
    }

    /// Compound annual revenue growth over the historical series
    pub fn revenue_cagr(&self) -> Option<Ratio> {
        compound_annual_growth(&self.historical_revenue)
    }
}

/// CAGR between the first and last point of a yearly series
///
/// Returns `None` unless there are at least two points and both endpoints are
/// positive.
pub fn compound_annual_growth(series: &[Money]) -> Option<Ratio> {
    if series.len() < 2 {
        return None;
    }
    let first = series[0];
    let last = series[series.len() - 1];
    if first <= 0.0 || last <= 0.0 {
        return None;
    }
    let years = (series.len() - 1) as f64;
    Some((last / first).powf(1.0 / years) - 1.0)
}

/// One industry classification rule: if any keyword matches, use `label`
///
/// Keywords match anywhere in the lowercased label unless `whole_word` is
/// set, in which case they must equal a complete alphanumeric word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRule {
    pub label: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub whole_word: bool,
}

impl IndustryRule {
    pub fn new(label: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            label: label.into(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            whole_word: false,
        }
    }

    /// Require keywords to match whole words (e.g. `it` but not `hospitality`)
    pub fn whole_words(mut self) -> Self {
        self.whole_word = true;
        self
    }

    fn matches(&self, normalized: &str) -> bool {
        self.keywords
            .iter()
            .filter(|keyword| !keyword.is_empty())
            .any(|keyword| {
                if self.whole_word {
                    normalized
                        .split(|c: char| !c.is_alphanumeric())
                        .any(|word| word == keyword)
                } else {
                    normalized.contains(keyword.as_str())
                }
            })
    }
}

/// Keyword-based industry normalizer
///
/// Rules are tried in order and the first match wins. Labels that match no
/// rule, or that are missing, fall back to `fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryClassifier {
    rules: Vec<IndustryRule>,
    fallback: String,
}

impl Default for IndustryClassifier {
    fn default() -> Self {
        Self {
            rules: vec![IndustryRule::new(
                TECH_INDUSTRY,
                &["teknik", "it", "software", "digital"],
            )],
            fallback: FALLBACK_INDUSTRY.to_string(),
        }
    }
}

impl IndustryClassifier {
    pub fn new(rules: Vec<IndustryRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: IndustryRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[IndustryRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Normalize a raw industry label
    pub fn classify(&self, raw: Option<&str>) -> String {
        let normalized = match raw {
            Some(label) if !label.trim().is_empty() => label.trim().to_lowercase(),
            _ => return self.fallback.clone(),
        };

        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Builds [`CompanyProfile`]s from raw records
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    classifier: IndustryClassifier,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(classifier: IndustryClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &IndustryClassifier {
        &self.classifier
    }

    /// Normalize a raw record into a profile
    pub fn build(&self, record: &RawCompanyRecord) -> CompanyProfile {
        let revenue = record.revenue.unwrap_or(0.0);
        let revenue_growth = record
            .revenue_growth
            .or_else(|| compound_annual_growth(&record.historical_revenue))
            .unwrap_or(0.0);

        CompanyProfile {
            orgnr: record.orgnr.clone(),
            name: record.name.clone(),
            industry: self.classifier.classify(record.industry.as_deref()),
            raw_industry: record.industry.clone(),
            size_bucket: SizeBucket::from_revenue(revenue),
            growth_bucket: GrowthBucket::from_growth(revenue_growth),
            revenue,
            net_profit: record.net_profit.unwrap_or(0.0),
            ebitda: record.ebitda,
            revenue_growth,
            ebit_margin: record.ebit_margin.unwrap_or(0.0),
            net_profit_margin: record.net_profit_margin.unwrap_or(0.0),
            // saturating: negative and NaN become 0
            employees: record.employees.map(|e| e as u32).unwrap_or(0),
            historical_revenue: record.historical_revenue.clone(),
            historical_profit: record.historical_profit.clone(),
        }
    }
}
