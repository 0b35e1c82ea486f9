//! Valuation constants and defaults
//!
//! Classification thresholds, confidence thresholds and the per-model default
//! multiples used when no assumption sets a value.

/// Revenue above which a company is `large` (currency-unit thousands)
pub const LARGE_REVENUE_THRESHOLD: f64 = 50_000.0;

/// Revenue above which a company is `medium` (currency-unit thousands)
pub const MEDIUM_REVENUE_THRESHOLD: f64 = 10_000.0;

/// Growth above which a company is `high` growth
pub const HIGH_GROWTH_THRESHOLD: f64 = 0.15;

/// Growth above which a company is `medium` growth
pub const MEDIUM_GROWTH_THRESHOLD: f64 = 0.05;

/// Default industry labels
pub const TECH_INDUSTRY: &str = "Teknik";
pub const FALLBACK_INDUSTRY: &str = "Tillverkning";

/// Default multiples
pub const DEFAULT_REVENUE_MULTIPLE: f64 = 1.0;
pub const DEFAULT_EBITDA_MULTIPLE: f64 = 6.0;
pub const DEFAULT_EARNINGS_MULTIPLE: f64 = 8.0;
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;
pub const DEFAULT_TERMINAL_MULTIPLE: f64 = 8.0;

/// Default net debt coefficients
pub const DEFAULT_NET_DEBT_K_REVENUE: f64 = 0.2;
pub const DEFAULT_NET_DEBT_K_EBITDA: f64 = 0.5;

/// Revenue above which models add confidence
pub const CONFIDENCE_LARGE_REVENUE: f64 = 10_000_000.0;

/// Revenue below which the earnings model loses confidence
pub const CONFIDENCE_SMALL_REVENUE: f64 = 5_000_000.0;

/// Confidence bounds
pub const MIN_CONFIDENCE: i32 = 0;
pub const MAX_CONFIDENCE: i32 = 100;

/// DCF-lite horizon and growth cap
pub const DCF_PROJECTION_YEARS: i32 = 3;
pub const DCF_GROWTH_CAP: f64 = 0.15;

/// Band of growth rates considered reasonable by the DCF-lite model (exclusive)
pub const DCF_REASONABLE_GROWTH: (f64, f64) = (0.05, 0.25);

/// Hybrid base weights: revenue, ebitda, earnings, dcf
pub const HYBRID_BASE_WEIGHTS: [f64; 4] = [0.3, 0.3, 0.2, 0.2];

/// Step applied by each hybrid weight adjustment rule
pub const HYBRID_WEIGHT_STEP: f64 = 0.1;

/// Clamp an accumulated confidence score to [0, 100]
pub fn clamp_confidence(score: i32) -> u8 {
    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE) as u8
}
