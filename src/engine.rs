//! Valuation run orchestrator
//!
//! Resolves assumptions and runs all five models for a company, isolating
//! failures per model so one bad assumption set never aborts the run.

use crate::assumptions::{
    AssumptionOverrides, AssumptionResolver, AssumptionStore, InMemoryAssumptionStore,
};
use crate::profile::CompanyProfile;
use crate::types::{GrowthBucket, ModelKey, Money, OrgNr, SizeBucket};
use crate::valuation::{self, ValuationOutput};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};
use uuid::Uuid;

/// Configuration for the valuation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Run models (and batch companies) on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Per-model overrides applied after assumption resolution
    #[serde(default)]
    pub overrides: AssumptionOverrides,
}

fn default_parallel() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            overrides: AssumptionOverrides::new(),
        }
    }
}

/// Aggregate view over one company's model outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationSummary {
    /// Lowest EV among base models with a value
    pub ev_low: Option<Money>,
    pub ev_high: Option<Money>,
    pub ev_mean: Option<Money>,
    /// Sample standard deviation; needs at least two valued base models
    pub ev_std_dev: Option<f64>,
    pub hybrid_ev: Option<Money>,
    pub hybrid_equity: Option<Money>,
    /// Models (of five) that produced a value
    pub applicable_models: usize,
    pub failed_models: usize,
}

impl ValuationSummary {
    pub fn from_outputs(outputs: &[ValuationOutput]) -> Self {
        let base_evs: Vec<f64> = outputs
            .iter()
            .filter(|o| o.model_key != ModelKey::HybridScore)
            .filter_map(|o| o.value_ev)
            .collect();

        let ev_low = base_evs.iter().copied().reduce(f64::min);
        let ev_high = base_evs.iter().copied().reduce(f64::max);
        let count = base_evs.len();

        let data = Data::new(base_evs);
        let ev_mean = if count > 0 { data.mean() } else { None };
        let ev_std_dev = if count > 1 { data.std_dev() } else { None };

        let hybrid = outputs.iter().find(|o| o.model_key == ModelKey::HybridScore);

        Self {
            ev_low,
            ev_high,
            ev_mean,
            ev_std_dev,
            hybrid_ev: hybrid.and_then(|o| o.value_ev),
            hybrid_equity: hybrid.and_then(|o| o.value_equity),
            applicable_models: outputs.iter().filter(|o| o.has_value()).count(),
            failed_models: outputs.iter().filter(|o| o.is_error()).count(),
        }
    }
}

/// Result of valuing one company
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationReport {
    pub run_id: Uuid,
    pub valued_at: DateTime<Utc>,
    pub orgnr: OrgNr,
    pub name: String,
    pub industry: String,
    pub size_bucket: SizeBucket,
    pub growth_bucket: GrowthBucket,
    /// Exactly five outputs in `ModelKey::ALL` order
    pub outputs: Vec<ValuationOutput>,
    pub summary: ValuationSummary,
}

impl ValuationReport {
    pub fn output(&self, model: ModelKey) -> Option<&ValuationOutput> {
        self.outputs.iter().find(|o| o.model_key == model)
    }
}

/// Valuation engine
pub struct ValuationEngine<S> {
    resolver: AssumptionResolver<S>,
    config: EngineConfig,
}

impl ValuationEngine<InMemoryAssumptionStore> {
    /// Engine over an empty store: every model runs on built-in defaults
    pub fn with_defaults() -> Self {
        Self::new(InMemoryAssumptionStore::new(), EngineConfig::default())
    }
}

impl<S: AssumptionStore> ValuationEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            resolver: AssumptionResolver::new(store),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AssumptionResolver<S> {
        &self.resolver
    }

    /// Resolve and run one model; a computation error becomes an error output
    pub fn run_model(&self, model: ModelKey, profile: &CompanyProfile) -> ValuationOutput {
        let assumptions = self.resolver.resolve_for(model, profile, &self.config.overrides);

        match valuation::compute(model, profile, &assumptions) {
            Ok(output) => {
                log::debug!(
                    "{} for {}: EV {:?}, equity {:?}, confidence {}",
                    model,
                    profile.orgnr,
                    output.value_ev,
                    output.value_equity,
                    output.confidence
                );
                output
            }
            Err(e) => {
                log::error!("{} failed for {}: {}", model, profile.orgnr, e);
                ValuationOutput::failed(model, &e, &assumptions)
            }
        }
    }

    /// All five outputs in `ModelKey::ALL` order
    pub fn value_models(&self, profile: &CompanyProfile) -> Vec<ValuationOutput> {
        if self.config.parallel {
            ModelKey::ALL
                .par_iter()
                .map(|model| self.run_model(*model, profile))
                .collect()
        } else {
            ModelKey::ALL
                .iter()
                .map(|model| self.run_model(*model, profile))
                .collect()
        }
    }

    /// Value one company
    pub fn value(&self, profile: &CompanyProfile) -> ValuationReport {
        log::info!(
            "Valuing {} ({}, {}, {} growth)",
            profile.orgnr,
            profile.industry,
            profile.size_bucket.as_str(),
            profile.growth_bucket.as_str()
        );

        let outputs = self.value_models(profile);
        let summary = ValuationSummary::from_outputs(&outputs);

        log::info!(
            "Valuation of {} complete: {}/{} models applicable, hybrid EV {:?}",
            profile.orgnr,
            summary.applicable_models,
            outputs.len(),
            summary.hybrid_ev
        );

        ValuationReport {
            run_id: Uuid::new_v4(),
            valued_at: Utc::now(),
            orgnr: profile.orgnr.clone(),
            name: profile.name.clone(),
            industry: profile.industry.clone(),
            size_bucket: profile.size_bucket,
            growth_bucket: profile.growth_bucket,
            outputs,
            summary,
        }
    }

    /// Value many companies; reports come back in input order
    pub fn value_batch(&self, profiles: &[CompanyProfile]) -> Vec<ValuationReport> {
        log::info!("Valuing batch of {} companies", profiles.len());
        if self.config.parallel {
            profiles.par_iter().map(|p| self.value(p)).collect()
        } else {
            profiles.iter().map(|p| self.value(p)).collect()
        }
    }
}
