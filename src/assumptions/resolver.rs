//! Cascading assumption resolution
//!
//! For a model and company classification the resolver tries, in order:
//!
//! 1. the exact `(model, industry, size, growth)` row
//! 2. `(model, generic industry, size, growth)`
//! 3. `(model, generic, generic, generic)`
//! 4. the compiled-in defaults for the model
//!
//! Caller overrides are merged last, field by field, so precedence is
//! override > stored row > built-in default. Resolution never fails: store
//! errors are logged and treated as a miss at that level.

use super::store::AssumptionStore;
use super::{AssumptionKey, AssumptionOverrides, AssumptionRecord, ValuationAssumptions};
use crate::profile::CompanyProfile;
use crate::types::{GrowthBucket, ModelKey, SizeBucket};

/// Resolves assumption sets against a store
#[derive(Debug, Clone)]
pub struct AssumptionResolver<S> {
    store: S,
}

impl<S: AssumptionStore> AssumptionResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cascade lookup without overrides
    pub fn lookup(
        &self,
        model_key: ModelKey,
        industry: &str,
        size_bucket: SizeBucket,
        growth_bucket: GrowthBucket,
    ) -> ValuationAssumptions {
        for (source, key) in AssumptionKey::cascade(model_key, industry, size_bucket, growth_bucket) {
            match self.store.lookup(&key) {
                Ok(Some(record)) => {
                    log::debug!(
                        "Assumptions for {} resolved at {} level ({})",
                        model_key,
                        source.as_str(),
                        self.store.describe()
                    );
                    return ValuationAssumptions::from_record(model_key, &record, source);
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!(
                        "Assumption lookup failed for {} at {} level: {}",
                        model_key,
                        source.as_str(),
                        e
                    );
                }
            }
        }

        log::debug!("Assumptions for {} fall back to built-in defaults", model_key);
        ValuationAssumptions::built_in(model_key)
    }

    /// Cascade lookup, then apply `overrides`
    pub fn resolve(
        &self,
        model_key: ModelKey,
        industry: &str,
        size_bucket: SizeBucket,
        growth_bucket: GrowthBucket,
        overrides: Option<&AssumptionRecord>,
    ) -> ValuationAssumptions {
        let resolved = self.lookup(model_key, industry, size_bucket, growth_bucket);
        match overrides {
            Some(overrides) => resolved.with_overrides(overrides),
            None => resolved,
        }
    }

    /// Resolve for a profile's classification, picking the model's overrides
    pub fn resolve_for(
        &self,
        model_key: ModelKey,
        profile: &CompanyProfile,
        overrides: &AssumptionOverrides,
    ) -> ValuationAssumptions {
        self.resolve(
            model_key,
            &profile.industry,
            profile.size_bucket,
            profile.growth_bucket,
            overrides.get(&model_key),
        )
    }
}
