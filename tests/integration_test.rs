//! Integration tests for rusty-valuation

use approx::assert_relative_eq;
use rusty_valuation::{
    assumptions::{
        AssumptionKey, AssumptionOverrides, AssumptionRecord, AssumptionResolver, AssumptionSource,
        InMemoryAssumptionStore, ValuationAssumptions,
    },
    engine::{EngineConfig, ValuationEngine},
    profile::{CompanyProfile, RawCompanyRecord},
    types::{GrowthBucket, ModelKey, SizeBucket},
    valuation::{
        self, compute_net_debt,
        dcf::NEGATIVE_CASH_FLOW_REASON,
        earnings::{UNPROFITABLE_BASIS, UNPROFITABLE_REASON},
        ebitda::EBITDA_PROXY_REASON,
        hybrid::HybridWeights,
        NetDebtMethod,
    },
};

fn scenario_a() -> CompanyProfile {
    CompanyProfile::from_record(&RawCompanyRecord {
        orgnr: "556123-4567".to_string(),
        name: "Scenario A AB".to_string(),
        industry: Some("IT-konsulter".to_string()),
        revenue: Some(10_000.0),
        net_profit: Some(1_000.0),
        ebitda: None,
        ebit_margin: Some(0.12),
        revenue_growth: Some(0.08),
        net_profit_margin: Some(0.1),
        employees: Some(20.0),
        ..Default::default()
    })
}

fn scenario_b() -> CompanyProfile {
    CompanyProfile::from_record(&RawCompanyRecord {
        orgnr: "556765-4321".to_string(),
        revenue: Some(10_000.0),
        net_profit: Some(-500.0),
        ebit_margin: Some(0.12),
        revenue_growth: Some(0.08),
        net_profit_margin: Some(-0.05),
        ..Default::default()
    })
}

fn ratio_revenue(model: ModelKey) -> ValuationAssumptions {
    ValuationAssumptions::built_in(model).with_overrides(&AssumptionRecord {
        net_debt_method: Some(NetDebtMethod::RatioRevenue),
        net_debt_k: Some(0.2),
        ..Default::default()
    })
}

#[test]
fn test_scenario_a_net_debt() {
    let profile = scenario_a();
    let calc = compute_net_debt(&profile, &ratio_revenue(ModelKey::RevenueMultiple));

    assert_relative_eq!(calc.net_debt, 2_000.0, epsilon = 1e-9);
    assert_eq!(calc.method, NetDebtMethod::RatioRevenue);
}

#[test]
fn test_scenario_a_revenue_model() {
    let profile = scenario_a();
    let assumptions = ratio_revenue(ModelKey::RevenueMultiple).with_overrides(&AssumptionRecord {
        revenue_multiple: Some(1.5),
        ..Default::default()
    });

    let output = valuation::compute(ModelKey::RevenueMultiple, &profile, &assumptions).unwrap();

    assert_relative_eq!(output.value_ev.unwrap(), 15_000.0, epsilon = 1e-9);
    assert_relative_eq!(output.value_equity.unwrap(), 13_000.0, epsilon = 1e-9);
    assert_eq!(output.multiple_used, Some(1.5));
    assert!(output.basis.contains("10000"));
    assert!(output.basis.contains("1.50"));
}

#[test]
fn test_scenario_a_ebitda_model_uses_proxy() {
    let profile = scenario_a();
    let assumptions = ratio_revenue(ModelKey::EbitdaMultiple);

    let output = valuation::compute(ModelKey::EbitdaMultiple, &profile, &assumptions).unwrap();

    assert_relative_eq!(output.value_ev.unwrap(), 7_200.0, epsilon = 1e-9);
    assert_relative_eq!(output.value_equity.unwrap(), 5_200.0, epsilon = 1e-9);
    assert_eq!(output.inputs.reason.as_deref(), Some(EBITDA_PROXY_REASON));
}

#[test]
fn test_scenario_a_through_engine_with_overrides() {
    let mut overrides = AssumptionOverrides::new();
    overrides.insert(
        ModelKey::RevenueMultiple,
        AssumptionRecord {
            revenue_multiple: Some(1.5),
            ..Default::default()
        },
    );
    let engine = ValuationEngine::new(
        InMemoryAssumptionStore::new(),
        EngineConfig {
            parallel: true,
            overrides,
        },
    );

    let report = engine.value(&scenario_a());

    assert_eq!(report.industry, "Teknik");
    assert_eq!(report.size_bucket, SizeBucket::Small);
    assert_eq!(report.growth_bucket, GrowthBucket::Medium);

    let revenue = report.output(ModelKey::RevenueMultiple).unwrap();
    assert_relative_eq!(revenue.value_ev.unwrap(), 15_000.0, epsilon = 1e-9);
    assert_relative_eq!(revenue.value_equity.unwrap(), 13_000.0, epsilon = 1e-9);

    let ebitda = report.output(ModelKey::EbitdaMultiple).unwrap();
    assert_relative_eq!(ebitda.value_ev.unwrap(), 7_200.0, epsilon = 1e-9);
}

#[test]
fn test_scenario_b_unprofitable_company() {
    let engine = ValuationEngine::with_defaults();
    let report = engine.value(&scenario_b());

    let earnings = report.output(ModelKey::EarningsMultiple).unwrap();
    assert!(earnings.value_ev.is_none() && earnings.value_equity.is_none());
    assert_eq!(earnings.confidence, 0);
    assert_eq!(earnings.basis, UNPROFITABLE_BASIS);
    assert_eq!(earnings.inputs.reason.as_deref(), Some(UNPROFITABLE_REASON));

    let dcf = report.output(ModelKey::DcfLite).unwrap();
    assert!(dcf.value_ev.is_none() && dcf.value_equity.is_none());
    assert_eq!(dcf.confidence, 0);
    assert_eq!(dcf.inputs.reason.as_deref(), Some(NEGATIVE_CASH_FLOW_REASON));

    assert!(report.output(ModelKey::RevenueMultiple).unwrap().has_value());
    assert!(report.output(ModelKey::EbitdaMultiple).unwrap().has_value());

    let weights = HybridWeights::for_profile(&scenario_b());
    assert_eq!(weights.get(ModelKey::EarningsMultiple), 0.0);
    assert_eq!(weights.get(ModelKey::DcfLite), 0.0);
    assert_relative_eq!(weights.get(ModelKey::RevenueMultiple), 0.5, epsilon = 1e-12);
    assert_relative_eq!(weights.get(ModelKey::EbitdaMultiple), 0.5, epsilon = 1e-12);

    let hybrid = report.output(ModelKey::HybridScore).unwrap();
    let hybrid_weights = hybrid.inputs.weights.as_ref().unwrap();
    assert_eq!(hybrid_weights[&ModelKey::EarningsMultiple], 0.0);
    assert!(hybrid.has_value());
}

#[test]
fn test_scenario_c_defaults_for_every_model() {
    let resolver = AssumptionResolver::new(InMemoryAssumptionStore::new());

    for model in ModelKey::ALL {
        let resolved = resolver.resolve(model, "Teknik", SizeBucket::Large, GrowthBucket::High, None);

        assert_eq!(resolved, ValuationAssumptions::built_in(model));
        assert_eq!(resolved.source, AssumptionSource::BuiltIn);
        assert_eq!(resolved.net_debt_method, NetDebtMethod::RatioRevenue);
    }
}

#[test]
fn test_output_contract_order_and_count() {
    let engine = ValuationEngine::with_defaults();

    for profile in [scenario_a(), scenario_b(), CompanyProfile::from_record(&RawCompanyRecord::default())] {
        let report = engine.value(&profile);
        let keys: Vec<&str> = report.outputs.iter().map(|o| o.model_key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["revenue_multiple", "ebitda_multiple", "earnings_multiple", "dcf_lite", "hybrid_score"]
        );
    }
}

#[test]
fn test_empty_record_never_errors() {
    let engine = ValuationEngine::with_defaults();
    let report = engine.value(&CompanyProfile::from_record(&RawCompanyRecord::default()));

    assert_eq!(report.summary.failed_models, 0);
    for output in &report.outputs {
        assert!(output.value_ev.is_some() == output.value_equity.is_some());
    }
}

#[test]
fn test_store_precedence_then_override() {
    let mut store = InMemoryAssumptionStore::new();
    store.insert(
        AssumptionKey::new(
            ModelKey::EarningsMultiple,
            Some("Teknik".to_string()),
            Some(SizeBucket::Small),
            Some(GrowthBucket::Medium),
        ),
        AssumptionRecord {
            earnings_multiple: Some(10.0),
            net_debt_method: Some(NetDebtMethod::Zero),
            ..Default::default()
        },
    );
    let profile = scenario_a();

    let stored = ValuationEngine::new(store.clone(), EngineConfig::default());
    let report = stored.value(&profile);
    let earnings = report.output(ModelKey::EarningsMultiple).unwrap();
    // equity = 1000 × 10, net debt zero
    assert_relative_eq!(earnings.value_equity.unwrap(), 10_000.0, epsilon = 1e-9);
    assert_relative_eq!(earnings.value_ev.unwrap(), 10_000.0, epsilon = 1e-9);
    assert_eq!(earnings.inputs.assumption_source, Some(AssumptionSource::Exact));

    let mut overrides = AssumptionOverrides::new();
    overrides.insert(
        ModelKey::EarningsMultiple,
        AssumptionRecord {
            earnings_multiple: Some(12.0),
            ..Default::default()
        },
    );
    let overridden = ValuationEngine::new(
        store,
        EngineConfig {
            parallel: false,
            overrides,
        },
    );
    let report = overridden.value(&profile);
    let earnings = report.output(ModelKey::EarningsMultiple).unwrap();
    assert_relative_eq!(earnings.value_equity.unwrap(), 12_000.0, epsilon = 1e-9);
    assert_eq!(earnings.multiple_used, Some(12.0));
}

#[test]
fn test_models_are_idempotent() {
    let profile = scenario_a();

    for model in ModelKey::ALL {
        let assumptions = ValuationAssumptions::built_in(model);
        let first = valuation::compute(model, &profile, &assumptions).unwrap();
        let second = valuation::compute(model, &profile, &assumptions).unwrap();
        assert_eq!(first, second);
    }
}
