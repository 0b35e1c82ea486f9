//! Assumption cascade against the SQLite store

#![cfg(feature = "rusqlite-support")]

use approx::assert_relative_eq;
use rusty_valuation::{
    assumptions::{
        store::read_csv_rows, AssumptionDB, AssumptionKey, AssumptionRecord, AssumptionResolver,
        AssumptionSource, ValuationAssumptions,
    },
    engine::{EngineConfig, ValuationEngine},
    profile::{CompanyProfile, RawCompanyRecord},
    types::{GrowthBucket, ModelKey, SizeBucket},
    valuation::NetDebtMethod,
};
use std::io::Write;
use std::sync::Arc;

fn seeded_db() -> AssumptionDB {
    let db = AssumptionDB::new_in_memory().unwrap();
    db.upsert(
        &AssumptionKey::new(
            ModelKey::RevenueMultiple,
            Some("Teknik".to_string()),
            Some(SizeBucket::Small),
            Some(GrowthBucket::Medium),
        ),
        &AssumptionRecord {
            revenue_multiple: Some(1.5),
            net_debt_method: Some(NetDebtMethod::RatioRevenue),
            net_debt_k: Some(0.2),
            ..Default::default()
        },
    )
    .unwrap();
    db.upsert(
        &AssumptionKey::new(
            ModelKey::RevenueMultiple,
            None,
            Some(SizeBucket::Small),
            Some(GrowthBucket::Medium),
        ),
        &AssumptionRecord {
            revenue_multiple: Some(1.1),
            ..Default::default()
        },
    )
    .unwrap();
    db.upsert(
        &AssumptionKey::generic(ModelKey::RevenueMultiple),
        &AssumptionRecord {
            revenue_multiple: Some(0.9),
            net_debt_method: Some(NetDebtMethod::Zero),
            ..Default::default()
        },
    )
    .unwrap();
    db
}

#[test]
fn test_cascade_levels_against_sqlite() {
    let resolver = AssumptionResolver::new(seeded_db());

    let exact = resolver.lookup(ModelKey::RevenueMultiple, "Teknik", SizeBucket::Small, GrowthBucket::Medium);
    assert_eq!(exact.revenue_multiple, Some(1.5));
    assert_eq!(exact.source, AssumptionSource::Exact);

    let generic_industry = resolver.lookup(
        ModelKey::RevenueMultiple,
        "Tillverkning",
        SizeBucket::Small,
        GrowthBucket::Medium,
    );
    assert_eq!(generic_industry.revenue_multiple, Some(1.1));
    assert_eq!(generic_industry.source, AssumptionSource::GenericIndustry);

    let model_generic =
        resolver.lookup(ModelKey::RevenueMultiple, "Teknik", SizeBucket::Large, GrowthBucket::High);
    assert_eq!(model_generic.revenue_multiple, Some(0.9));
    assert_eq!(model_generic.net_debt_method, NetDebtMethod::Zero);
    assert_eq!(model_generic.source, AssumptionSource::ModelGeneric);

    let built_in = resolver.lookup(ModelKey::DcfLite, "Teknik", SizeBucket::Small, GrowthBucket::Medium);
    assert_eq!(built_in, ValuationAssumptions::built_in(ModelKey::DcfLite));
}

#[test]
fn test_engine_over_shared_sqlite_store() {
    let store = Arc::new(seeded_db());
    let engine = ValuationEngine::new(store.clone(), EngineConfig::default());

    let profile = CompanyProfile::from_record(&RawCompanyRecord {
        orgnr: "556123-4567".to_string(),
        industry: Some("Software".to_string()),
        revenue: Some(10_000.0),
        net_profit: Some(1_000.0),
        ebit_margin: Some(0.12),
        revenue_growth: Some(0.08),
        ..Default::default()
    });

    let report = engine.value(&profile);
    let revenue = report.output(ModelKey::RevenueMultiple).unwrap();

    assert_relative_eq!(revenue.value_ev.unwrap(), 15_000.0, epsilon = 1e-9);
    assert_relative_eq!(revenue.value_equity.unwrap(), 13_000.0, epsilon = 1e-9);
    assert_eq!(revenue.inputs.assumption_source, Some(AssumptionSource::Exact));
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn test_import_csv_into_file_db() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("assumptions.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(
        file,
        "model_key,industry,size_bucket,growth_bucket,revenue_multiple,ebitda_multiple,earnings_multiple,discount_rate,terminal_multiple,net_debt_method,net_debt_k,net_debt_direct"
    )
    .unwrap();
    writeln!(file, "ebitda_multiple,Teknik,medium,high,,7.5,,,,ratio_ebitda,0.5,").unwrap();
    writeln!(file, "dcf_lite,*,*,*,,,,0.12,7.0,,,").unwrap();
    writeln!(file, "ebitda_multiple,Teknik,medium,high,,8.0,,,,ratio_ebitda,0.5,").unwrap();
    drop(file);

    let db = AssumptionDB::new(&dir.path().join("assumptions.db")).unwrap();
    let imported = db.import_rows(read_csv_rows(&csv_path).unwrap()).unwrap();

    assert_eq!(imported, 3);
    // later duplicate replaced the first
    assert_eq!(db.count().unwrap(), 2);

    let resolver = AssumptionResolver::new(db);
    let ebitda = resolver.lookup(ModelKey::EbitdaMultiple, "Teknik", SizeBucket::Medium, GrowthBucket::High);
    assert_eq!(ebitda.ebitda_multiple, Some(8.0));
    assert_eq!(ebitda.net_debt_method, NetDebtMethod::RatioEbitda);

    let dcf = resolver.lookup(ModelKey::DcfLite, "Handel", SizeBucket::Small, GrowthBucket::Low);
    assert_eq!(dcf.discount_rate, Some(0.12));
    assert_eq!(dcf.source, AssumptionSource::ModelGeneric);
}
