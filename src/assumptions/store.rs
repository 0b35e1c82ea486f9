//! Assumption stores
//!
//! [`AssumptionStore`] is the read-only lookup the resolver cascades over.
//! A missing row is `Ok(None)`, never an error.

use super::{AssumptionKey, AssumptionRecord};
use crate::error::{Result, ValuationError};
use crate::types::{GrowthBucket, ModelKey, SizeBucket};
use crate::valuation::net_debt::NetDebtMethod;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Trait for reading stored assumption rows
pub trait AssumptionStore: Send + Sync {
    /// Exact lookup of one key; `None` dimensions match only generic rows
    fn lookup(&self, key: &AssumptionKey) -> Result<Option<AssumptionRecord>>;

    /// Human-readable store description for logs
    fn describe(&self) -> String {
        "assumption store".to_string()
    }
}

impl<S: AssumptionStore + ?Sized> AssumptionStore for std::sync::Arc<S> {
    fn lookup(&self, key: &AssumptionKey) -> Result<Option<AssumptionRecord>> {
        (**self).lookup(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Flat assumption row as it appears in CSV/JSON files and in the database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssumptionRow {
    pub model_key: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub size_bucket: Option<String>,
    #[serde(default)]
    pub growth_bucket: Option<String>,
    #[serde(default)]
    pub revenue_multiple: Option<f64>,
    #[serde(default)]
    pub ebitda_multiple: Option<f64>,
    #[serde(default)]
    pub earnings_multiple: Option<f64>,
    #[serde(default)]
    pub discount_rate: Option<f64>,
    #[serde(default)]
    pub terminal_multiple: Option<f64>,
    #[serde(default)]
    pub net_debt_method: Option<String>,
    #[serde(default)]
    pub net_debt_k: Option<f64>,
    #[serde(default)]
    pub net_debt_direct: Option<f64>,
}

/// Blank and `*` dimension values mean "generic"
fn dimension(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "*")
}

impl AssumptionRow {
    /// Split into a typed key and record
    pub fn into_entry(self) -> Result<(AssumptionKey, AssumptionRecord)> {
        let key = AssumptionKey {
            model_key: ModelKey::parse(&self.model_key)?,
            industry: dimension(&self.industry).map(str::to_string),
            size_bucket: dimension(&self.size_bucket).map(SizeBucket::parse).transpose()?,
            growth_bucket: dimension(&self.growth_bucket)
                .map(GrowthBucket::parse)
                .transpose()?,
        };
        let record = AssumptionRecord {
            revenue_multiple: self.revenue_multiple,
            ebitda_multiple: self.ebitda_multiple,
            earnings_multiple: self.earnings_multiple,
            discount_rate: self.discount_rate,
            terminal_multiple: self.terminal_multiple,
            net_debt_method: dimension(&self.net_debt_method).map(NetDebtMethod::parse),
            net_debt_k: self.net_debt_k,
            net_debt_direct: self.net_debt_direct,
        };
        Ok((key, record))
    }

    /// Flatten a typed key and record
    pub fn from_entry(key: &AssumptionKey, record: &AssumptionRecord) -> Self {
        Self {
            model_key: key.model_key.as_str().to_string(),
            industry: key.industry.clone(),
            size_bucket: key.size_bucket.map(|b| b.as_str().to_string()),
            growth_bucket: key.growth_bucket.map(|b| b.as_str().to_string()),
            revenue_multiple: record.revenue_multiple,
            ebitda_multiple: record.ebitda_multiple,
            earnings_multiple: record.earnings_multiple,
            discount_rate: record.discount_rate,
            terminal_multiple: record.terminal_multiple,
            net_debt_method: record.net_debt_method.map(|m| m.as_str().to_string()),
            net_debt_k: record.net_debt_k,
            net_debt_direct: record.net_debt_direct,
        }
    }
}

/// Read assumption rows from a CSV file with a header row
pub fn read_csv_rows(path: &Path) -> Result<Vec<AssumptionRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<AssumptionRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Read assumption rows from a JSON array
pub fn read_json_rows<R: Read>(reader: R) -> Result<Vec<AssumptionRow>> {
    Ok(serde_json::from_reader(reader)?)
}

/// In-memory assumption store
///
/// # Example
/// ```
/// use rusty_valuation::assumptions::{AssumptionKey, AssumptionRecord, AssumptionStore, InMemoryAssumptionStore};
/// use rusty_valuation::types::ModelKey;
///
/// let mut store = InMemoryAssumptionStore::new();
/// let key = AssumptionKey::generic(ModelKey::RevenueMultiple);
/// store.insert(key.clone(), AssumptionRecord { revenue_multiple: Some(1.4), ..Default::default() });
///
/// let record = store.lookup(&key).unwrap().unwrap();
/// assert_eq!(record.revenue_multiple, Some(1.4));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssumptionStore {
    records: HashMap<AssumptionKey, AssumptionRecord>,
}

impl InMemoryAssumptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a row
    pub fn insert(&mut self, key: AssumptionKey, record: AssumptionRecord) -> Option<AssumptionRecord> {
        self.records.insert(key, record)
    }

    pub fn remove(&mut self, key: &AssumptionKey) -> Option<AssumptionRecord> {
        self.records.remove(key)
    }

    /// Build a store from flat rows; later rows replace earlier ones
    pub fn from_rows(rows: Vec<AssumptionRow>) -> Result<Self> {
        let mut store = Self::new();
        for row in rows {
            let (key, record) = row.into_entry()?;
            store.insert(key, record);
        }
        Ok(store)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Self::from_rows(read_csv_rows(path)?)
    }

    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_rows(read_json_rows(std::io::BufReader::new(file))?)
    }

    /// Load by file extension (`.csv` or `.json`)
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => Self::from_csv_path(path),
            Some("json") => Self::from_json_path(path),
            other => Err(ValuationError::ConfigError(format!(
                "Unsupported assumption file type: {:?}",
                other
            ))),
        }
    }

    /// All rows, sorted by model then dimensions
    pub fn rows(&self) -> Vec<AssumptionRow> {
        let mut rows: Vec<AssumptionRow> = self
            .records
            .iter()
            .map(|(key, record)| AssumptionRow::from_entry(key, record))
            .collect();
        rows.sort_by(|a, b| {
            (&a.model_key, &a.industry, &a.size_bucket, &a.growth_bucket)
                .cmp(&(&b.model_key, &b.industry, &b.size_bucket, &b.growth_bucket))
        });
        rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AssumptionStore for InMemoryAssumptionStore {
    fn lookup(&self, key: &AssumptionKey) -> Result<Option<AssumptionRecord>> {
        Ok(self.records.get(key).cloned())
    }

    fn describe(&self) -> String {
        format!("in-memory store ({} rows)", self.records.len())
    }
}
