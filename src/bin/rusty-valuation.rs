//! rusty-valuation CLI - Command-line interface for company valuations
//!
//! Provides commands for valuing single companies and batches, and for
//! managing the assumption database.
//!
//! ## Example Usage
//!
//! ```bash
//! # Value one company from a JSON record
//! rusty-valuation value company.json --format json
//!
//! # Value a CSV of companies, writing one row per model
//! rusty-valuation batch companies.csv --output valuations.csv
//!
//! # Store an assumption row
//! rusty-valuation assumptions set ebitda_multiple --industry Teknik --size small --ebitda-multiple 7.5
//!
//! # Show system info
//! rusty-valuation info --detailed
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rusty_valuation::assumptions::store::{read_csv_rows, read_json_rows, AssumptionRow};
use rusty_valuation::assumptions::{
    AssumptionDB, AssumptionKey, AssumptionOverrides, AssumptionRecord, AssumptionStore,
    InMemoryAssumptionStore, ValuationAssumptions,
};
use rusty_valuation::engine::{EngineConfig, ValuationEngine, ValuationReport};
use rusty_valuation::error::{Result as ValuationResult, ValuationError};
use rusty_valuation::profile::{IndustryClassifier, IndustryRule, ProfileBuilder, RawCompanyRecord};
use rusty_valuation::types::{GrowthBucket, ModelKey, SizeBucket};
use rusty_valuation::valuation::{NetDebtMethod, ValuationOutput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;

const BATCH_CHUNK: usize = 64;

/// rusty-valuation: Multi-model private company valuation
#[derive(Parser)]
#[command(name = "rusty-valuation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Multi-model private company valuation engine", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a single company from a JSON record
    Value {
        /// Path to company JSON file
        #[arg(value_name = "COMPANY_FILE")]
        input: PathBuf,

        /// Output format (defaults to the configured format)
        #[arg(short = 'f', long, value_enum)]
        format: Option<OutputFormat>,

        /// Write output to a file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Assumption file (CSV/JSON) to use instead of the database
        #[arg(short = 'a', long)]
        assumptions: Option<PathBuf>,
    },

    /// Value every company in a CSV file
    Batch {
        /// Path to companies CSV file
        #[arg(value_name = "COMPANIES_CSV")]
        input: PathBuf,

        /// Output CSV (one row per company and model)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Assumption file (CSV/JSON) to use instead of the database
        #[arg(short = 'a', long)]
        assumptions: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// Manage stored assumptions
    Assumptions {
        #[command(subcommand)]
        action: AssumptionsAction,
    },

    /// Show system information
    Info {
        /// Show detailed information
        #[arg(short = 'd', long)]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum AssumptionsAction {
    /// List stored assumption rows
    List {
        /// Only rows for this model key
        #[arg(short = 'm', long)]
        model: Option<String>,
    },

    /// Insert or replace an assumption row
    Set {
        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        values: RecordArgs,
    },

    /// Delete an assumption row
    Delete {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Import rows from a CSV or JSON file
    Import {
        /// Path to assumptions file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Args)]
struct KeyArgs {
    /// Model key (revenue_multiple, ebitda_multiple, earnings_multiple, dcf_lite, hybrid_score)
    #[arg(value_name = "MODEL")]
    model: String,

    /// Industry label (omit for the generic row)
    #[arg(long)]
    industry: Option<String>,

    /// Size bucket: small, medium, large (omit for generic)
    #[arg(long)]
    size: Option<String>,

    /// Growth bucket: low, medium, high (omit for generic)
    #[arg(long)]
    growth: Option<String>,
}

impl KeyArgs {
    fn to_key(&self) -> ValuationResult<AssumptionKey> {
        Ok(AssumptionKey::new(
            ModelKey::parse(&self.model)?,
            self.industry.clone(),
            self.size.as_deref().map(SizeBucket::parse).transpose()?,
            self.growth.as_deref().map(GrowthBucket::parse).transpose()?,
        ))
    }
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long)]
    revenue_multiple: Option<f64>,
    #[arg(long)]
    ebitda_multiple: Option<f64>,
    #[arg(long)]
    earnings_multiple: Option<f64>,
    #[arg(long)]
    discount_rate: Option<f64>,
    #[arg(long)]
    terminal_multiple: Option<f64>,
    /// direct, ratio_revenue, ratio_ebitda or zero
    #[arg(long)]
    net_debt_method: Option<String>,
    #[arg(long)]
    net_debt_k: Option<f64>,
    #[arg(long)]
    net_debt_direct: Option<f64>,
}

impl RecordArgs {
    fn to_record(&self) -> AssumptionRecord {
        AssumptionRecord {
            revenue_multiple: self.revenue_multiple,
            ebitda_multiple: self.ebitda_multiple,
            earnings_multiple: self.earnings_multiple,
            discount_rate: self.discount_rate,
            terminal_multiple: self.terminal_multiple,
            net_debt_method: self.net_debt_method.as_deref().map(NetDebtMethod::parse),
            net_debt_k: self.net_debt_k,
            net_debt_direct: self.net_debt_direct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_assumptions_db")]
    assumptions_db: PathBuf,
    #[serde(default = "default_output_format")]
    output_format: OutputFormat,
    #[serde(default = "default_parallel")]
    parallel: bool,
    /// Extra industry rules, tried after the built-in technology rule
    #[serde(default)]
    industry_rules: Vec<IndustryRule>,
    #[serde(default)]
    fallback_industry: Option<String>,
    /// `[overrides.<model_key>]` tables
    #[serde(default)]
    overrides: BTreeMap<String, AssumptionRecord>,
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rusty-valuation")
}

fn default_assumptions_db() -> PathBuf {
    config_dir().join("assumptions.db")
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_parallel() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assumptions_db: default_assumptions_db(),
            output_format: default_output_format(),
            parallel: default_parallel(),
            industry_rules: Vec::new(),
            fallback_industry: None,
            overrides: BTreeMap::new(),
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Self {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => config_dir().join("config.toml"),
        };
        if !config_path.exists() {
            if path.is_some() {
                eprintln!(
                    "{} Config file not found: {}",
                    "Warning:".yellow(),
                    config_path.display()
                );
            }
            return Config::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => return config,
                Err(e) => {
                    eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                }
            },
            Err(e) => {
                eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
            }
        }

        Config::default()
    }

    fn parse(contents: &str) -> ValuationResult<Self> {
        toml::from_str(contents).map_err(|e| ValuationError::ConfigError(e.to_string()))
    }

    fn engine_config(&self) -> ValuationResult<EngineConfig> {
        let mut overrides = AssumptionOverrides::new();
        for (model, record) in &self.overrides {
            overrides.insert(ModelKey::parse(model)?, record.clone());
        }
        Ok(EngineConfig {
            parallel: self.parallel,
            overrides,
        })
    }

    fn classifier(&self) -> IndustryClassifier {
        let mut classifier = IndustryClassifier::default();
        if let Some(fallback) = &self.fallback_industry {
            classifier = IndustryClassifier::new(classifier.rules().to_vec(), fallback.clone());
        }
        for rule in &self.industry_rules {
            let keywords: Vec<&str> = rule.keywords.iter().map(String::as_str).collect();
            let mut configured = IndustryRule::new(rule.label.clone(), &keywords);
            if rule.whole_word {
                configured = configured.whole_words();
            }
            classifier = classifier.with_rule(configured);
        }
        classifier
    }

    fn ensure_db_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.assumptions_db.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Flat company row as found in batch CSV files
#[derive(Debug, Clone, Default, Deserialize)]
struct CompanyRow {
    #[serde(default)]
    orgnr: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    revenue: Option<f64>,
    #[serde(default)]
    net_profit: Option<f64>,
    #[serde(default)]
    ebitda: Option<f64>,
    #[serde(default)]
    revenue_growth: Option<f64>,
    #[serde(default)]
    ebit_margin: Option<f64>,
    #[serde(default)]
    net_profit_margin: Option<f64>,
    #[serde(default)]
    employees: Option<f64>,
}

impl From<CompanyRow> for RawCompanyRecord {
    fn from(row: CompanyRow) -> Self {
        RawCompanyRecord {
            orgnr: row.orgnr,
            name: row.name,
            industry: row.industry,
            revenue: row.revenue,
            net_profit: row.net_profit,
            ebitda: row.ebitda,
            revenue_growth: row.revenue_growth,
            ebit_margin: row.ebit_margin,
            net_profit_margin: row.net_profit_margin,
            employees: row.employees,
            ..Default::default()
        }
    }
}

/// One output row per company and model
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    orgnr: &'a str,
    name: &'a str,
    industry: &'a str,
    model_key: &'static str,
    value_ev: Option<f64>,
    value_equity: Option<f64>,
    multiple_used: Option<f64>,
    confidence: u8,
    basis: &'a str,
}

impl<'a> OutputRow<'a> {
    fn rows(report: &'a ValuationReport) -> impl Iterator<Item = OutputRow<'a>> + 'a {
        report.outputs.iter().map(move |o| OutputRow {
            orgnr: &report.orgnr,
            name: &report.name,
            industry: &report.industry,
            model_key: o.model_key.as_str(),
            value_ev: o.value_ev,
            value_equity: o.value_equity,
            multiple_used: o.multiple_used,
            confidence: o.confidence,
            basis: &o.basis,
        })
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());

    if cli.verbose {
        println!(
            "{} v{}",
            "rusty-valuation".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Assumption db: {}",
            config.assumptions_db.display().to_string().dimmed()
        );
    }

    let result = match cli.command {
        Commands::Value {
            input,
            format,
            output,
            assumptions,
        } => value_company(ValueConfig {
            input,
            format: format.unwrap_or(config.output_format),
            output,
            assumptions,
            verbose: cli.verbose,
            config,
        }),

        Commands::Batch {
            input,
            output,
            assumptions,
            quiet,
        } => value_batch(BatchConfig {
            input,
            output,
            assumptions,
            quiet,
            verbose: cli.verbose,
            config,
        }),

        Commands::Assumptions { action } => handle_assumptions_action(action, cli.verbose, &config),

        Commands::Info { detailed } => show_info(detailed, &config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

// Configuration structures
struct ValueConfig {
    input: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
    assumptions: Option<PathBuf>,
    verbose: bool,
    config: Config,
}

struct BatchConfig {
    input: PathBuf,
    output: Option<PathBuf>,
    assumptions: Option<PathBuf>,
    quiet: bool,
    verbose: bool,
    config: Config,
}

/// Assumption file if given, else the database if it exists, else defaults only
fn open_store(
    assumptions: Option<&Path>,
    config: &Config,
) -> Result<Arc<dyn AssumptionStore>, Box<dyn std::error::Error>> {
    if let Some(path) = assumptions {
        return Ok(Arc::new(InMemoryAssumptionStore::from_path(path)?));
    }
    if config.assumptions_db.exists() {
        return Ok(Arc::new(AssumptionDB::new(&config.assumptions_db)?));
    }
    log::info!(
        "No assumption database at {}, using built-in defaults",
        config.assumptions_db.display()
    );
    Ok(Arc::new(InMemoryAssumptionStore::new()))
}

fn build_engine(
    assumptions: Option<&Path>,
    config: &Config,
) -> Result<ValuationEngine<Arc<dyn AssumptionStore>>, Box<dyn std::error::Error>> {
    let store = open_store(assumptions, config)?;
    Ok(ValuationEngine::new(store, config.engine_config()?))
}

// Command implementations
fn value_company(cfg: ValueConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !cfg.input.exists() {
        return Err(format!("Company file not found: {:?}", cfg.input).into());
    }

    let file = fs::File::open(&cfg.input)?;
    let record: RawCompanyRecord = serde_json::from_reader(std::io::BufReader::new(file))?;
    let profile = ProfileBuilder::with_classifier(cfg.config.classifier()).build(&record);

    let engine = build_engine(cfg.assumptions.as_deref(), &cfg.config)?;
    if cfg.verbose {
        eprintln!("  {} {}", "Store:".bold(), engine.resolver().store().describe());
        eprintln!();
    }

    let report = engine.value(&profile);

    let rendered = match cfg.format {
        OutputFormat::Table => render_table(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(&mut buf, std::slice::from_ref(&report))?;
            String::from_utf8(buf)?
        }
    };

    match cfg.output {
        Some(path) => {
            fs::write(&path, rendered)?;
            println!("{} Valuation saved to: {}", "✓".green().bold(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn render_table(report: &ValuationReport) -> String {
    let mut lines = Vec::new();
    let title = if report.name.is_empty() {
        report.orgnr.clone()
    } else {
        format!("{} ({})", report.name, report.orgnr)
    };
    lines.push(format!("{}", title.cyan().bold()));
    lines.push(format!(
        "  {} {} / {} / {} growth",
        "Class:".bold(),
        report.industry,
        report.size_bucket,
        report.growth_bucket
    ));
    lines.push(String::new());
    lines.push(format!(
        "  {:<26} {:>14} {:>14} {:>8} {:>5}",
        "Model".bold(),
        "EV".bold(),
        "Equity".bold(),
        "Multiple".bold(),
        "Conf".bold()
    ));

    for output in &report.outputs {
        lines.push(format_output_line(output));
    }

    lines.push(String::new());
    let summary = &report.summary;
    if let (Some(low), Some(high)) = (summary.ev_low, summary.ev_high) {
        lines.push(format!("  {} {:.0} – {:.0}", "EV range:".bold(), low, high));
    }
    if let Some(std_dev) = summary.ev_std_dev {
        lines.push(format!("  {} {:.0}", "EV std dev:".bold(), std_dev));
    }
    lines.push(format!(
        "  {} {}/{}",
        "Applicable models:".bold(),
        summary.applicable_models,
        report.outputs.len()
    ));
    lines.join("\n")
}

fn format_output_line(output: &ValuationOutput) -> String {
    let money = |v: Option<f64>| v.map(|x| format!("{:.0}", x)).unwrap_or_else(|| "-".to_string());
    let name = if output.is_error() {
        output.model_name.red().to_string()
    } else if output.has_value() {
        output.model_name.green().to_string()
    } else {
        output.model_name.dimmed().to_string()
    };
    let mut line = format!(
        "  {:<26} {:>14} {:>14} {:>8} {:>5}",
        name,
        money(output.value_ev),
        money(output.value_equity),
        output
            .multiple_used
            .map(|m| format!("{:.2}x", m))
            .unwrap_or_else(|| "-".to_string()),
        output.confidence
    );
    if let Some(reason) = output.inputs.reason.as_deref().or(output.inputs.error.as_deref()) {
        line.push_str(&format!("\n      {}", reason.dimmed()));
    }
    line
}

fn read_companies(path: &Path) -> ValuationResult<Vec<RawCompanyRecord>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let file = fs::File::open(path)?;
            Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
        }
        _ => {
            let mut reader = csv::Reader::from_path(path)?;
            let rows = reader
                .deserialize::<CompanyRow>()
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(RawCompanyRecord::from).collect())
        }
    }
}

fn value_batch(cfg: BatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !cfg.input.exists() {
        return Err(format!("Companies file not found: {:?}", cfg.input).into());
    }

    eprintln!("{}", "Running batch valuation...".cyan().bold());
    eprintln!();

    let builder = ProfileBuilder::with_classifier(cfg.config.classifier());
    let profiles: Vec<_> = read_companies(&cfg.input)?
        .iter()
        .map(|record| builder.build(record))
        .collect();
    let engine = build_engine(cfg.assumptions.as_deref(), &cfg.config)?;

    if cfg.verbose {
        eprintln!("  {} {}", "Companies:".bold(), profiles.len());
        eprintln!("  {} {}", "Store:".bold(), engine.resolver().store().describe());
        eprintln!();
    }

    let pb = if cfg.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(profiles.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let mut reports = Vec::with_capacity(profiles.len());
    for chunk in profiles.chunks(BATCH_CHUNK) {
        reports.extend(engine.value_batch(chunk));
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("Batch complete!");
    let elapsed = start.elapsed();

    // stdout carries only CSV; status text goes to stderr
    match &cfg.output {
        Some(path) => write_csv(fs::File::create(path)?, &reports)?,
        None => write_csv(std::io::stdout().lock(), &reports)?,
    };

    let failed: usize = reports.iter().map(|r| r.summary.failed_models).sum();
    eprintln!();
    eprintln!("{}", "Batch Results".green().bold());
    eprintln!("{}", "=============".green());
    eprintln!("  {} {}", "Companies valued:".bold(), reports.len());
    eprintln!("  {} {}", "Failed model runs:".bold(), failed);
    eprintln!("  {} {:.2} s", "Total time:".bold(), elapsed.as_secs_f64());
    if let Some(path) = &cfg.output {
        eprintln!("{} Results saved to: {}", "✓".green().bold(), path.display());
    }

    Ok(())
}

/// Write one CSV row per company and model; returns the number of rows
fn write_csv<W: std::io::Write>(out: W, reports: &[ValuationReport]) -> ValuationResult<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0;
    for report in reports {
        for row in OutputRow::rows(report) {
            writer.serialize(row)?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

fn open_db(config: &Config) -> Result<AssumptionDB, Box<dyn std::error::Error>> {
    config.ensure_db_dir()?;
    Ok(AssumptionDB::new(&config.assumptions_db)?)
}

fn handle_assumptions_action(
    action: AssumptionsAction,
    verbose: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AssumptionsAction::List { model } => {
            if let Some(m) = &model {
                ModelKey::parse(m)?;
            }
            let db = open_db(config)?;
            let rows = db.list(model.as_deref())?;

            println!("{}", "Stored Assumptions".cyan().bold());
            println!("{}", "==================".cyan());
            println!();

            if rows.is_empty() {
                println!(
                    "{}",
                    "  No assumptions stored. Built-in defaults apply to every model.".dimmed()
                );
            } else {
                for (idx, row) in rows.iter().enumerate() {
                    println!("  {}. {}", idx + 1, describe_row(row));
                }
            }
            println!();

            if verbose {
                println!("{}", "Built-in defaults:".dimmed());
                for model in ModelKey::ALL {
                    println!("  - {}", describe_defaults(&ValuationAssumptions::built_in(model)).dimmed());
                }
                println!();
            }

            Ok(())
        }

        AssumptionsAction::Set { key, values } => {
            let key = key.to_key()?;
            let record = values.to_record();
            if record.is_empty() {
                return Err("No assumption values given".into());
            }

            let db = open_db(config)?;
            db.upsert(&key, &record)?;

            println!(
                "{} Stored assumptions: {}",
                "✓".green().bold(),
                describe_row(&AssumptionRow::from_entry(&key, &record))
            );
            Ok(())
        }

        AssumptionsAction::Delete { key } => {
            let key = key.to_key()?;
            let db = open_db(config)?;
            if db.delete(&key)? {
                println!("{} Assumption row deleted", "✓".green().bold());
            } else {
                println!("{}", "  No matching assumption row".dimmed());
            }
            Ok(())
        }

        AssumptionsAction::Import { file } => {
            if !file.exists() {
                return Err(format!("Assumptions file not found: {:?}", file).into());
            }
            let rows = match file.extension().and_then(|e| e.to_str()) {
                Some("json") => read_json_rows(std::io::BufReader::new(fs::File::open(&file)?))?,
                _ => read_csv_rows(&file)?,
            };

            let db = open_db(config)?;
            let count = db.import_rows(rows)?;

            println!(
                "{} Imported {} assumption rows ({} stored)",
                "✓".green().bold(),
                count,
                db.count()?
            );
            Ok(())
        }
    }
}

fn describe_row(row: &AssumptionRow) -> String {
    let dim = |v: &Option<String>| v.clone().unwrap_or_else(|| "*".to_string());
    let mut fields = Vec::new();
    let mut push = |name: &str, value: Option<f64>| {
        if let Some(v) = value {
            fields.push(format!("{}={}", name, v));
        }
    };
    push("revenue_multiple", row.revenue_multiple);
    push("ebitda_multiple", row.ebitda_multiple);
    push("earnings_multiple", row.earnings_multiple);
    push("discount_rate", row.discount_rate);
    push("terminal_multiple", row.terminal_multiple);
    push("net_debt_k", row.net_debt_k);
    push("net_debt_direct", row.net_debt_direct);
    if let Some(method) = &row.net_debt_method {
        fields.push(format!("net_debt_method={}", method));
    }

    format!(
        "{} [{} / {} / {}] {}",
        row.model_key.bright_green().bold(),
        dim(&row.industry),
        dim(&row.size_bucket),
        dim(&row.growth_bucket),
        fields.join(", ")
    )
}

fn describe_defaults(assumptions: &ValuationAssumptions) -> String {
    let row = AssumptionRow::from_entry(
        &AssumptionKey::generic(assumptions.model_key),
        &AssumptionRecord {
            revenue_multiple: assumptions.revenue_multiple,
            ebitda_multiple: assumptions.ebitda_multiple,
            earnings_multiple: assumptions.earnings_multiple,
            discount_rate: assumptions.discount_rate,
            terminal_multiple: assumptions.terminal_multiple,
            net_debt_method: Some(assumptions.net_debt_method),
            net_debt_k: assumptions.net_debt_k,
            net_debt_direct: assumptions.net_debt_direct,
        },
    );
    describe_row(&row)
}

fn show_info(detailed: bool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} {}",
        "rusty-valuation".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("{}", "System Information".bold());
    println!("{}", "==================".dimmed());
    println!("  {} {}", "Platform:".bold(), std::env::consts::OS);
    println!("  {} {}", "Architecture:".bold(), std::env::consts::ARCH);
    println!("  {} {}", "Worker threads:".bold(), rayon::current_num_threads());
    println!();

    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    println!("  {} {}", "Assumption db:".bold(), config.assumptions_db.display());
    if config.assumptions_db.exists() {
        let db = AssumptionDB::new(&config.assumptions_db)?;
        println!("  {} {}", "Stored rows:".bold(), db.count()?);
    } else {
        println!("  {} {}", "Stored rows:".bold(), "none (built-in defaults)".dimmed());
    }
    println!("  {} {:?}", "Output format:".bold(), config.output_format);
    println!("  {} {}", "Parallel:".bold(), feature_status(config.parallel));
    println!("  {} {}", "Industry rules:".bold(), config.classifier().rules().len());
    println!("  {} {}", "Overrides:".bold(), config.overrides.len());
    println!();

    if detailed {
        println!("{}", "Models".bold());
        println!("{}", "======".dimmed());
        for model in ModelKey::ALL {
            println!("  {} {}", format!("{}:", model.as_str()).bold(), model.display_name());
        }
        println!();

        println!("{}", "Features".bold());
        println!("{}", "========".dimmed());
        println!("  {} {}", "SQLite store:".bold(), feature_status(cfg!(feature = "rusqlite-support")));
        println!("  {} {}", "CLI tools:".bold(), feature_status(cfg!(feature = "cli")));
        println!();
    }

    println!("{}", "Resources".bold());
    println!("{}", "=========".dimmed());
    println!("  {} {}", "Repository:".bold(), env!("CARGO_PKG_REPOSITORY"));
    println!("  {} Apache-2.0", "License:".bold());
    println!();

    Ok(())
}

fn feature_status(enabled: bool) -> colored::ColoredString {
    if enabled {
        "enabled".green()
    } else {
        "disabled".red()
    }
}
