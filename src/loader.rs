// src/loader.rs

//! JSON session loading.
//!
//! Two files make a session. The feature table lists the features in
//! canonical order with their bounds, initial slider values, and the two
//! output display labels:
//!
//! ```json
//! {
//!   "features": [
//!     { "name": "cep", "label": "CEP", "min": 120.0, "max": 480.0, "initial": 300.0 }
//!   ],
//!   "outputs": ["Response 1", "Response 2"]
//! }
//! ```
//!
//! The coefficients file keeps the trained-model export shape, so a file
//! produced by the training pipeline loads as-is: per output unit, `coef`
//! holds `[input_weights[feature][hidden], output_weights[hidden][1]]` and
//! `cept` holds `[hidden_biases[hidden], [output_bias]]`, all under a
//! top-level `data` key.

use anyhow::{anyhow, ensure, Context, Result};
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::config::EngineConfig;
use crate::feature::{Feature, FeatureSet};
use crate::network::{Network, OutputUnit, OUTPUT_UNITS};
use crate::session::SessionState;

/// The parsed feature table: the ordered feature set, the initial raw
/// slider values aligned to it, and the output display labels.
#[derive(Debug)]
pub struct FeatureTable {
    pub features: FeatureSet,
    pub initial_values: Vec<f64>,
    pub output_labels: [String; OUTPUT_UNITS],
}

#[derive(Debug, Deserialize)]
struct FeatureTableFile {
    features: Vec<FeatureRecord>,
    outputs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FeatureRecord {
    name: String,
    /// Display label; defaults to the name when absent.
    #[serde(default)]
    label: Option<String>,
    min: f64,
    max: f64,
    initial: f64,
}

#[derive(Debug, Deserialize)]
struct CoefficientsFile {
    data: CoefficientsData,
}

/// Trained-model export shape: one entry per output unit, weight matrices
/// in the first position, biases in the second.
#[derive(Debug, Deserialize)]
struct CoefficientsData {
    coef: Vec<(Vec<Vec<f64>>, Vec<Vec<f64>>)>,
    cept: Vec<(Vec<f64>, Vec<f64>)>,
}

fn parse_feature_table(reader: impl Read) -> Result<FeatureTable> {
    let file: FeatureTableFile =
        serde_json::from_reader(reader).context("parsing feature table JSON")?;
    let mut features = Vec::with_capacity(file.features.len());
    let mut initial_values = Vec::with_capacity(file.features.len());
    for record in file.features {
        let label = record.label.unwrap_or_else(|| record.name.clone());
        features.push(Feature::new(record.name, label, record.min, record.max)?);
        initial_values.push(record.initial);
    }
    let output_labels: [String; OUTPUT_UNITS] = file.outputs.try_into().map_err(
        |outputs: Vec<String>| {
            anyhow!(
                "feature table lists {} output labels, expected {}",
                outputs.len(),
                OUTPUT_UNITS
            )
        },
    )?;
    Ok(FeatureTable {
        features: FeatureSet::new(features)?,
        initial_values,
        output_labels,
    })
}

fn parse_network(reader: impl Read) -> Result<Network> {
    let file: CoefficientsFile =
        serde_json::from_reader(reader).context("parsing coefficients JSON")?;
    let data = file.data;
    ensure!(
        data.coef.len() == OUTPUT_UNITS && data.cept.len() == OUTPUT_UNITS,
        "coefficients file describes {} weight sets and {} bias sets, expected {} of each",
        data.coef.len(),
        data.cept.len(),
        OUTPUT_UNITS
    );

    let mut units = Vec::with_capacity(OUTPUT_UNITS);
    for (r, ((coef0, coef1_columns), (cept0, cept1_list))) in
        data.coef.into_iter().zip(data.cept).enumerate()
    {
        // The export stores the hidden-to-output weights as a one-column
        // matrix; flatten it, refusing anything wider.
        let mut coef1 = Vec::with_capacity(coef1_columns.len());
        for (j, row) in coef1_columns.into_iter().enumerate() {
            ensure!(
                row.len() == 1,
                "output unit {}: hidden-to-output row {} has {} columns, expected 1",
                r,
                j,
                row.len()
            );
            coef1.push(row[0]);
        }
        ensure!(
            cept1_list.len() == 1,
            "output unit {}: expected a single output bias, got {} values",
            r,
            cept1_list.len()
        );
        let unit = OutputUnit::new(coef0, cept0, coef1, cept1_list[0])
            .with_context(|| format!("validating output unit {}", r))?;
        units.push(unit);
    }
    Network::new(units)
}

/// Reads and validates a feature table file.
pub fn load_feature_table(path: &Path) -> Result<FeatureTable> {
    let file = File::open(path)
        .with_context(|| format!("opening feature table {}", path.display()))?;
    let table = parse_feature_table(BufReader::new(file))
        .with_context(|| format!("loading feature table {}", path.display()))?;
    info!(
        "Loader: {} features, outputs [{}, {}] from {}",
        table.features.len(),
        table.output_labels[0],
        table.output_labels[1],
        path.display()
    );
    Ok(table)
}

/// Reads and validates a model coefficients file.
pub fn load_network(path: &Path) -> Result<Network> {
    let file = File::open(path)
        .with_context(|| format!("opening coefficients file {}", path.display()))?;
    let network = parse_network(BufReader::new(file))
        .with_context(|| format!("loading coefficients file {}", path.display()))?;
    info!(
        "Loader: network with hidden widths [{}, {}] from {}",
        network.unit(0).hidden_len(),
        network.unit(1).hidden_len(),
        path.display()
    );
    Ok(network)
}

/// Reads an engine configuration file.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let file = File::open(path)
        .with_context(|| format!("opening engine config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("loading engine config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Loads both session files and assembles a [`SessionState`] around them.
pub fn load_session(
    feature_table_path: &Path,
    coefficients_path: &Path,
    config: &EngineConfig,
) -> Result<SessionState> {
    let table = load_feature_table(feature_table_path)?;
    let network = load_network(coefficients_path)?;
    SessionState::new(
        table.features,
        network,
        table.output_labels,
        &table.initial_values,
        config,
    )
    .context("assembling session from loaded files")
}
