use crate::error::{HmmError, Result};
use crate::hmm::DiscreteHmm;
use crate::labels::{dense_emissions, Alphabet, LabeledHmm};
use crate::viterbi::Scoring;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Emission table as written in a config file: either one dense row per
/// state (columns follow `symbols`), or one `symbol -> probability` map per
/// state with absent symbols meaning zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Emissions {
    Dense(Vec<Vec<f64>>),
    Sparse(Vec<BTreeMap<String, f64>>),
}

/// Labeled model description, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub states: Vec<String>,
    pub symbols: Vec<String>,
    pub initial: Vec<f64>,
    pub transitions: Vec<Vec<f64>>,
    pub emissions: Emissions,
    /// Sequence decoded when none is given on the command line.
    #[serde(default)]
    pub observations: Vec<String>,
}

impl Default for ModelConfig {
    /// Healthy/fever model observed through normal/cold/hot readings.
    fn default() -> Self {
        Self {
            states: vec!["healthy".to_string(), "fever".to_string()],
            symbols: vec!["normal".to_string(), "cold".to_string(), "hot".to_string()],
            initial: vec![0.6, 0.4],
            transitions: vec![vec![0.7, 0.3], vec![0.4, 0.6]],
            emissions: Emissions::Dense(vec![vec![0.5, 0.4, 0.1], vec![0.1, 0.3, 0.6]]),
            observations: vec!["normal".to_string(), "cold".to_string(), "hot".to_string()],
        }
    }
}

impl ModelConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|err| HmmError::Config(err.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| HmmError::Config(err.to_string()))
    }

    pub fn build(&self, scoring: Scoring) -> Result<LabeledHmm> {
        let states = Alphabet::new(self.states.iter().cloned())?;
        let symbols = Alphabet::new(self.symbols.iter().cloned())?;
        let emissions = match &self.emissions {
            Emissions::Dense(rows) => rows.clone(),
            Emissions::Sparse(rows) => dense_emissions(rows, &symbols)?,
        };
        let model = DiscreteHmm::new(self.initial.clone(), self.transitions.clone(), emissions)?;
        LabeledHmm::new(states, symbols, model, scoring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_decodes_textbook_path() {
        let cfg = ModelConfig::default();
        let hmm = cfg.build(Scoring::Probability).unwrap();
        assert!(hmm.decoder().model().is_stochastic(1e-9));
        assert_eq!(
            hmm.decode_labels(&cfg.observations).unwrap(),
            vec!["healthy", "healthy", "fever"]
        );
    }

    #[test]
    fn sparse_emissions_from_json() {
        let json = r#"{
            "states": ["rainy", "sunny"],
            "symbols": ["walk", "shop", "clean"],
            "initial": [0.6, 0.4],
            "transitions": [[0.7, 0.3], [0.4, 0.6]],
            "emissions": [
                {"walk": 0.1, "shop": 0.4, "clean": 0.5},
                {"walk": 0.6, "shop": 0.3, "clean": 0.1}
            ]
        }"#;
        let cfg = ModelConfig::from_json_str(json).unwrap();
        assert!(matches!(cfg.emissions, Emissions::Sparse(_)));
        assert!(cfg.observations.is_empty());

        let hmm = cfg.build(Scoring::LogSpace).unwrap();
        assert_eq!(hmm.decoder().model().emission(1, 0), 0.6);
        assert_eq!(
            hmm.decode_labels(&["walk", "shop", "clean"]).unwrap(),
            vec!["sunny", "rainy", "rainy"]
        );
    }

    #[test]
    fn json_round_trip_keeps_dense_table() {
        let cfg = ModelConfig::default();
        let back = ModelConfig::from_json_str(&cfg.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn malformed_configs() {
        assert!(matches!(
            ModelConfig::from_json_str("{\"states\": 3}"),
            Err(HmmError::Config(_))
        ));

        let mut cfg = ModelConfig::default();
        cfg.transitions.pop();
        assert!(matches!(
            cfg.build(Scoring::Probability),
            Err(HmmError::InvalidModel(_))
        ));

        let mut cfg = ModelConfig::default();
        cfg.symbols.push("dizzy".to_string());
        assert!(matches!(
            cfg.build(Scoring::Probability),
            Err(HmmError::InvalidModel(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            ModelConfig::load("/nonexistent/viterbi-model.json"),
            Err(HmmError::Io(_))
        ));
    }
}
