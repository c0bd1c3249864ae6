//! Human-readable state and symbol names layered over the index-based core.

use crate::error::{HmmError, Result};
use crate::hmm::DiscreteHmm;
use crate::viterbi::{Scoring, Trellis, ViterbiDecoder};
use std::collections::{BTreeMap, HashMap};

/// Ordered set of labels with lookups in both directions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl Alphabet {
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(HmmError::InvalidModel("alphabet has no labels".to_string()));
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), i).is_some() {
                return Err(HmmError::InvalidModel(format!("duplicate label {label:?}")));
            }
        }

        Ok(Self { labels, index })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn label_of(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn encode<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|l| {
                let l = l.as_ref();
                self.index_of(l)
                    .ok_or_else(|| HmmError::UnknownLabel(l.to_string()))
            })
            .collect()
    }

    pub fn decode(&self, indices: &[usize]) -> Result<Vec<&str>> {
        indices
            .iter()
            .map(|&i| {
                self.label_of(i).ok_or(HmmError::InvalidState {
                    state: i,
                    n_states: self.len(),
                })
            })
            .collect()
    }
}

/// Expands per-state `symbol -> probability` maps into a dense table whose
/// columns follow `symbols`. Absent symbols get probability zero.
pub fn dense_emissions(
    rows: &[BTreeMap<String, f64>],
    symbols: &Alphabet,
) -> Result<Vec<Vec<f64>>> {
    rows.iter()
        .map(|row| -> Result<Vec<f64>> {
            let mut dense = vec![0.0; symbols.len()];
            for (label, &p) in row {
                let o = symbols
                    .index_of(label)
                    .ok_or_else(|| HmmError::UnknownLabel(label.clone()))?;
                dense[o] = p;
            }
            Ok(dense)
        })
        .collect()
}

/// A decoder whose states and symbols are addressed by name.
#[derive(Clone, Debug)]
pub struct LabeledHmm {
    states: Alphabet,
    symbols: Alphabet,
    decoder: ViterbiDecoder,
}

impl LabeledHmm {
    pub fn new(states: Alphabet, symbols: Alphabet, model: DiscreteHmm, scoring: Scoring) -> Result<Self> {
        if states.len() != model.n_states() {
            return Err(HmmError::InvalidModel(format!(
                "{} state labels for {} states",
                states.len(),
                model.n_states()
            )));
        }
        if symbols.len() != model.n_symbols() {
            return Err(HmmError::InvalidModel(format!(
                "{} symbol labels for {} symbols",
                symbols.len(),
                model.n_symbols()
            )));
        }

        Ok(Self {
            states,
            symbols,
            decoder: ViterbiDecoder::with_scoring(model, scoring),
        })
    }

    pub fn states(&self) -> &Alphabet {
        &self.states
    }

    pub fn symbols(&self) -> &Alphabet {
        &self.symbols
    }

    pub fn decoder(&self) -> &ViterbiDecoder {
        &self.decoder
    }

    pub fn decode_labels<S: AsRef<str>>(&self, observations: &[S]) -> Result<Vec<String>> {
        let obs = self.symbols.encode(observations)?;
        let path = self.decoder.decode(&obs)?;
        Ok(self
            .states
            .decode(&path)?
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    pub fn decode_trellis_labels<S: AsRef<str>>(&self, observations: &[S]) -> Result<Trellis> {
        let obs = self.symbols.encode(observations)?;
        self.decoder.decode_trellis(&obs)
    }
}
