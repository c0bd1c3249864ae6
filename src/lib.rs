//! Viterbi decoding for hidden Markov models with discrete emissions.
//!
//! [`DiscreteHmm`] holds validated parameters, [`ViterbiDecoder`] turns an
//! observation sequence into its most likely hidden-state path, and the
//! [`labels`] and [`config`] modules put names on states and symbols.

pub mod config;
pub mod error;
pub mod hmm;
pub mod labels;
pub mod math;
pub mod report;
pub mod viterbi;

#[cfg(feature = "python")]
mod python;

pub use config::{Emissions, ModelConfig};
pub use error::{HmmError, Result};
pub use hmm::DiscreteHmm;
pub use labels::{Alphabet, LabeledHmm};
pub use report::TrellisReport;
pub use viterbi::{Scoring, Trellis, ViterbiDecoder};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn viterbi_hmm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyViterbiDecoder>()?;
    m.add_function(wrap_pyfunction!(python::viterbi, m)?)?;
    Ok(())
}
