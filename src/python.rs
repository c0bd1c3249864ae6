use crate::error::HmmError;
use crate::hmm::DiscreteHmm;
use crate::viterbi::{Scoring, ViterbiDecoder};
use numpy::{PyArray2, PyReadonlyArray1, PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

impl From<HmmError> for PyErr {
    fn from(err: HmmError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

fn build_model(
    initial: PyReadonlyArray1<'_, f64>,
    transitions: PyReadonlyArray2<'_, f64>,
    emissions: PyReadonlyArray2<'_, f64>,
) -> PyResult<DiscreteHmm> {
    Ok(DiscreteHmm::from_arrays(
        initial.as_array().to_owned(),
        transitions.as_array().to_owned(),
        emissions.as_array().to_owned(),
    )?)
}

#[pyclass(name = "ViterbiDecoder", frozen)]
pub struct PyViterbiDecoder {
    inner: ViterbiDecoder,
}

#[pymethods]
impl PyViterbiDecoder {
    #[new]
    #[pyo3(signature = (initial, transitions, emissions, log_space=false))]
    fn new(
        initial: PyReadonlyArray1<'_, f64>,
        transitions: PyReadonlyArray2<'_, f64>,
        emissions: PyReadonlyArray2<'_, f64>,
        log_space: bool,
    ) -> PyResult<Self> {
        let scoring = if log_space {
            Scoring::LogSpace
        } else {
            Scoring::Probability
        };
        let model = build_model(initial, transitions, emissions)?;
        Ok(Self {
            inner: ViterbiDecoder::with_scoring(model, scoring),
        })
    }

    #[getter]
    fn n_states(&self) -> usize {
        self.inner.model().n_states()
    }

    #[getter]
    fn n_symbols(&self) -> usize {
        self.inner.model().n_symbols()
    }

    fn decode(&self, observations: Vec<usize>) -> PyResult<Vec<usize>> {
        Ok(self.inner.decode(&observations)?)
    }

    /// Returns `(scores, backpointers)`; scores is an `n_states x T` array and
    /// missing backpointers are `None`.
    fn trellis<'py>(
        &self,
        py: Python<'py>,
        observations: Vec<usize>,
    ) -> PyResult<(Bound<'py, PyArray2<f64>>, Vec<Vec<Option<usize>>>)> {
        let trellis = self.inner.decode_trellis(&observations)?;
        let scores = trellis.scores().to_pyarray_bound(py);
        let backpointers = trellis
            .backpointers()
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();
        Ok((scores, backpointers))
    }

    fn __repr__(&self) -> String {
        format!(
            "ViterbiDecoder(n_states={}, n_symbols={}, scoring={:?})",
            self.inner.model().n_states(),
            self.inner.model().n_symbols(),
            self.inner.scoring()
        )
    }
}

#[pyfunction]
pub fn viterbi(
    initial: PyReadonlyArray1<'_, f64>,
    transitions: PyReadonlyArray2<'_, f64>,
    emissions: PyReadonlyArray2<'_, f64>,
    observations: Vec<usize>,
) -> PyResult<Vec<usize>> {
    let model = build_model(initial, transitions, emissions)?;
    Ok(ViterbiDecoder::new(model).decode(&observations)?)
}
