use crate::error::{HmmError, Result};
use crate::math::prob::{is_distribution, is_valid_prob};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Discrete-emission HMM parameters.
///
/// States are `0..n_states`, symbols are `0..n_symbols`. The tables are
/// validated once at construction and never mutated afterwards, so a
/// model can be shared freely between decoders and threads.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteHmm {
    n_states: usize,
    n_symbols: usize,
    initial_probs: Array1<f64>,
    transition_matrix: Array2<f64>,
    emission_matrix: Array2<f64>,
}

impl DiscreteHmm {
    /// Builds a model from row-major tables.
    ///
    /// `transitions[i][j]` is P(state j | state i) and `emissions[s][o]` is
    /// P(symbol o | state s). Rows need not sum to one, but every entry must
    /// be finite and non-negative.
    pub fn new(
        initial: Vec<f64>,
        transitions: Vec<Vec<f64>>,
        emissions: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n_states = initial.len();
        if n_states == 0 {
            return Err(HmmError::InvalidModel("no states".to_string()));
        }

        let transition_matrix = to_matrix("transition", &transitions, n_states, Some(n_states))?;
        let emission_matrix = to_matrix("emission", &emissions, n_states, None)?;

        Self::from_arrays(Array1::from(initial), transition_matrix, emission_matrix)
    }

    pub fn from_arrays(
        initial_probs: Array1<f64>,
        transition_matrix: Array2<f64>,
        emission_matrix: Array2<f64>,
    ) -> Result<Self> {
        let n_states = initial_probs.len();
        if n_states == 0 {
            return Err(HmmError::InvalidModel("no states".to_string()));
        }
        if transition_matrix.dim() != (n_states, n_states) {
            let (rows, cols) = transition_matrix.dim();
            return Err(HmmError::InvalidModel(format!(
                "transition matrix is {rows}x{cols}, expected {n_states}x{n_states}"
            )));
        }
        let (emission_rows, n_symbols) = emission_matrix.dim();
        if emission_rows != n_states {
            return Err(HmmError::InvalidModel(format!(
                "emission matrix has {emission_rows} rows, expected {n_states}"
            )));
        }
        if n_symbols == 0 {
            return Err(HmmError::InvalidModel("emission alphabet is empty".to_string()));
        }

        check_probs("initial", initial_probs.iter())?;
        check_probs("transition", transition_matrix.iter())?;
        check_probs("emission", emission_matrix.iter())?;

        Ok(Self {
            n_states,
            n_symbols,
            initial_probs,
            transition_matrix,
            emission_matrix,
        })
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    pub fn initial_probs(&self) -> ArrayView1<'_, f64> {
        self.initial_probs.view()
    }

    pub fn transition_matrix(&self) -> ArrayView2<'_, f64> {
        self.transition_matrix.view()
    }

    pub fn emission_matrix(&self) -> ArrayView2<'_, f64> {
        self.emission_matrix.view()
    }

    #[inline]
    pub fn initial(&self, state: usize) -> f64 {
        self.initial_probs[state]
    }

    #[inline]
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transition_matrix[[from, to]]
    }

    #[inline]
    pub fn emission(&self, state: usize, symbol: usize) -> f64 {
        self.emission_matrix[[state, symbol]]
    }

    /// Rejects empty sequences and reports the first out-of-alphabet symbol.
    pub fn check_observations(&self, observations: &[usize]) -> Result<()> {
        if observations.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        match observations
            .iter()
            .enumerate()
            .find(|(_, &o)| o >= self.n_symbols)
        {
            Some((position, &symbol)) => Err(HmmError::InvalidObservation {
                position,
                symbol,
                n_symbols: self.n_symbols,
            }),
            None => Ok(()),
        }
    }

    /// Joint probability of `path` and `observations` under the model.
    pub fn path_probability(&self, path: &[usize], observations: &[usize]) -> Result<f64> {
        self.check_observations(observations)?;
        if path.len() != observations.len() {
            return Err(HmmError::PathLengthMismatch {
                path: path.len(),
                observations: observations.len(),
            });
        }
        if let Some(&state) = path.iter().find(|&&s| s >= self.n_states) {
            return Err(HmmError::InvalidState {
                state,
                n_states: self.n_states,
            });
        }

        let mut prob = self.initial(path[0]) * self.emission(path[0], observations[0]);
        for t in 1..path.len() {
            prob *= self.transition(path[t - 1], path[t]);
            prob *= self.emission(path[t], observations[t]);
        }
        Ok(prob)
    }

    /// True when the initial vector and every matrix row sum to one within `tol`.
    pub fn is_stochastic(&self, tol: f64) -> bool {
        is_distribution(self.initial_probs.iter(), tol)
            && self
                .transition_matrix
                .axis_iter(Axis(0))
                .all(|row| is_distribution(row.iter(), tol))
            && self
                .emission_matrix
                .axis_iter(Axis(0))
                .all(|row| is_distribution(row.iter(), tol))
    }
}

fn to_matrix(
    name: &str,
    rows: &[Vec<f64>],
    n_rows: usize,
    n_cols: Option<usize>,
) -> Result<Array2<f64>> {
    if rows.len() != n_rows {
        return Err(HmmError::InvalidModel(format!(
            "{name} matrix has {} rows, expected {n_rows}",
            rows.len()
        )));
    }
    let width = n_cols.unwrap_or_else(|| rows.first().map_or(0, Vec::len));
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(HmmError::InvalidModel(format!(
            "{name} matrix row {i} has {} columns, expected {width}",
            row.len()
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, width), flat)
        .map_err(|err| HmmError::InvalidModel(format!("{name} matrix: {err}")))
}

fn check_probs<'a, I>(name: &str, values: I) -> Result<()>
where
    I: Iterator<Item = &'a f64>,
{
    match values.copied().find(|p| !is_valid_prob(*p)) {
        Some(p) => Err(HmmError::InvalidModel(format!(
            "{name} probability {p} is negative or not finite"
        ))),
        None => Ok(()),
    }
}
