//! Viterbi decoding over a [`DiscreteHmm`].
//!
//! The decoder builds an `n_states x T` trellis of best-path scores plus a
//! matching table of backpointers, then walks the backpointers from the best
//! final state. Tables are local to each call.

use crate::error::Result;
use crate::hmm::DiscreteHmm;
use crate::math::prob::strict_argmax;
use log::{debug, trace};
use ndarray::{Array2, ArrayView2};

/// How trellis scores are represented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scoring {
    /// Raw probabilities with a zero floor. A cell whose every candidate is
    /// zero keeps score 0 and no backpointer, and backtracking stops there,
    /// so degenerate inputs can yield a path shorter than the observations.
    #[default]
    Probability,
    /// Natural-log scores with a `-inf` floor. Every cell after the first
    /// column has a backpointer and the path always covers every observation.
    LogSpace,
}

#[derive(Clone, Debug)]
pub struct ViterbiDecoder {
    model: DiscreteHmm,
    scoring: Scoring,
}

impl ViterbiDecoder {
    pub fn new(model: DiscreteHmm) -> Self {
        Self::with_scoring(model, Scoring::Probability)
    }

    pub fn with_scoring(model: DiscreteHmm, scoring: Scoring) -> Self {
        Self { model, scoring }
    }

    pub fn model(&self) -> &DiscreteHmm {
        &self.model
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    /// Most likely hidden-state path for `observations`, oldest first.
    pub fn decode(&self, observations: &[usize]) -> Result<Vec<usize>> {
        Ok(self.decode_trellis(observations)?.backtrack())
    }

    /// Path plus the score of its final cell (a probability, or a
    /// log-probability under [`Scoring::LogSpace`]).
    pub fn decode_with_score(&self, observations: &[usize]) -> Result<(Vec<usize>, f64)> {
        let trellis = self.decode_trellis(observations)?;
        Ok((trellis.backtrack(), trellis.best_score()))
    }

    /// Validates `observations` and fills the full trellis.
    pub fn decode_trellis(&self, observations: &[usize]) -> Result<Trellis> {
        self.model.check_observations(observations)?;

        let n = self.model.n_states();
        let t_len = observations.len();
        debug!(
            "viterbi decode: n_states={} len={} scoring={:?}",
            n, t_len, self.scoring
        );

        let mut scores = Array2::<f64>::zeros((n, t_len));
        let mut backpointers = Array2::<Option<usize>>::from_elem((n, t_len), None);

        let o0 = observations[0];
        for s in 0..n {
            let p = self.model.initial(s) * self.model.emission(s, o0);
            scores[[s, 0]] = self.lift(p);
        }

        for t in 1..t_len {
            let sym = observations[t];
            for s in 0..n {
                let emit = self.lift(self.model.emission(s, sym));
                let candidates = (0..n).map(|p| {
                    let trans = self.lift(self.model.transition(p, s));
                    self.combine(self.combine(scores[[p, t - 1]], trans), emit)
                });

                let best = match self.scoring {
                    Scoring::Probability => strict_argmax(candidates, 0.0),
                    Scoring::LogSpace => {
                        let seed = self.combine(
                            self.combine(scores[[0, t - 1]], self.lift(self.model.transition(0, s))),
                            emit,
                        );
                        strict_argmax(candidates, seed).or(Some((0, seed)))
                    }
                };

                if let Some((prev, score)) = best {
                    scores[[s, t]] = score;
                    backpointers[[s, t]] = Some(prev);
                } else {
                    scores[[s, t]] = self.floor();
                }
            }
        }

        Ok(Trellis {
            scores,
            backpointers,
            scoring: self.scoring,
        })
    }

    fn lift(&self, p: f64) -> f64 {
        match self.scoring {
            Scoring::Probability => p,
            Scoring::LogSpace => p.ln(),
        }
    }

    fn combine(&self, a: f64, b: f64) -> f64 {
        match self.scoring {
            Scoring::Probability => a * b,
            Scoring::LogSpace => a + b,
        }
    }

    fn floor(&self) -> f64 {
        self.scoring.floor()
    }
}

impl Scoring {
    fn floor(self) -> f64 {
        match self {
            Scoring::Probability => 0.0,
            Scoring::LogSpace => f64::NEG_INFINITY,
        }
    }
}

/// Working tables of one decode call, indexed `[state, time]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Trellis {
    scores: Array2<f64>,
    backpointers: Array2<Option<usize>>,
    scoring: Scoring,
}

impl Trellis {
    pub fn n_states(&self) -> usize {
        self.scores.nrows()
    }

    /// Number of observations (columns).
    pub fn len(&self) -> usize {
        self.scores.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    pub fn score(&self, state: usize, time: usize) -> f64 {
        self.scores[[state, time]]
    }

    pub fn backpointer(&self, state: usize, time: usize) -> Option<usize> {
        self.backpointers[[state, time]]
    }

    pub fn scores(&self) -> ArrayView2<'_, f64> {
        self.scores.view()
    }

    pub fn backpointers(&self) -> ArrayView2<'_, Option<usize>> {
        self.backpointers.view()
    }

    /// Argmax of the last column; lowest index wins ties, and a column with
    /// nothing above the floor selects state 0.
    pub fn best_final_state(&self) -> usize {
        let last = self.len().saturating_sub(1);
        let column = self.scores.column(last);
        strict_argmax(column.iter().copied(), self.scoring.floor())
            .map_or(0, |(state, _)| state)
    }

    pub fn best_score(&self) -> f64 {
        if self.is_empty() {
            return self.scoring.floor();
        }
        self.score(self.best_final_state(), self.len() - 1)
    }

    /// Follows backpointers from the best final state until time 0 or the
    /// first missing backpointer.
    pub fn backtrack(&self) -> Vec<usize> {
        if self.is_empty() {
            return Vec::new();
        }

        let mut state = self.best_final_state();
        let mut time = self.len() - 1;
        let mut path = Vec::with_capacity(self.len());
        path.push(state);

        while time > 0 {
            match self.backpointer(state, time) {
                Some(prev) => {
                    state = prev;
                    time -= 1;
                    path.push(state);
                }
                None => {
                    trace!("backtrack stopped at time {} in state {}", time, state);
                    break;
                }
            }
        }

        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::{Scoring, ViterbiDecoder};
    use crate::error::HmmError;
    use crate::hmm::DiscreteHmm;
    use approx::assert_relative_eq;

    fn weather() -> DiscreteHmm {
        DiscreteHmm::new(
            vec![0.6, 0.4],
            vec![vec![0.7, 0.3], vec![0.4, 0.6]],
            vec![vec![0.5, 0.4, 0.1], vec![0.1, 0.3, 0.6]],
        )
        .unwrap()
    }

    #[test]
    fn textbook_health_example() {
        let decoder = ViterbiDecoder::new(weather());
        assert_eq!(decoder.decode(&[0, 1, 2]).unwrap(), vec![0, 0, 1]);

        let trellis = decoder.decode_trellis(&[0, 1, 2]).unwrap();
        assert_relative_eq!(trellis.score(0, 0), 0.30, max_relative = 1e-12);
        assert_relative_eq!(trellis.score(1, 0), 0.04, max_relative = 1e-12);
        assert_relative_eq!(trellis.score(0, 1), 0.084, max_relative = 1e-12);
        assert_relative_eq!(trellis.score(1, 1), 0.027, max_relative = 1e-12);
        assert_relative_eq!(trellis.score(0, 2), 0.00588, max_relative = 1e-12);
        assert_relative_eq!(trellis.score(1, 2), 0.01512, max_relative = 1e-12);
        assert_eq!(trellis.backpointer(0, 0), None);
        assert_eq!(trellis.backpointer(1, 0), None);
        assert_eq!(trellis.backpointer(1, 2), Some(0));
        assert_eq!(trellis.best_final_state(), 1);
    }

    #[test]
    fn first_column_is_initial_times_emission() {
        let hmm = weather();
        let trellis = ViterbiDecoder::new(hmm.clone()).decode_trellis(&[2, 0]).unwrap();
        for s in 0..hmm.n_states() {
            assert_eq!(trellis.score(s, 0), hmm.initial(s) * hmm.emission(s, 2));
            assert!(trellis.score(s, 0) >= 0.0);
        }
    }

    #[test]
    fn score_matches_path_probability() {
        let hmm = weather();
        let decoder = ViterbiDecoder::new(hmm.clone());
        let (path, score) = decoder.decode_with_score(&[0, 1, 2]).unwrap();
        assert_relative_eq!(
            score,
            hmm.path_probability(&path, &[0, 1, 2]).unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let hmm = DiscreteHmm::new(
            vec![0.5, 0.5],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        )
        .unwrap();
        let decoder = ViterbiDecoder::new(hmm);
        let trellis = decoder.decode_trellis(&[0, 1, 0]).unwrap();
        assert_eq!(trellis.backpointer(1, 2), Some(0));
        assert_eq!(decoder.decode(&[0, 1, 0]).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn unreachable_state_has_zero_score_and_no_backpointer() {
        // Nothing ever transitions into state 1.
        let hmm = DiscreteHmm::new(
            vec![1.0, 0.0],
            vec![vec![1.0, 0.0], vec![1.0, 0.0]],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        )
        .unwrap();
        let decoder = ViterbiDecoder::new(hmm);
        let trellis = decoder.decode_trellis(&[0, 1, 1]).unwrap();
        for t in 1..3 {
            assert_eq!(trellis.score(1, t), 0.0);
            assert_eq!(trellis.backpointer(1, t), None);
            assert_eq!(trellis.backpointer(0, t), Some(0));
        }
        assert_eq!(decoder.decode(&[0, 1, 1]).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn zero_final_column_truncates_path() {
        // Symbol 1 cannot be emitted by any state.
        let hmm = DiscreteHmm::new(
            vec![0.5, 0.5],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![vec![1.0, 0.0], vec![1.0, 0.0]],
        )
        .unwrap();
        let decoder = ViterbiDecoder::new(hmm);
        let trellis = decoder.decode_trellis(&[0, 0, 1]).unwrap();
        assert_eq!(trellis.score(0, 2), 0.0);
        assert_eq!(trellis.score(1, 2), 0.0);
        assert_eq!(trellis.best_final_state(), 0);

        let path = decoder.decode(&[0, 0, 1]).unwrap();
        assert_eq!(path, vec![0]);
        assert!(path.len() <= 3);
    }

    #[test]
    fn log_space_never_truncates() {
        let hmm = DiscreteHmm::new(
            vec![0.5, 0.5],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![vec![1.0, 0.0], vec![1.0, 0.0]],
        )
        .unwrap();
        let decoder = ViterbiDecoder::with_scoring(hmm, Scoring::LogSpace);
        let trellis = decoder.decode_trellis(&[0, 0, 1]).unwrap();
        assert_eq!(trellis.score(0, 2), f64::NEG_INFINITY);
        assert_eq!(trellis.backpointer(1, 2), Some(0));
        assert_eq!(decoder.decode(&[0, 0, 1]).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn log_space_agrees_with_probability_scoring() {
        let plain = ViterbiDecoder::new(weather());
        let logged = ViterbiDecoder::with_scoring(weather(), Scoring::LogSpace);
        let obs = [0, 1, 2, 2, 0, 1];

        let a = plain.decode_trellis(&obs).unwrap();
        let b = logged.decode_trellis(&obs).unwrap();
        assert_eq!(a.backtrack(), b.backtrack());
        for s in 0..2 {
            for t in 0..obs.len() {
                assert_relative_eq!(a.score(s, t).ln(), b.score(s, t), max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn invalid_input_fails_before_decoding() {
        let decoder = ViterbiDecoder::new(weather());
        assert!(matches!(decoder.decode(&[]), Err(HmmError::EmptySequence)));
        assert!(matches!(
            decoder.decode(&[0, 99]),
            Err(HmmError::InvalidObservation { symbol: 99, .. })
        ));
    }

    #[test]
    fn single_observation() {
        let decoder = ViterbiDecoder::new(weather());
        assert_eq!(decoder.decode(&[2]).unwrap(), vec![1]);
    }
}
